//! minic-sem - Semantic analysis (stage 3).
//!
//! Walks the AST once, building scoped symbol tables and checking types.
//! Unlike the scanner and parser, this stage does not stop at the first
//! problem: every diagnostic found during the walk is accumulated in a
//! [`Handler`], and the stage fails once at the end if any were recorded.
//! The `unknown` recovery type suppresses cascaded reports downstream of an
//! already-diagnosed error.

mod scope;
mod types;

pub use scope::{ScopeKind, Symbol, SymbolTable};
pub use types::Type;

use minic_par::{
    Block, Decl, Expr, ForInit, FunctionDecl, Program, Stmt, UnOp, VarDecl,
};
use minic_util::{Handler, Span};
use thiserror::Error;

/// Error carrying every diagnostic message from one analysis pass.
#[derive(Debug, Error)]
#[error("semantic analysis failed with {} error(s)", .messages.len())]
pub struct SemanticError {
    pub messages: Vec<String>,
}

/// Semantic analyzer. One instance analyzes one program.
pub struct SemanticAnalyzer {
    table: SymbolTable,
    handler: Handler,
    current_return_type: Option<Type>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            handler: Handler::new(),
            current_return_type: None,
        }
    }

    /// Analyze a program, accumulating all diagnostics before failing.
    ///
    /// On success the symbol table is back to exactly the global frame and
    /// can be read for reporting.
    pub fn analyze(&mut self, program: &Program) -> Result<(), SemanticError> {
        for decl in &program.declarations {
            match decl {
                Decl::Function(func) => self.visit_function_decl(func),
                Decl::Var(var) => self.visit_var_decl(var),
            }
        }

        if self.handler.has_errors() {
            Err(SemanticError {
                messages: self
                    .handler
                    .diagnostics()
                    .into_iter()
                    .map(|d| d.message)
                    .collect(),
            })
        } else {
            Ok(())
        }
    }

    /// The symbol table after analysis; only the global frame remains.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    fn error(&self, message: impl Into<String>, span: Span) {
        self.handler.error(message, span);
    }

    fn visit_function_decl(&mut self, func: &FunctionDecl) {
        let func_type = Type::function(Type::from(func.return_type));
        if !self.table.declare(&func.name, func_type) {
            self.error(
                format!("'{}' already declared in this scope", func.name),
                func.span,
            );
        }

        let Some(body) = &func.body else {
            return;
        };

        self.table
            .enter_scope(ScopeKind::Function(func.name.clone()));
        self.current_return_type = Some(Type::from(func.return_type));

        for param in &func.params {
            if !self.table.declare(&param.name, Type::from(param.ty)) {
                self.error(
                    format!("'{}' already declared in this scope", param.name),
                    param.span,
                );
            }
        }

        self.visit_block(body);

        self.table.exit_scope();
        self.current_return_type = None;
    }

    fn visit_var_decl(&mut self, var: &VarDecl) {
        let var_type = Type::from(var.ty);
        if !self.table.declare(&var.name, var_type.clone()) {
            self.error(
                format!("'{}' already declared in this scope", var.name),
                var.span,
            );
        }

        if let Some(init) = &var.init {
            let init_type = self.visit_expr(init);
            if !var_type.assignable_from(&init_type) {
                self.error(
                    format!(
                        "type mismatch in initialization of '{}': cannot assign {} to {}",
                        var.name, init_type, var_type
                    ),
                    init.span(),
                );
            }
        }
    }

    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(var) => self.visit_var_decl(var),
            Stmt::Compound(block) => {
                self.table.enter_scope(ScopeKind::Block);
                self.visit_block(block);
                self.table.exit_scope();
            }
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = &expr_stmt.expr {
                    self.visit_expr(expr);
                }
            }
            Stmt::Return(ret) => {
                let Some(expected) = self.current_return_type.clone() else {
                    self.error("return statement outside of function", ret.span);
                    return;
                };

                if let Some(value) = &ret.value {
                    let value_type = self.visit_expr(value);
                    if !expected.assignable_from(&value_type) {
                        self.error(
                            format!(
                                "return type mismatch: expected {}, got {}",
                                expected, value_type
                            ),
                            value.span(),
                        );
                    }
                } else if expected != Type::Void {
                    self.error(
                        format!("return statement must return a value of type {}", expected),
                        ret.span,
                    );
                }
            }
            Stmt::If(if_stmt) => {
                self.visit_expr(&if_stmt.cond);
                self.visit_stmt(&if_stmt.then_branch);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::While(while_stmt) => {
                self.visit_expr(&while_stmt.cond);
                self.visit_stmt(&while_stmt.body);
            }
            Stmt::For(for_stmt) => {
                // The `for` frame spans init, condition, update, and body.
                self.table.enter_scope(ScopeKind::For);

                match &for_stmt.init {
                    Some(ForInit::Decl(var)) => self.visit_var_decl(var),
                    Some(ForInit::Expr(expr_stmt)) => {
                        if let Some(expr) = &expr_stmt.expr {
                            self.visit_expr(expr);
                        }
                    }
                    None => {}
                }

                if let Some(cond) = &for_stmt.cond {
                    self.visit_expr(cond);
                }
                if let Some(update) = &for_stmt.update {
                    self.visit_expr(update);
                }

                self.visit_stmt(&for_stmt.body);
                self.table.exit_scope();
            }
        }
    }

    /// Type an expression, reporting any problems found inside it.
    fn visit_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::IntLit(_) => Type::Int,
            Expr::FloatLit(_) => Type::Float,
            Expr::StrLit(_) => Type::CharPtr,
            Expr::Ident(ident) => match self.table.lookup(&ident.name) {
                Some(symbol) => symbol.ty.clone(),
                None => {
                    self.error(
                        format!("undefined variable: '{}'", ident.name),
                        ident.span,
                    );
                    Type::Unknown
                }
            },
            Expr::Binary(binary) => {
                let left = self.visit_expr(&binary.left);
                let right = self.visit_expr(&binary.right);

                if binary.op.is_boolean() {
                    // Comparisons and logical operators yield boolean-as-int.
                    Type::Int
                } else if left == Type::Float || right == Type::Float {
                    Type::Float
                } else {
                    Type::Int
                }
            }
            Expr::Unary(unary) => {
                let operand = self.visit_expr(&unary.operand);
                match unary.op {
                    UnOp::Not => Type::Int,
                    UnOp::Neg => operand,
                }
            }
            Expr::Assign(assign) => {
                let Some(symbol) = self.table.lookup(&assign.target) else {
                    self.error(
                        format!("assignment to undefined variable: '{}'", assign.target),
                        assign.span,
                    );
                    return Type::Unknown;
                };
                let target_type = symbol.ty.clone();

                let value_type = self.visit_expr(&assign.value);

                if !target_type.assignable_from(&value_type) {
                    self.error(
                        format!(
                            "type mismatch in assignment to '{}': cannot assign {} to {}",
                            assign.target, value_type, target_type
                        ),
                        assign.span,
                    );
                }

                target_type
            }
            Expr::Call(call) => {
                let Some(symbol) = self.table.lookup(&call.name) else {
                    self.error(
                        format!("call to undefined function: '{}'", call.name),
                        call.span,
                    );
                    return Type::Unknown;
                };
                let callee_type = symbol.ty.clone();

                let Type::Function(ret) = callee_type else {
                    self.error(format!("'{}' is not a function", call.name), call.span);
                    return Type::Unknown;
                };

                // Argument count and types are deliberately not checked
                // against the declaration.
                for arg in &call.args {
                    self.visit_expr(arg);
                }

                *ret
            }
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry point: analyze a program with a fresh analyzer.
pub fn analyze(program: &Program) -> Result<(), SemanticError> {
    SemanticAnalyzer::new().analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::tokenize;
    use minic_par::parse;

    fn analyze_source(source: &str) -> Result<(), SemanticError> {
        let program = parse(tokenize(source).unwrap()).unwrap();
        analyze(&program)
    }

    fn messages(source: &str) -> Vec<String> {
        analyze_source(source).unwrap_err().messages
    }

    #[test]
    fn test_valid_program() {
        let source = "
            int factorial(int n) {
                if (n <= 1) {
                    return 1;
                }
                return n * factorial(n - 1);
            }

            int main() {
                int x;
                x = 5;
                return factorial(x);
            }
        ";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_undefined_variable() {
        let msgs = messages("int main() { return undefined_var; }");
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("undefined"));
        assert!(msgs[0].contains("undefined_var"));
    }

    #[test]
    fn test_redeclaration() {
        let msgs = messages("int main() { int x; int x; return x; }");
        assert!(msgs[0].contains("already declared"));
        assert!(msgs[0].contains("'x'"));
    }

    #[test]
    fn test_int_float_coercion() {
        let source = "int main() { float f; int x; f = 2; x = f; return x; }";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_string_to_int_mismatch() {
        let msgs = messages("int main() { int x; x = \"oops\"; return x; }");
        assert!(msgs[0].contains("type mismatch in assignment"));
        assert!(msgs[0].contains("char*"));
    }

    #[test]
    fn test_init_type_mismatch() {
        let msgs = messages("int main() { char c = \"text\"; return 0; }");
        assert!(msgs[0].contains("type mismatch in initialization"));
    }

    #[test]
    fn test_return_type_mismatch() {
        let msgs = messages("int main() { return \"text\"; }");
        assert!(msgs[0].contains("return type mismatch"));
        assert!(msgs[0].contains("expected int"));
    }

    #[test]
    fn test_bare_return_in_non_void() {
        let msgs = messages("int main() { return; }");
        assert!(msgs[0].contains("must return a value of type int"));
    }

    #[test]
    fn test_bare_return_in_void() {
        assert!(analyze_source("void run() { return; }").is_ok());
    }

    #[test]
    fn test_call_to_undefined_function() {
        let msgs = messages("int main() { return missing(); }");
        assert!(msgs[0].contains("undefined function"));
        assert!(msgs[0].contains("missing"));
    }

    #[test]
    fn test_call_to_non_function() {
        let msgs = messages("int main() { int x; return x(); }");
        assert!(msgs[0].contains("not a function"));
    }

    #[test]
    fn test_assignment_to_undefined() {
        let msgs = messages("int main() { y = 1; return 0; }");
        assert!(msgs[0].contains("assignment to undefined variable"));
    }

    #[test]
    fn test_shadowing_is_allowed() {
        let source = "int x; int main() { int x; { int x; x = 1; } return x; }";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_block_scope_ends() {
        let msgs = messages("int main() { { int y; } return y; }");
        assert!(msgs[0].contains("undefined"));
    }

    #[test]
    fn test_for_scope_spans_header_and_body() {
        let source = "int main() { int s; s = 0; for (int i = 0; i < 3; i = i + 1) s = s + i; return s; }";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_for_variable_not_visible_after() {
        let msgs = messages("int main() { for (int i = 0; i < 3; i = i + 1) ; return i; }");
        assert!(msgs[0].contains("undefined"));
        assert!(msgs[0].contains("'i'"));
    }

    #[test]
    fn test_parameters_are_in_function_scope() {
        assert!(analyze_source("int twice(int n) { return n + n; }").is_ok());
    }

    #[test]
    fn test_duplicate_parameter() {
        let msgs = messages("int f(int a, int a) { return a; }");
        assert!(msgs[0].contains("already declared"));
    }

    #[test]
    fn test_all_errors_collected_in_one_pass() {
        let msgs = messages("int main() { x = 1; y = 2; return z; }");
        assert_eq!(msgs.len(), 3);
    }

    #[test]
    fn test_unknown_suppresses_cascade() {
        // The undefined initializer is reported once; the initialization
        // itself is not additionally flagged as a type mismatch.
        let msgs = messages("int main() { int x = nope; return x; }");
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("undefined"));
    }

    #[test]
    fn test_call_arity_is_not_checked() {
        let source = "int id(int x) { return x; } int main() { return id(1, 2, 3); }";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_comparison_yields_int() {
        let source = "int main() { int b; float f; f = 1.5; b = f < 2.5; return b; }";
        assert!(analyze_source(source).is_ok());
    }

    #[test]
    fn test_scope_stack_balanced_after_analysis() {
        let program = parse(
            tokenize("int f(int a) { { int b; } return a; } int main() { return f(1); }")
                .unwrap(),
        )
        .unwrap();
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program).unwrap();
        assert_eq!(analyzer.symbol_table().depth(), 1);
    }

    #[test]
    fn test_global_symbols_remain_after_analysis() {
        let program =
            parse(tokenize("int g; int main() { return g; }").unwrap()).unwrap();
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program).unwrap();

        let names: Vec<&str> = analyzer
            .symbol_table()
            .all_symbols()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["g", "main"]);

        let main_sym = analyzer.symbol_table().lookup("main").unwrap();
        assert_eq!(main_sym.ty, Type::function(Type::Int));
        assert_eq!(main_sym.scope, ScopeKind::Global);
    }
}
