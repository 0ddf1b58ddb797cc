//! AST → TAC lowering.
//!
//! Expressions are lowered post-order: each sub-expression yields a name
//! consumed by the parent's emitted instruction. Literals are inlined as
//! operand text rather than copied to a temporary. Lowering is a total
//! function over well-formed input; the semantic stage has already rejected
//! anything this walk cannot handle.

use minic_par::{Block, Decl, Expr, ForInit, FunctionDecl, Program, Stmt, VarDecl};

use crate::Instruction;

/// TAC generator. One instance lowers one program; the temporary and label
/// counters are per-compilation, not per-function.
pub struct TacGenerator {
    instructions: Vec<Instruction>,
    temp_counter: usize,
    label_counter: usize,
}

impl TacGenerator {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    /// Lower a program to a linear instruction list, consuming the
    /// generator so counters cannot leak into a second run.
    pub fn generate(mut self, program: &Program) -> Vec<Instruction> {
        for decl in &program.declarations {
            match decl {
                Decl::Function(func) => self.visit_function_decl(func),
                Decl::Var(var) => self.visit_var_decl(var),
            }
        }
        self.instructions
    }

    /// Next fresh temporary: `t0`, `t1`, …
    fn new_temp(&mut self) -> String {
        let temp = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        temp
    }

    /// Next fresh label: `L0`, `L1`, …
    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn visit_function_decl(&mut self, func: &FunctionDecl) {
        // Forward declarations produce no code.
        let Some(body) = &func.body else {
            return;
        };

        self.emit(Instruction::FunctionBegin(func.name.clone()));
        self.visit_block(body);
        self.emit(Instruction::FunctionEnd(func.name.clone()));
    }

    /// Only initialized declarations emit anything: a plain copy.
    fn visit_var_decl(&mut self, var: &VarDecl) {
        if let Some(init) = &var.init {
            let src = self.visit_expr(init);
            self.emit(Instruction::Copy {
                dest: var.name.clone(),
                src,
            });
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
            Stmt::Compound(block) => self.visit_block(block),
            Stmt::Expr(expr_stmt) => {
                if let Some(expr) = &expr_stmt.expr {
                    self.visit_expr(expr);
                }
            }
            Stmt::Return(ret) => {
                let value = ret.value.as_ref().map(|expr| self.visit_expr(expr));
                self.emit(Instruction::Return(value));
            }
            Stmt::If(if_stmt) => {
                let cond = self.visit_expr(&if_stmt.cond);

                if let Some(else_branch) = &if_stmt.else_branch {
                    let else_label = self.new_label();
                    let end_label = self.new_label();

                    self.emit(Instruction::IfFalseGoto {
                        cond,
                        target: else_label.clone(),
                    });
                    self.visit_stmt(&if_stmt.then_branch);
                    self.emit(Instruction::Goto(end_label.clone()));
                    self.emit(Instruction::Label(else_label));
                    self.visit_stmt(else_branch);
                    self.emit(Instruction::Label(end_label));
                } else {
                    let end_label = self.new_label();

                    self.emit(Instruction::IfFalseGoto {
                        cond,
                        target: end_label.clone(),
                    });
                    self.visit_stmt(&if_stmt.then_branch);
                    self.emit(Instruction::Label(end_label));
                }
            }
            Stmt::While(while_stmt) => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.emit(Instruction::Label(start_label.clone()));
                let cond = self.visit_expr(&while_stmt.cond);
                self.emit(Instruction::IfFalseGoto {
                    cond,
                    target: end_label.clone(),
                });
                self.visit_stmt(&while_stmt.body);
                self.emit(Instruction::Goto(start_label));
                self.emit(Instruction::Label(end_label));
            }
            Stmt::For(for_stmt) => {
                match &for_stmt.init {
                    Some(ForInit::Decl(var)) => self.visit_var_decl(var),
                    Some(ForInit::Expr(expr_stmt)) => {
                        if let Some(expr) = &expr_stmt.expr {
                            self.visit_expr(expr);
                        }
                    }
                    None => {}
                }

                let start_label = self.new_label();
                let end_label = self.new_label();
                // The language has no break/continue; the update label only
                // marks the update sequence in the listing.
                let update_label = self.new_label();

                self.emit(Instruction::Label(start_label.clone()));
                if let Some(cond) = &for_stmt.cond {
                    let cond = self.visit_expr(cond);
                    self.emit(Instruction::IfFalseGoto {
                        cond,
                        target: end_label.clone(),
                    });
                }

                self.visit_stmt(&for_stmt.body);

                self.emit(Instruction::Label(update_label));
                if let Some(update) = &for_stmt.update {
                    self.visit_expr(update);
                }

                self.emit(Instruction::Goto(start_label));
                self.emit(Instruction::Label(end_label));
            }
        }
    }

    /// Lower an expression and return the name holding its value: a
    /// temporary, a variable name, or a literal rendered as text.
    fn visit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::IntLit(lit) => lit.value.to_string(),
            Expr::FloatLit(lit) => lit.value.to_string(),
            Expr::StrLit(lit) => format!("\"{}\"", lit.value),
            Expr::Ident(ident) => ident.name.clone(),
            Expr::Binary(binary) => {
                let lhs = self.visit_expr(&binary.left);
                let rhs = self.visit_expr(&binary.right);
                let dest = self.new_temp();
                self.emit(Instruction::Binary {
                    dest: dest.clone(),
                    op: binary.op,
                    lhs,
                    rhs,
                });
                dest
            }
            Expr::Unary(unary) => {
                let operand = self.visit_expr(&unary.operand);
                let dest = self.new_temp();
                self.emit(Instruction::Unary {
                    dest: dest.clone(),
                    op: unary.op,
                    operand,
                });
                dest
            }
            Expr::Assign(assign) => {
                let src = self.visit_expr(&assign.value);
                self.emit(Instruction::Copy {
                    dest: assign.target.clone(),
                    src,
                });
                assign.target.clone()
            }
            Expr::Call(call) => {
                // Arguments are pushed in reverse source order.
                for arg in call.args.iter().rev() {
                    let name = self.visit_expr(arg);
                    self.emit(Instruction::Param(name));
                }

                let dest = self.new_temp();
                self.emit(Instruction::Call {
                    dest: Some(dest.clone()),
                    func: call.name.clone(),
                    arg_count: call.args.len(),
                });
                dest
            }
        }
    }
}

impl Default for TacGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry point: lower a program with a fresh generator.
pub fn lower(program: &Program) -> Vec<Instruction> {
    TacGenerator::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::tokenize;
    use minic_par::parse;

    fn lower_source(source: &str) -> Vec<Instruction> {
        let program = parse(tokenize(source).unwrap()).unwrap();
        lower(&program)
    }

    fn lines(source: &str) -> Vec<String> {
        lower_source(source)
            .iter()
            .map(|i| i.to_string())
            .collect()
    }

    #[test]
    fn test_global_initializer() {
        assert_eq!(lines("int x = 5;"), vec!["x = 5"]);
    }

    #[test]
    fn test_uninitialized_declaration_is_silent() {
        assert!(lines("int x;").is_empty());
    }

    #[test]
    fn test_forward_declaration_is_silent() {
        assert!(lines("int f(int a);").is_empty());
    }

    #[test]
    fn test_function_delimiters() {
        let tac = lines("int main() { return 0; }");
        assert_eq!(
            tac,
            vec!["function main:", "return 0", "end function main"]
        );
    }

    #[test]
    fn test_postorder_expression_lowering() {
        let tac = lines("int main() { int x; x = 5; return x + 1; }");
        assert_eq!(
            tac,
            vec![
                "function main:",
                "x = 5",
                "t0 = x + 1",
                "return t0",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_nested_expression_temporaries() {
        let tac = lines("int main() { return (1 + 2) * (3 - 4); }");
        assert_eq!(
            tac,
            vec![
                "function main:",
                "t0 = 1 + 2",
                "t1 = 3 - 4",
                "t2 = t0 * t1",
                "return t2",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_literals_are_inlined() {
        let tac = lines("int main() { int x; x = 1 + 2; return x; }");
        // No copy of 1 or 2 into a temporary before the add.
        assert_eq!(tac[1], "t0 = 1 + 2");
    }

    #[test]
    fn test_unary_lowering() {
        let tac = lines("int main() { int x; x = -5; return !x; }");
        assert_eq!(tac[1], "t0 = - 5");
        assert_eq!(tac[2], "x = t0");
        assert_eq!(tac[3], "t1 = ! x");
    }

    #[test]
    fn test_assignment_yields_target() {
        // `y = (x = 1)` reuses x as the value of the inner assignment.
        let tac = lines("int main() { int x; int y; y = x = 1; return y; }");
        assert_eq!(tac[1], "x = 1");
        assert_eq!(tac[2], "y = x");
    }

    #[test]
    fn test_if_without_else() {
        let tac = lines("int main() { int x; x = 1; if (x) x = 2; return x; }");
        assert_eq!(
            tac,
            vec![
                "function main:",
                "x = 1",
                "ifFalse x goto L0",
                "x = 2",
                "L0:",
                "return x",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_if_with_else() {
        let tac = lines(
            "int main() { int x; if (x < 0) x = 1; else x = 2; return x; }",
        );
        assert_eq!(
            tac,
            vec![
                "function main:",
                "t0 = x < 0",
                "ifFalse t0 goto L0",
                "x = 1",
                "goto L1",
                "L0:",
                "x = 2",
                "L1:",
                "return x",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_while_shape() {
        let tac = lines(
            "int main() { int i; i = 0; while (i < 10) i = i + 1; return i; }",
        );
        assert_eq!(
            tac,
            vec![
                "function main:",
                "i = 0",
                "L0:",
                "t0 = i < 10",
                "ifFalse t0 goto L1",
                "t1 = i + 1",
                "i = t1",
                "goto L0",
                "L1:",
                "return i",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_for_shape_with_update_label() {
        let tac = lines(
            "int main() { int s; s = 0; for (int i = 0; i < 3; i = i + 1) s = s + i; return s; }",
        );
        assert_eq!(
            tac,
            vec![
                "function main:",
                "s = 0",
                "i = 0",
                "L0:",
                "t0 = i < 3",
                "ifFalse t0 goto L1",
                "t1 = s + i",
                "s = t1",
                "L2:",
                "t2 = i + 1",
                "i = t2",
                "goto L0",
                "L1:",
                "return s",
                "end function main",
            ]
        );
    }

    #[test]
    fn test_for_without_condition_has_no_exit_test() {
        let tac = lines("int main() { for (;;) ; return 0; }");
        assert!(!tac.iter().any(|l| l.starts_with("ifFalse")));
        assert!(tac.contains(&"goto L0".to_string()));
    }

    #[test]
    fn test_params_in_reverse_order() {
        let tac = lines(
            "int f(int a, int b, int c) { return a; } int main() { return f(1, 2, 3); }",
        );
        let param_lines: Vec<&String> =
            tac.iter().filter(|l| l.starts_with("param")).collect();
        assert_eq!(param_lines, vec!["param 3", "param 2", "param 1"]);
        assert!(tac.contains(&"t0 = call f, 3".to_string()));
    }

    #[test]
    fn test_factorial_tac() {
        let source = "
            int factorial(int n) {
                if (n <= 1) { return 1; }
                return n * factorial(n - 1);
            }
            int main() { return factorial(5); }
        ";
        let tac = lines(source);
        assert!(tac.iter().any(|l| l.starts_with("param")));
        assert!(tac.iter().any(|l| l.contains("call factorial, 1")));
        assert!(tac.iter().any(|l| l.starts_with("ifFalse")));
        assert_eq!(
            tac.iter().filter(|l| l.starts_with("function ")).count(),
            2
        );
    }

    #[test]
    fn test_counters_span_the_whole_compilation() {
        let tac = lower_source(
            "int f() { return 1 + 2; } int g() { return 3 + 4; }",
        );
        let dests: Vec<&str> = tac
            .iter()
            .filter_map(|i| match i {
                Instruction::Binary { dest, .. } => Some(dest.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(dests, vec!["t0", "t1"]);
    }

    fn defined_temps(tac: &[Instruction]) -> Vec<String> {
        tac.iter()
            .filter_map(|i| match i {
                Instruction::Binary { dest, .. } | Instruction::Unary { dest, .. } => {
                    Some(dest.clone())
                }
                Instruction::Call {
                    dest: Some(dest), ..
                } => Some(dest.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_temp_names_are_unique() {
        let tac = lower_source(
            "int main() { int a; a = 1 + 2 * 3 - f(4, 5 + 6); return -a; } int f(int x, int y) { return x; }",
        );
        let temps = defined_temps(&tac);
        let mut deduped = temps.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(temps.len(), deduped.len());
    }

    #[test]
    fn test_label_names_are_unique() {
        let tac = lower_source(
            "int main() { int i; i = 0; while (i < 3) { if (i) i = i + 1; else i = i + 2; } for (;;) ; return i; }",
        );
        let mut labels: Vec<&String> = tac
            .iter()
            .filter_map(|i| match i {
                Instruction::Label(l) => Some(l),
                _ => None,
            })
            .collect();
        let total = labels.len();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), total);
    }

    #[test]
    fn test_every_jump_targets_a_label_in_its_function() {
        let source = "
            int f(int n) { if (n) { return 1; } return 0; }
            int main() { int i; for (i = 0; i < 2; i = i + 1) { } return f(i); }
        ";
        let tac = lower_source(source);

        // Split into per-function regions and check closure within each.
        let mut regions: Vec<Vec<&Instruction>> = Vec::new();
        for inst in &tac {
            match inst {
                Instruction::FunctionBegin(_) => regions.push(Vec::new()),
                _ => {
                    if let Some(region) = regions.last_mut() {
                        region.push(inst);
                    }
                }
            }
        }

        for region in regions {
            let labels: Vec<&String> = region
                .iter()
                .filter_map(|i| match i {
                    Instruction::Label(l) => Some(l),
                    _ => None,
                })
                .collect();
            for inst in &region {
                let target = match inst {
                    Instruction::Goto(t) => Some(t),
                    Instruction::IfGoto { target, .. } => Some(target),
                    Instruction::IfFalseGoto { target, .. } => Some(target),
                    _ => None,
                };
                if let Some(target) = target {
                    let count = labels.iter().filter(|l| **l == target).count();
                    assert_eq!(count, 1, "jump target {} not unique in function", target);
                }
            }
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Generate arithmetic expression source of bounded depth.
        fn arb_expr() -> impl Strategy<Value = String> {
            let leaf = prop_oneof![
                (0..100i64).prop_map(|n| n.to_string()),
                Just("x".to_string()),
            ];
            leaf.prop_recursive(4, 32, 2, |inner| {
                let op = prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")];
                (inner.clone(), op, inner)
                    .prop_map(|(l, op, r)| format!("({} {} {})", l, op, r))
            })
        }

        proptest! {
            // However the expression nests, generated temporaries are never
            // reused.
            #[test]
            fn temps_unique_for_any_expression(expr in arb_expr()) {
                let source = format!("int main() {{ int x; x = 1; return {}; }}", expr);
                let tac = lower_source(&source);
                let temps = defined_temps(&tac);
                let mut deduped = temps.clone();
                deduped.sort();
                deduped.dedup();
                prop_assert_eq!(temps.len(), deduped.len());
            }
        }
    }
}
