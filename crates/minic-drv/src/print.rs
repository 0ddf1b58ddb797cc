//! Artifact pretty-printers.
//!
//! These render stage outputs for human inspection. They hold no
//! algorithmic content; the core crates never format anything beyond the
//! canonical TAC text.

use std::fmt::Write;

use minic_gen::AsmGenerator;
use minic_lex::Token;
use minic_par::{
    Decl, Expr, ForInit, FunctionDecl, Program, Stmt, VarDecl,
};
use minic_sem::SymbolTable;

/// Render the token table.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<16} {:<6} {:<6}",
        "Kind", "Lexeme", "Line", "Column"
    );
    let _ = writeln!(out, "{}", "-".repeat(48));
    for token in tokens {
        let _ = writeln!(
            out,
            "{:<16} {:<16} {:<6} {:<6}",
            format!("{:?}", token.kind),
            token.lexeme,
            token.line(),
            token.column()
        );
    }
    out
}

/// Render the AST as an indented tree.
pub fn format_ast(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Program");
    for decl in &program.declarations {
        match decl {
            Decl::Function(func) => write_function(&mut out, func, 1),
            Decl::Var(var) => write_var(&mut out, var, 1),
        }
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    out.push_str(&"  ".repeat(depth));
}

fn write_function(out: &mut String, func: &FunctionDecl, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "FunctionDecl: {} {}", func.return_type, func.name);
    for param in &func.params {
        indent(out, depth + 1);
        let _ = writeln!(out, "Parameter: {} {}", param.ty, param.name);
    }
    if let Some(body) = &func.body {
        indent(out, depth + 1);
        let _ = writeln!(out, "Body:");
        for stmt in &body.stmts {
            write_stmt(out, stmt, depth + 2);
        }
    }
}

fn write_var(out: &mut String, var: &VarDecl, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "VarDecl: {} {}", var.ty, var.name);
    if let Some(init) = &var.init {
        indent(out, depth + 1);
        let _ = writeln!(out, "Initializer:");
        write_expr(out, init, depth + 2);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::Decl(var) => write_var(out, var, depth),
        Stmt::Compound(block) => {
            indent(out, depth);
            let _ = writeln!(out, "CompoundStmt");
            for stmt in &block.stmts {
                write_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::Expr(expr_stmt) => {
            indent(out, depth);
            let _ = writeln!(out, "ExpressionStmt");
            if let Some(expr) = &expr_stmt.expr {
                write_expr(out, expr, depth + 1);
            }
        }
        Stmt::Return(ret) => {
            indent(out, depth);
            let _ = writeln!(out, "ReturnStmt");
            if let Some(value) = &ret.value {
                write_expr(out, value, depth + 1);
            }
        }
        Stmt::If(if_stmt) => {
            indent(out, depth);
            let _ = writeln!(out, "IfStmt");
            indent(out, depth + 1);
            let _ = writeln!(out, "Condition:");
            write_expr(out, &if_stmt.cond, depth + 2);
            indent(out, depth + 1);
            let _ = writeln!(out, "Then:");
            write_stmt(out, &if_stmt.then_branch, depth + 2);
            if let Some(else_branch) = &if_stmt.else_branch {
                indent(out, depth + 1);
                let _ = writeln!(out, "Else:");
                write_stmt(out, else_branch, depth + 2);
            }
        }
        Stmt::While(while_stmt) => {
            indent(out, depth);
            let _ = writeln!(out, "WhileStmt");
            indent(out, depth + 1);
            let _ = writeln!(out, "Condition:");
            write_expr(out, &while_stmt.cond, depth + 2);
            indent(out, depth + 1);
            let _ = writeln!(out, "Body:");
            write_stmt(out, &while_stmt.body, depth + 2);
        }
        Stmt::For(for_stmt) => {
            indent(out, depth);
            let _ = writeln!(out, "ForStmt");
            match &for_stmt.init {
                Some(ForInit::Decl(var)) => {
                    indent(out, depth + 1);
                    let _ = writeln!(out, "Init:");
                    write_var(out, var, depth + 2);
                }
                Some(ForInit::Expr(expr_stmt)) => {
                    indent(out, depth + 1);
                    let _ = writeln!(out, "Init:");
                    if let Some(expr) = &expr_stmt.expr {
                        write_expr(out, expr, depth + 2);
                    }
                }
                None => {}
            }
            if let Some(cond) = &for_stmt.cond {
                indent(out, depth + 1);
                let _ = writeln!(out, "Condition:");
                write_expr(out, cond, depth + 2);
            }
            if let Some(update) = &for_stmt.update {
                indent(out, depth + 1);
                let _ = writeln!(out, "Update:");
                write_expr(out, update, depth + 2);
            }
            indent(out, depth + 1);
            let _ = writeln!(out, "Body:");
            write_stmt(out, &for_stmt.body, depth + 2);
        }
    }
}

fn write_expr(out: &mut String, expr: &Expr, depth: usize) {
    indent(out, depth);
    match expr {
        Expr::Binary(binary) => {
            let _ = writeln!(out, "BinaryOp: {}", binary.op);
            write_expr(out, &binary.left, depth + 1);
            write_expr(out, &binary.right, depth + 1);
        }
        Expr::Unary(unary) => {
            let _ = writeln!(out, "UnaryOp: {}", unary.op);
            write_expr(out, &unary.operand, depth + 1);
        }
        Expr::Assign(assign) => {
            let _ = writeln!(out, "Assignment: {}", assign.target);
            write_expr(out, &assign.value, depth + 1);
        }
        Expr::Call(call) => {
            let _ = writeln!(out, "FunctionCall: {}", call.name);
            for arg in &call.args {
                write_expr(out, arg, depth + 1);
            }
        }
        Expr::Ident(ident) => {
            let _ = writeln!(out, "Identifier: {}", ident.name);
        }
        Expr::IntLit(lit) => {
            let _ = writeln!(out, "IntLiteral: {}", lit.value);
        }
        Expr::FloatLit(lit) => {
            let _ = writeln!(out, "FloatLiteral: {}", lit.value);
        }
        Expr::StrLit(lit) => {
            let _ = writeln!(out, "StringLiteral: \"{}\"", lit.value);
        }
    }
}

/// Print the remaining (global) symbol table.
pub(crate) fn print_symbol_table(table: &SymbolTable) {
    println!("{:<20} {:<20} {:<20}", "Name", "Type", "Scope");
    println!("{}", "-".repeat(60));
    for symbol in table.all_symbols() {
        println!(
            "{:<20} {:<20} {:<20}",
            symbol.name,
            symbol.ty.to_string(),
            symbol.scope.to_string()
        );
    }
}

/// Print the register-allocation table for user-declared variables.
pub(crate) fn print_register_table(generator: &AsmGenerator) {
    println!("Register Allocation:");
    println!("{:<15} {:<10}", "Variable", "Register");
    println!("{}", "-".repeat(25));
    for (name, register) in generator.register_table() {
        println!("{:<15} {:<10}", name, register);
    }
}
