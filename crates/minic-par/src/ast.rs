//! AST node definitions.
//!
//! The tree is fully owned: a parent node exclusively owns its children and
//! no node is shared. Once the parser returns a [`Program`] the tree is never
//! mutated; later stages only read it.

use std::fmt;

use minic_util::Span;

/// AST root: an ordered sequence of top-level declarations.
///
/// Parse order determines declaration order; later stages must not reorder.
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Decl>,
}

/// Top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Function(FunctionDecl),
    Var(VarDecl),
}

/// Function declaration. `body` is absent for a forward declaration
/// (`int f(int x);`).
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub return_type: TypeSpec,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Option<Block>,
    pub span: Span,
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeSpec,
    pub name: String,
    pub span: Span,
}

/// Variable declaration, with optional initializer.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

/// A parsed type keyword. The semantic stage owns the richer type language
/// (`char*`, function types); the parser only ever sees these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Int,
    Float,
    Char,
    Void,
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Float => write!(f, "float"),
            TypeSpec::Char => write!(f, "char"),
            TypeSpec::Void => write!(f, "void"),
        }
    }
}

/// Brace-delimited statement list.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    Compound(Block),
    Expr(ExprStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Decl(VarDecl),
}

/// Expression statement; the expression is absent for a bare `;`.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Option<Expr>,
    pub span: Span,
}

/// Return statement.
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// If statement. `else` binds to the nearest prior `if`.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

/// While loop.
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// For loop. Init, condition, and update are each optional.
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub cond: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// The init clause of a `for` header: a declaration or an expression
/// statement.
#[derive(Debug, Clone)]
pub enum ForInit {
    Decl(VarDecl),
    Expr(ExprStmt),
}

/// Expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Ident(IdentExpr),
    IntLit(IntLit),
    FloatLit(FloatLit),
    StrLit(StrLit),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::IntLit(e) => e.span,
            Expr::FloatLit(e) => e.span,
            Expr::StrLit(e) => e.span,
        }
    }
}

/// Binary operation.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Unary operation.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// Assignment. The target is restricted to a bare identifier by the parser.
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: String,
    pub value: Box<Expr>,
    pub span: Span,
}

/// Function call.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Identifier reference.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    pub span: Span,
}

/// Integer literal.
#[derive(Debug, Clone)]
pub struct IntLit {
    pub value: i64,
    pub span: Span,
}

/// Float literal.
#[derive(Debug, Clone)]
pub struct FloatLit {
    pub value: f64,
    pub span: Span,
}

/// String literal (content with escapes already processed).
#[derive(Debug, Clone)]
pub struct StrLit {
    pub value: String,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// True for the six comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    /// True for operators that yield `int` regardless of operand types.
    pub fn is_boolean(self) -> bool {
        self.is_comparison() || matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(s)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}
