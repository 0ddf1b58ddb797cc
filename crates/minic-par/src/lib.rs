//! minic-par - Syntax analysis (stage 2).
//!
//! A recursive-descent parser over the token stream. Declarations and
//! statements are parsed by one function per grammar production; expressions
//! use a Pratt core (`parse_expr_bp`) whose binding-power table realizes the
//! language's ten precedence levels, with `=` right-associative at the
//! bottom and unary operators binding tighter than any binary operator.
//!
//! The parser fails fast: the first token mismatch produces a [`ParseError`]
//! with the offending location, and no recovery is attempted.

pub mod ast;
mod expr;
mod items;
mod stmt;

pub use ast::*;

use minic_lex::{Token, TokenKind};
use thiserror::Error;

/// Error produced on the first grammar violation.
#[derive(Debug, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Recursive descent parser.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a parser over a token stream.
    ///
    /// The stream is expected to end with `Eof`, which [`minic_lex::Lexer`]
    /// guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a complete program.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut declarations = Vec::new();

        while !self.check(TokenKind::Eof) {
            declarations.push(self.parse_declaration()?);
        }

        Ok(Program { declarations })
    }

    /// Current token. The `Eof` sentinel is sticky: walking past the end
    /// keeps returning it.
    pub(crate) fn current(&self) -> &Token {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .expect("token stream is never empty")
    }

    /// Kind of the current token.
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Consume and return the current token.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// Check the current token kind without consuming.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.kind().describe()
            )))
        }
    }

    /// Build a parse error pointing at the current token.
    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::new(token.line(), token.column(), message)
    }
}

/// Convenience entry point: parse a token stream into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_lex::tokenize;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(tokenize(source).expect("lexing should succeed"))
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse_source("int add(int a, int b) { return a + b; }").unwrap();
        assert_eq!(program.declarations.len(), 1);

        let Decl::Function(func) = &program.declarations[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(func.name, "add");
        assert_eq!(func.return_type, TypeSpec::Int);
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.params[0].name, "a");
        assert_eq!(func.params[1].ty, TypeSpec::Int);
        assert!(func.body.is_some());
    }

    #[test]
    fn test_parse_forward_declaration() {
        let program = parse_source("float scale(float x);").unwrap();
        let Decl::Function(func) = &program.declarations[0] else {
            panic!("expected function declaration");
        };
        assert!(func.body.is_none());
    }

    #[test]
    fn test_parse_global_variable() {
        let program = parse_source("int counter = 0;").unwrap();
        let Decl::Var(var) = &program.declarations[0] else {
            panic!("expected variable declaration");
        };
        assert_eq!(var.name, "counter");
        assert!(matches!(var.init, Some(Expr::IntLit(ref lit)) if lit.value == 0));
    }

    #[test]
    fn test_parse_uninitialized_variable() {
        let program = parse_source("char c;").unwrap();
        let Decl::Var(var) = &program.declarations[0] else {
            panic!("expected variable declaration");
        };
        assert_eq!(var.ty, TypeSpec::Char);
        assert!(var.init.is_none());
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let program = parse_source("int a; int f(); int b;").unwrap();
        let names: Vec<&str> = program
            .declarations
            .iter()
            .map(|d| match d {
                Decl::Function(f) => f.name.as_str(),
                Decl::Var(v) => v.name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["a", "f", "b"]);
    }

    #[test]
    fn test_missing_type_specifier() {
        let err = parse_source("x = 5;").unwrap_err();
        assert!(err.message.contains("expected type specifier"));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_source("int x = 5").unwrap_err();
        assert!(err.message.contains("';'"));
    }

    #[test]
    fn test_void_parameter_rejected() {
        let err = parse_source("int f(void v);").unwrap_err();
        assert!(err.message.contains("expected parameter type"));
    }

    #[test]
    fn test_error_location() {
        let err = parse_source("int main() {\n  return 1\n}").unwrap_err();
        assert_eq!(err.line, 3);
    }
}
