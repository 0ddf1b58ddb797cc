//! Expression parsing with a Pratt core.
//!
//! Each infix operator has a (left, right) binding-power pair; higher
//! numbers bind tighter. Left-associative operators use `right = left + 1`,
//! the right-associative `=` uses `right = left`. The resulting precedence
//! ladder, lowest to highest: assignment, `||`, `&&`, equality, relational,
//! additive, multiplicative, unary, postfix call, primary.

use minic_lex::TokenKind;

use crate::{
    AssignExpr, BinaryExpr, BinOp, CallExpr, Expr, FloatLit, IdentExpr, IntLit, ParseError,
    Parser, StrLit, UnaryExpr, UnOp,
};

/// Binding power levels. Higher numbers bind tighter.
mod bp {
    /// Minimum binding power (start of expression).
    pub const MIN: u8 = 0;

    /// Assignment: `=` (right-associative)
    pub const ASSIGN: u8 = 1;

    /// Logical OR: `||`
    pub const LOGICAL_OR: u8 = 3;

    /// Logical AND: `&&`
    pub const LOGICAL_AND: u8 = 5;

    /// Equality: `==`, `!=`
    pub const EQUALITY: u8 = 7;

    /// Relational: `<`, `>`, `<=`, `>=`
    pub const RELATIONAL: u8 = 9;

    /// Additive: `+`, `-`
    pub const ADDITIVE: u8 = 11;

    /// Multiplicative: `*`, `/`, `%`
    pub const MULTIPLICATIVE: u8 = 13;

    /// Prefix `-` and `!`
    pub const UNARY: u8 = 15;
}

impl Parser {
    /// Parse a complete expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(bp::MIN)
    }

    /// Pratt parser core: parse an expression consuming only operators whose
    /// left binding power is at least `min_bp`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (_, rbp) = match self.infix_binding_power() {
                Some(bp) if bp.0 >= min_bp => bp,
                _ => break,
            };

            let op_token = self.bump();
            let rhs = self.parse_expr_bp(rbp)?;

            lhs = if op_token.kind == TokenKind::Assign {
                // Only a bare identifier may be assigned to.
                let Expr::Ident(ident) = lhs else {
                    return Err(ParseError::new(
                        op_token.line(),
                        op_token.column(),
                        "invalid assignment target",
                    ));
                };
                let span = ident.span.merge(rhs.span());
                Expr::Assign(AssignExpr {
                    target: ident.name,
                    value: Box::new(rhs),
                    span,
                })
            } else {
                let op = binop_for(op_token.kind);
                let span = lhs.span().merge(rhs.span());
                Expr::Binary(BinaryExpr {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span,
                })
            };
        }

        Ok(lhs)
    }

    /// Binding powers for the token at the cursor, if it is an infix
    /// operator.
    fn infix_binding_power(&self) -> Option<(u8, u8)> {
        match self.kind() {
            // Right-associative: right_bp == left_bp
            TokenKind::Assign => Some((bp::ASSIGN, bp::ASSIGN)),
            // The rest are left-associative: right_bp == left_bp + 1
            TokenKind::OrOr => Some((bp::LOGICAL_OR, bp::LOGICAL_OR + 1)),
            TokenKind::AndAnd => Some((bp::LOGICAL_AND, bp::LOGICAL_AND + 1)),
            TokenKind::EqEq | TokenKind::NotEq => Some((bp::EQUALITY, bp::EQUALITY + 1)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Some((bp::RELATIONAL, bp::RELATIONAL + 1))
            }
            TokenKind::Plus | TokenKind::Minus => Some((bp::ADDITIVE, bp::ADDITIVE + 1)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                Some((bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1))
            }
            _ => None,
        }
    }

    /// Parse a prefix expression: a unary operator application or a primary
    /// with optional postfix call.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let op = match self.kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Not => Some(UnOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            let op_token = self.bump();
            let operand = self.parse_expr_bp(bp::UNARY)?;
            let span = op_token.span.merge(operand.span());
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span,
            }));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// Parse a postfix function call, if one follows.
    ///
    /// Only an identifier can be called; `(f)(x)` is rejected.
    fn parse_postfix(&mut self, expr: Expr) -> Result<Expr, ParseError> {
        if !self.check(TokenKind::LParen) {
            return Ok(expr);
        }

        let Expr::Ident(ident) = expr else {
            return Err(self.error_here("invalid function call"));
        };

        self.bump(); // '('

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }

        let close = self.expect(TokenKind::RParen)?;
        Ok(Expr::Call(CallExpr {
            name: ident.name,
            args,
            span: ident.span.merge(close.span),
        }))
    }

    /// Parse a primary expression: literal, identifier, or parenthesized
    /// expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.kind() {
            TokenKind::IntLiteral => {
                let token = self.bump();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        token.line(),
                        token.column(),
                        format!("integer literal '{}' is out of range", token.lexeme),
                    )
                })?;
                Ok(Expr::IntLit(IntLit {
                    value,
                    span: token.span,
                }))
            }
            TokenKind::FloatLiteral => {
                let token = self.bump();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        token.line(),
                        token.column(),
                        format!("invalid float literal '{}'", token.lexeme),
                    )
                })?;
                Ok(Expr::FloatLit(FloatLit {
                    value,
                    span: token.span,
                }))
            }
            TokenKind::StringLiteral => {
                let token = self.bump();
                Ok(Expr::StrLit(StrLit {
                    value: token.lexeme,
                    span: token.span,
                }))
            }
            TokenKind::Ident => {
                let token = self.bump();
                Ok(Expr::Ident(IdentExpr {
                    name: token.lexeme,
                    span: token.span,
                }))
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            kind => Err(self.error_here(format!(
                "expected expression, found {}",
                kind.describe()
            ))),
        }
    }
}

/// Convert an infix operator token to its [`BinOp`].
///
/// Only called for tokens [`Parser::infix_binding_power`] accepted, minus
/// assignment.
fn binop_for(kind: TokenKind) -> BinOp {
    match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::AndAnd => BinOp::And,
        TokenKind::OrOr => BinOp::Or,
        _ => unreachable!("not an infix operator token: {:?}", kind),
    }
}
