//! Statement parsing.

use minic_lex::TokenKind;

use crate::items::type_spec;
use crate::{
    Block, ExprStmt, ForInit, ForStmt, IfStmt, ParseError, Parser, ReturnStmt, Stmt, WhileStmt,
};

impl Parser {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.kind() {
            TokenKind::Int | TokenKind::Float | TokenKind::Char => self.parse_decl_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::LBrace => Ok(Stmt::Compound(self.parse_compound()?)),
            _ => self.parse_expression_statement().map(Stmt::Expr),
        }
    }

    /// Parse a `{ … }` block.
    pub(crate) fn parse_compound(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error_here("expected '}', found end of input"));
            }
            stmts.push(self.parse_statement()?);
        }

        let close = self.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: open.span.merge(close.span),
        })
    }

    /// Parse a local variable declaration statement.
    ///
    /// Function definitions are top-level only, so `type ident (` is a
    /// parse error here.
    fn parse_decl_statement(&mut self) -> Result<Stmt, ParseError> {
        let type_token = self.bump();
        let ty = type_spec(type_token.kind).expect("caller checked for a type keyword");
        let name_token = self.expect(TokenKind::Ident)?;

        if self.check(TokenKind::LParen) {
            return Err(self.error_here("function definitions are only allowed at top level"));
        }

        let var = self.parse_var_decl_rest(ty, name_token.lexeme, type_token.span)?;
        Ok(Stmt::Decl(var))
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.expect(TokenKind::Return)?;

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: keyword.span.merge(semi.span),
        }))
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_statement()?);

        // `else` binds to the nearest prior `if`.
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: keyword.span,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While(WhileStmt {
            cond,
            body,
            span: keyword.span,
        }))
    }

    /// Parse a `for` statement. The init clause is a declaration, an
    /// expression statement, or empty; condition and update are optional.
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init = match self.kind() {
            TokenKind::Int | TokenKind::Float | TokenKind::Char => {
                let type_token = self.bump();
                let ty = type_spec(type_token.kind).expect("checked for a type keyword");
                let name_token = self.expect(TokenKind::Ident)?;
                let var = self.parse_var_decl_rest(ty, name_token.lexeme, type_token.span)?;
                Some(ForInit::Decl(var))
            }
            TokenKind::Semicolon => {
                self.bump();
                None
            }
            _ => Some(ForInit::Expr(self.parse_expression_statement()?)),
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For(ForStmt {
            init,
            cond,
            update,
            body,
            span: keyword.span,
        }))
    }

    /// Parse an expression statement; a bare `;` carries no expression.
    fn parse_expression_statement(&mut self) -> Result<ExprStmt, ParseError> {
        if self.check(TokenKind::Semicolon) {
            let semi = self.bump();
            return Ok(ExprStmt {
                expr: None,
                span: semi.span,
            });
        }

        let expr = self.parse_expr()?;
        let semi = self.expect(TokenKind::Semicolon)?;
        let span = expr.span().merge(semi.span);
        Ok(ExprStmt {
            expr: Some(expr),
            span,
        })
    }
}
