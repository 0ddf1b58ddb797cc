//! Declaration parsing: functions and variables.

use minic_lex::TokenKind;

use crate::{
    Decl, FunctionDecl, Param, ParseError, Parser, TypeSpec, VarDecl,
};

impl Parser {
    /// Parse a declaration, which starts with a type keyword.
    ///
    /// After `type ident`, a `(` marks a function; anything else is a
    /// variable declaration.
    pub(crate) fn parse_declaration(&mut self) -> Result<Decl, ParseError> {
        let type_token = self.current().clone();
        let Some(ty) = type_spec(type_token.kind) else {
            return Err(self.error_here(format!(
                "expected type specifier, found {}",
                self.kind().describe()
            )));
        };
        self.bump();

        let name_token = self.expect(TokenKind::Ident)?;
        let name = name_token.lexeme;
        let start = type_token.span;

        if self.check(TokenKind::LParen) {
            let func = self.parse_function_decl(ty, name, start)?;
            Ok(Decl::Function(func))
        } else {
            let var = self.parse_var_decl_rest(ty, name, start)?;
            Ok(Decl::Var(var))
        }
    }

    /// Parse the remainder of a function declaration, after `type ident`.
    fn parse_function_decl(
        &mut self,
        return_type: TypeSpec,
        name: String,
        start: minic_util::Span,
    ) -> Result<FunctionDecl, ParseError> {
        self.expect(TokenKind::LParen)?;

        let params = if self.check(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_parameter_list()?
        };

        let close = self.expect(TokenKind::RParen)?;

        // `{` opens a body; a `;` makes this a forward declaration.
        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_compound()?)
        } else {
            self.expect(TokenKind::Semicolon)?;
            None
        };

        let end = body.as_ref().map(|b| b.span).unwrap_or(close.span);
        Ok(FunctionDecl {
            return_type,
            name,
            params,
            body,
            span: start.merge(end),
        })
    }

    /// Parse a comma-separated, non-empty parameter list.
    ///
    /// `void` is not a parameter type.
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        loop {
            let type_token = self.current().clone();
            let ty = match param_type_spec(type_token.kind) {
                Some(ty) => ty,
                None => return Err(self.error_here("expected parameter type")),
            };
            self.bump();

            let name_token = self.expect(TokenKind::Ident)?;
            params.push(Param {
                ty,
                name: name_token.lexeme,
                span: type_token.span.merge(name_token.span),
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse the remainder of a variable declaration, after `type ident`.
    pub(crate) fn parse_var_decl_rest(
        &mut self,
        ty: TypeSpec,
        name: String,
        start: minic_util::Span,
    ) -> Result<VarDecl, ParseError> {
        let init = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(VarDecl {
            ty,
            name,
            init,
            span: start.merge(semi.span),
        })
    }
}

/// Type specifier for declarations.
pub(crate) fn type_spec(kind: TokenKind) -> Option<TypeSpec> {
    match kind {
        TokenKind::Int => Some(TypeSpec::Int),
        TokenKind::Float => Some(TypeSpec::Float),
        TokenKind::Char => Some(TypeSpec::Char),
        TokenKind::Void => Some(TypeSpec::Void),
        _ => None,
    }
}

/// Type specifier for parameters; excludes `void`.
fn param_type_spec(kind: TokenKind) -> Option<TypeSpec> {
    match kind {
        TokenKind::Int => Some(TypeSpec::Int),
        TokenKind::Float => Some(TypeSpec::Float),
        TokenKind::Char => Some(TypeSpec::Char),
        _ => None,
    }
}
