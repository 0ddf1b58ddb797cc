//! The scanner itself.

use minic_util::Span;

use crate::cursor::Cursor;
use crate::{keyword_kind, LexicalError, Token, TokenKind};

/// Scanner for the minic language.
///
/// Construct with [`Lexer::new`] and consume with [`Lexer::tokenize`]; each
/// lexer instance is good for exactly one run over one source string.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,

    /// Byte offset where the current token starts.
    token_start: usize,

    /// Line where the current token starts (1-based).
    token_start_line: u32,

    /// Column where the current token starts (1-based).
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Tokenizes the entire source, ending with a single `Eof` token.
    ///
    /// Fails fast: the first unexpected character, malformed number, or
    /// unterminated string aborts the scan.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();

            if self.cursor.is_at_end() {
                break;
            }

            self.token_start = self.cursor.position();
            self.token_start_line = self.cursor.line();
            self.token_start_column = self.cursor.column();

            let c = self.cursor.current_char();
            let token = if c.is_ascii_digit() {
                self.lex_number()?
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.lex_identifier()
            } else if c == '"' {
                self.lex_string()?
            } else {
                self.lex_operator()?
            };

            tokens.push(token);
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            "",
            Span::point(self.cursor.line(), self.cursor.column()),
        ));

        Ok(tokens)
    }

    /// Skips whitespace and both comment forms.
    ///
    /// An unterminated block comment runs to end of input without a
    /// diagnostic.
    fn skip_trivia(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if matches!(c, ' ' | '\t' | '\r' | '\n') {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_char() == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_char() == '*' {
                self.cursor.advance();
                self.cursor.advance();
                while !self.cursor.is_at_end() {
                    if self.cursor.current_char() == '*' && self.cursor.peek_char() == '/' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Scans a maximal `[0-9.]+` run; at most one `.` is allowed.
    fn lex_number(&mut self) -> Result<Token, LexicalError> {
        let mut is_float = false;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                self.cursor.advance();
            } else if c == '.' {
                if is_float {
                    return Err(self.error_here("invalid number format"));
                }
                is_float = true;
                self.cursor.advance();
            } else {
                break;
            }
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Ok(self.token_from_start(kind))
    }

    /// Scans a maximal identifier run and classifies it against the keyword
    /// table.
    fn lex_identifier(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_alphanumeric()
            || self.cursor.current_char() == '_'
        {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let kind = keyword_kind(text).unwrap_or(TokenKind::Ident);
        self.token_from_start(kind)
    }

    /// Scans a string literal. `\"` yields a single embedded quote; any
    /// other backslash passes through verbatim.
    fn lex_string(&mut self) -> Result<Token, LexicalError> {
        self.cursor.advance(); // opening quote

        let mut content = String::new();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '"' {
            if self.cursor.current_char() == '\\' && self.cursor.peek_char() == '"' {
                content.push('"');
                self.cursor.advance();
                self.cursor.advance();
            } else {
                content.push(self.cursor.current_char());
                self.cursor.advance();
            }
        }

        if self.cursor.is_at_end() {
            return Err(self.error_here("unterminated string literal"));
        }

        self.cursor.advance(); // closing quote

        Ok(Token::new(
            TokenKind::StringLiteral,
            content,
            self.span_from_start(),
        ))
    }

    /// Scans an operator or delimiter, trying two-character forms first.
    fn lex_operator(&mut self) -> Result<Token, LexicalError> {
        let c = self.cursor.current_char();
        let next = self.cursor.peek_char();

        let two_char = match (c, next) {
            ('=', '=') => Some(TokenKind::EqEq),
            ('!', '=') => Some(TokenKind::NotEq),
            ('<', '=') => Some(TokenKind::LtEq),
            ('>', '=') => Some(TokenKind::GtEq),
            ('&', '&') => Some(TokenKind::AndAnd),
            ('|', '|') => Some(TokenKind::OrOr),
            _ => None,
        };

        if let Some(kind) = two_char {
            self.cursor.advance();
            self.cursor.advance();
            return Ok(self.token_from_start(kind));
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '!' => TokenKind::Not,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            _ => {
                return Err(self.error_here(format!("unexpected character: '{}'", c)));
            }
        };

        self.cursor.advance();
        Ok(self.token_from_start(kind))
    }

    /// Builds a token whose lexeme is the source slice since `token_start`.
    fn token_from_start(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.cursor.slice_from(self.token_start),
            self.span_from_start(),
        )
    }

    fn span_from_start(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    fn error_here(&self, message: impl Into<String>) -> LexicalError {
        LexicalError::new(self.cursor.line(), self.cursor.column(), message)
    }
}
