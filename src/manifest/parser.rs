//! Recursive-descent parser for the manifest grammar.
//!
//! ```text
//! manifest  := { statement (NEWLINE | EOF) }
//! statement := IDENT '=' expr
//! expr      := term { '+' term }
//! term      := STRING { STRING } | INT | True | False | None
//!            | '{' [ expr ':' expr { ',' expr ':' expr } [','] ] '}'
//!            | '[' [ expr { ',' expr } [','] ] ']'
//!            | '(' expr ')'
//!            | Var '(' STRING ')'
//!            | From '(' STRING [ ',' STRING ] ')'
//! ```
//!
//! Anything outside this grammar is rejected with
//! [`Error::UnsupportedExpression`]; the manifest is data and is never
//! executed. Terms nest at most [`MAX_NESTING`] levels deep.

use super::lexer::{Token, TokenKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Concat(Vec<Expr>),
    Var(String),
    From {
        module: String,
        path: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub value: Expr,
    pub line: usize,
}

/// Deepest nesting of dicts, lists and parentheses accepted.
pub const MAX_NESTING: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

/// Parse a token stream produced by [`super::lexer::tokenize`].
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Statement>> {
    Parser {
        tokens,
        pos: 0,
        depth: 0,
    }
    .manifest()
}

fn unexpected(token: &Token, expected: &str) -> Error {
    let message = format!("expected {}, found {}", expected, token.kind.describe());
    match token.kind {
        TokenKind::Symbol(_) | TokenKind::Ident(_) => Error::UnsupportedExpression {
            line: token.line,
            message,
        },
        _ => Error::ManifestParse {
            line: token.line,
            message,
        },
    }
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(unexpected(self.peek(), &kind.describe()))
        }
    }

    fn manifest(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&TokenKind::Newline) {}
            if self.peek().kind == TokenKind::Eof {
                return Ok(statements);
            }
            statements.push(self.statement()?);
            match self.peek().kind {
                TokenKind::Newline | TokenKind::Eof => {}
                _ => return Err(unexpected(self.peek(), "end of line")),
            }
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let token = self.advance();
        let name = match token.kind {
            TokenKind::Ident(name) => name,
            _ => {
                return Err(Error::UnsupportedExpression {
                    line: token.line,
                    message: format!(
                        "expected an assignment, found {}",
                        token.kind.describe()
                    ),
                })
            }
        };
        if self.peek().kind != TokenKind::Equals {
            return Err(Error::UnsupportedExpression {
                line: token.line,
                message: format!(
                    "only simple `name = value` assignments are supported, found {} after `{}`",
                    self.peek().kind.describe(),
                    name
                ),
            });
        }
        self.advance();
        let value = self.expr()?;
        Ok(Statement {
            name,
            value,
            line: token.line,
        })
    }

    fn expr(&mut self) -> Result<Expr> {
        let first = self.term()?;
        if self.peek().kind != TokenKind::Plus {
            return Ok(first);
        }
        let line = first.line;
        let mut parts = vec![first];
        while self.eat(&TokenKind::Plus) {
            parts.push(self.term()?);
        }
        Ok(Expr {
            kind: ExprKind::Concat(parts),
            line,
        })
    }

    fn term(&mut self) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(Error::ManifestParse {
                line: self.peek().line,
                message: format!("values nested more than {} levels deep", MAX_NESTING),
            });
        }
        self.depth += 1;
        let result = self.nested_term();
        self.depth -= 1;
        result
    }

    fn nested_term(&mut self) -> Result<Expr> {
        let token = self.advance();
        let line = token.line;
        let kind = match token.kind {
            TokenKind::Str(mut s) => {
                while let TokenKind::Str(next) = &self.peek().kind {
                    s.push_str(next);
                    self.advance();
                }
                ExprKind::Str(s)
            }
            TokenKind::Int(n) => ExprKind::Int(n),
            TokenKind::LBrace => self.dict()?,
            TokenKind::LBracket => self.list()?,
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::Ident(name) => self.named(name, line)?,
            _ => return Err(unexpected(&token, "a value")),
        };
        Ok(Expr { kind, line })
    }

    fn named(&mut self, name: String, line: usize) -> Result<ExprKind> {
        match name.as_str() {
            "True" => return Ok(ExprKind::Bool(true)),
            "False" => return Ok(ExprKind::Bool(false)),
            "None" => return Ok(ExprKind::None),
            _ => {}
        }
        if self.peek().kind != TokenKind::LParen {
            return Err(Error::UnsupportedExpression {
                line,
                message: format!(
                    "bare identifier `{}` is not supported; use Var(\"{}\")",
                    name, name
                ),
            });
        }
        match name.as_str() {
            "Var" => {
                self.advance();
                let var = self.string_arg()?;
                self.expect(TokenKind::RParen)?;
                Ok(ExprKind::Var(var))
            }
            "From" => {
                self.advance();
                let module = self.string_arg()?;
                let path = if self.eat(&TokenKind::Comma)
                    && !matches!(self.peek().kind, TokenKind::RParen)
                {
                    Some(self.string_arg()?)
                } else {
                    None
                };
                self.expect(TokenKind::RParen)?;
                Ok(ExprKind::From { module, path })
            }
            _ => Err(Error::UnsupportedExpression {
                line,
                message: format!(
                    "call to `{}` is not supported; only Var(...) and From(...) are",
                    name
                ),
            }),
        }
    }

    fn string_arg(&mut self) -> Result<String> {
        let token = self.advance();
        match token.kind {
            TokenKind::Str(mut s) => {
                while let TokenKind::Str(next) = &self.peek().kind {
                    s.push_str(next);
                    self.advance();
                }
                Ok(s)
            }
            _ => Err(Error::UnsupportedExpression {
                line: token.line,
                message: format!(
                    "expected a string literal argument, found {}",
                    token.kind.describe()
                ),
            }),
        }
    }

    fn dict(&mut self) -> Result<ExprKind> {
        let mut entries = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let key = self.expr()?;
            self.expect(TokenKind::Colon)?;
            let value = self.expr()?;
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) && self.peek().kind != TokenKind::RBrace {
                return Err(unexpected(self.peek(), "`,` or `}`"));
            }
        }
        Ok(ExprKind::Dict(entries))
    }

    fn list(&mut self) -> Result<ExprKind> {
        let mut items = Vec::new();
        while !self.eat(&TokenKind::RBracket) {
            items.push(self.expr()?);
            if !self.eat(&TokenKind::Comma) && self.peek().kind != TokenKind::RBracket {
                return Err(unexpected(self.peek(), "`,` or `]`"));
            }
        }
        Ok(ExprKind::List(items))
    }
}
