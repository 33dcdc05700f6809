//! Tokenizer for the manifest grammar.
//!
//! Newlines are significant only outside brackets, where they terminate an
//! assignment. Inside `()`, `[]` and `{}` they are skipped, as is a backslash
//! at the end of a line. Punctuation the grammar has no use for is passed on
//! as [`TokenKind::Symbol`] so the parser can report it as unsupported
//! instead of as a lexical error.

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Equals,
    Colon,
    Comma,
    Plus,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Newline,
    Symbol(char),
    Eof,
}

impl TokenKind {
    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Int(n) => format!("integer {}", n),
            TokenKind::Equals => "`=`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Plus => "`+`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Symbol(c) => format!("`{}`", c),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    depth: usize,
    tokens: Vec<Token>,
}

/// Split manifest text into tokens. The result always ends with `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer {
        chars: input.chars().peekable(),
        line: 1,
        depth: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer<'_> {
    fn push(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    fn open(&mut self, kind: TokenKind) {
        self.depth += 1;
        self.push(kind);
    }

    fn close(&mut self, kind: TokenKind) {
        self.depth = self.depth.saturating_sub(1);
        self.push(kind);
    }

    fn run(&mut self) -> Result<()> {
        while let Some(c) = self.chars.next() {
            match c {
                '\n' => {
                    if self.depth == 0 {
                        self.push(TokenKind::Newline);
                    }
                    self.line += 1;
                }
                ' ' | '\t' | '\r' => {}
                '#' => {
                    while self.chars.next_if(|&c| c != '\n').is_some() {}
                }
                '\\' if self.chars.peek() == Some(&'\n') => {
                    self.chars.next();
                    self.line += 1;
                }
                '\'' | '"' => {
                    let s = self.string(c)?;
                    self.push(TokenKind::Str(s));
                }
                '=' if self.chars.peek() == Some(&'=') => {
                    self.chars.next();
                    self.push(TokenKind::Symbol('='));
                }
                '=' => self.push(TokenKind::Equals),
                ':' => self.push(TokenKind::Colon),
                ',' => self.push(TokenKind::Comma),
                '+' => self.push(TokenKind::Plus),
                '(' => self.open(TokenKind::LParen),
                ')' => self.close(TokenKind::RParen),
                '[' => self.open(TokenKind::LBracket),
                ']' => self.close(TokenKind::RBracket),
                '{' => self.open(TokenKind::LBrace),
                '}' => self.close(TokenKind::RBrace),
                c if c.is_ascii_digit() => {
                    let n = self.integer(c)?;
                    self.push(TokenKind::Int(n));
                }
                c if c == '_' || c.is_alphabetic() => {
                    let mut ident = String::from(c);
                    while let Some(c) = self.chars.next_if(|&c| c == '_' || c.is_alphanumeric()) {
                        ident.push(c);
                    }
                    self.push(TokenKind::Ident(ident));
                }
                other => self.push(TokenKind::Symbol(other)),
            }
        }
        self.push(TokenKind::Eof);
        Ok(())
    }

    fn integer(&mut self, first: char) -> Result<i64> {
        let mut digits = String::from(first);
        while let Some(c) = self.chars.next_if(char::is_ascii_digit) {
            digits.push(c);
        }
        digits.parse().map_err(|_| Error::ManifestParse {
            line: self.line,
            message: format!("integer literal {} is out of range", digits),
        })
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let start = self.line;
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None | Some('\n') => {
                    return Err(Error::ManifestParse {
                        line: start,
                        message: "unterminated string literal".to_string(),
                    })
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some('\n') => self.line += 1,
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => {
                        return Err(Error::ManifestParse {
                            line: start,
                            message: "unterminated string literal".to_string(),
                        })
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }
}
