//! Tokenizer for the Lua literal-data grammar.
//!
//! [`Lexer`] walks the source once and yields [`Token`]s lazily. It is `Clone`,
//! so a consumer can restart from any point by cloning before it advances.
//! Comments and whitespace never reach the token stream:
//!
//! - `-- ...` runs to the end of the line
//! - `--[[ ... ]]` and leveled `--[==[ ... ]==]` block comments close only on
//!   a bracket of the same level
//!
//! A minus sign is always its own token. The parser decides whether it folds
//! into the following number (see [`crate::parser`]).

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Equals,
    Minus,
    Dot,
    Colon,
}

impl Punct {
    pub const fn as_str(self) -> &'static str {
        match self {
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Comma => ",",
            Punct::Semicolon => ";",
            Punct::Equals => "=",
            Punct::Minus => "-",
            Punct::Dot => ".",
            Punct::Colon => ":",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    /// String literal with escapes already decoded.
    Str(String),
    /// Unsigned numeric literal exactly as written. `is_float` is set when the
    /// text has a decimal point or an exponent.
    Number {
        text: String,
        is_float: bool,
    },
    Punct(Punct),
    True,
    False,
    Nil,
    Eof,
}

impl TokenKind {
    /// Short human-readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier `{name}`"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Number { text, .. } => format!("number `{text}`"),
            TokenKind::Punct(p) => format!("`{}`", p.as_str()),
            TokenKind::True => "`true`".to_string(),
            TokenKind::False => "`false`".to_string(),
            TokenKind::Nil => "`nil`".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }
}

/// Lazy token stream over a source string.
///
/// Yields `Ok(Token)` items ending with exactly one [`TokenKind::Eof`], or
/// stops after the first `Err`.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    done: bool,
}

/// Tokenize the whole source, failing on the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        // A leading byte-order mark is not part of the source.
        let pos = if src.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            src,
            pos,
            done: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_byte_at(&self, n: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + n).copied()
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, start));
        };

        let punct = match c {
            '{' => Some(Punct::LBrace),
            '}' => Some(Punct::RBrace),
            '(' => Some(Punct::LParen),
            ')' => Some(Punct::RParen),
            '[' => Some(Punct::LBracket),
            ']' => Some(Punct::RBracket),
            ',' => Some(Punct::Comma),
            ';' => Some(Punct::Semicolon),
            '=' => Some(Punct::Equals),
            '-' => Some(Punct::Minus),
            ':' => Some(Punct::Colon),
            '.' if !self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => Some(Punct::Dot),
            _ => None,
        };
        if let Some(p) = punct {
            self.pos += 1;
            return Ok(Token::new(TokenKind::Punct(p), start));
        }

        let kind = match c {
            '"' | '\'' => self.string(c)?,
            '0'..='9' | '.' => self.number()?,
            c if is_ident_start(c) => self.identifier(),
            other => {
                return Err(LexError::UnexpectedCharacter {
                    offset: start,
                    ch: other,
                })
            }
        };
        Ok(Token::new(kind, start))
    }

    /// Skip whitespace and comments until the next significant character.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if !trimmed.starts_with("--") {
                return Ok(());
            }
            let comment_start = self.pos;
            self.pos += 2;
            match self.long_bracket_level() {
                Some(level) => self.skip_block_comment(comment_start, level)?,
                None => {
                    let rest = self.rest();
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
            }
        }
    }

    /// If a long bracket opener (`[[`, `[=[`, `[==[`, ...) starts at the
    /// cursor, consume it and return its level.
    fn long_bracket_level(&mut self) -> Option<usize> {
        if self.peek_byte_at(0) != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek_byte_at(1 + level) == Some(b'=') {
            level += 1;
        }
        if self.peek_byte_at(1 + level) != Some(b'[') {
            return None;
        }
        self.pos += level + 2;
        Some(level)
    }

    fn skip_block_comment(&mut self, comment_start: usize, level: usize) -> Result<(), LexError> {
        let close = format!("]{}]", "=".repeat(level));
        match self.rest().find(&close) {
            Some(idx) => {
                self.pos += idx + close.len();
                Ok(())
            }
            None => Err(LexError::UnterminatedComment {
                offset: comment_start,
            }),
        }
    }

    /// A quoted string. Decoded into bytes first because a `\ddd` escape
    /// names a single byte; the result must still be valid UTF-8.
    fn string(&mut self, quote: char) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.pos += 1;
        let mut out: Vec<u8> = Vec::new();
        let mut first_raw_byte: Option<(usize, char)> = None;
        let mut buf = [0u8; 4];

        loop {
            let Some(c) = self.peek() else {
                return Err(LexError::UnterminatedString { offset: start });
            };
            match c {
                c if c == quote => {
                    self.pos += 1;
                    return String::from_utf8(out).map(TokenKind::Str).map_err(|_| {
                        let (offset, escape) = first_raw_byte.unwrap_or((start, quote));
                        LexError::InvalidEscape { offset, escape }
                    });
                }
                '\n' | '\r' => return Err(LexError::UnterminatedString { offset: start }),
                '\\' => {
                    let escape_at = self.pos;
                    self.pos += 1;
                    let Some(e) = self.peek() else {
                        return Err(LexError::UnterminatedString { offset: start });
                    };
                    self.pos += e.len_utf8();
                    let decoded = match e {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' | '"' | '\'' => e,
                        '\n' => '\n',
                        '\r' => {
                            if self.peek_byte_at(0) == Some(b'\n') {
                                self.pos += 1;
                            }
                            '\n'
                        }
                        '0'..='9' => {
                            let byte = u8::try_from(self.decimal_escape(e)).map_err(|_| {
                                LexError::InvalidEscape {
                                    offset: escape_at,
                                    escape: e,
                                }
                            })?;
                            if !byte.is_ascii() && first_raw_byte.is_none() {
                                first_raw_byte = Some((escape_at, e));
                            }
                            out.push(byte);
                            continue;
                        }
                        other => {
                            return Err(LexError::InvalidEscape {
                                offset: escape_at,
                                escape: other,
                            })
                        }
                    };
                    out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                }
                c => {
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Value of a `\ddd` escape: `first` plus up to two more decimal digits.
    fn decimal_escape(&mut self, first: char) -> u32 {
        let mut value = first as u32 - '0' as u32;
        for _ in 0..2 {
            match self.peek_byte_at(0) {
                Some(b @ b'0'..=b'9') => {
                    value = value * 10 + u32::from(b - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        value
    }

    fn eat_digits(&mut self) -> usize {
        let count = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        self.pos += count;
        count
    }

    fn number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let mut is_float = false;

        self.eat_digits();
        if self.peek_byte_at(0) == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek_byte_at(0), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek_byte_at(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                return Err(self.invalid_number(start));
            }
        }
        if self
            .peek_byte_at(0)
            .is_some_and(|b| b == b'.' || is_ident_byte(b))
        {
            return Err(self.invalid_number(start));
        }

        // Integers too large for i64 become floats later, so they must fit f64.
        let text = &self.src[start..self.pos];
        if !text.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(self.invalid_number(start));
        }
        Ok(TokenKind::Number {
            text: text.to_string(),
            is_float,
        })
    }

    /// Swallow the rest of a malformed literal so the error shows all of it.
    fn invalid_number(&mut self, start: usize) -> LexError {
        let glued = self
            .rest()
            .bytes()
            .take_while(|&b| b == b'.' || is_ident_byte(b))
            .count();
        self.pos += glued;
        LexError::InvalidNumber {
            offset: start,
            text: self.src[start..self.pos].to_string(),
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        self.pos += self.rest().bytes().take_while(|&b| is_ident_byte(b)).count();
        match &self.src[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            name => TokenKind::Identifier(name.to_string()),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_token();
        if matches!(
            item,
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            }) | Err(_)
        ) {
            self.done = true;
        }
        Some(item)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
