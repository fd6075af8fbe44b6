//! Recursive-descent parser from tokens to a [`Value`] tree.
//!
//! Grammar:
//!
//! ```text
//! document   := entry+ EOF | table EOF
//! entry      := identifier (('.' | ':') identifier)* ( '(' table ')' | table )
//! table      := '{' field_list? '}'
//! field_list := field (sep field)* sep?          sep := ',' | ';'
//! field      := identifier '=' value
//!             | '[' key ']' '=' value
//!             | value
//! key        := string | '-'? number
//! value      := string | '-'? number | true | false | nil | table
//! ```
//!
//! # Key design decisions
//!
//! - **Dual-mode entry**: a document is either one or more wrapping calls
//!   (`data:extend({...})`) or a single bare table. With one call the payload
//!   is returned as is. With several, payloads are merged into one sequence:
//!   sequence payloads contribute their elements, anything else contributes
//!   itself.
//! - **Table classification**: positional fields only → `Sequence`; keyed
//!   fields only → `Mapping`, unless every key is a bracketed integer and the
//!   keys are exactly `1..=N`, which is a `Sequence` ordered by key. Mixing the
//!   two forms is rejected with [`ParseError::MixedTableForm`]. `{}` follows
//!   [`ParseOptions::empty_table`].
//! - **Duplicate keys**: keys are compared by their final text, so `[1]` and
//!   `["1"]` are the same JSON key. The last value wins; the key keeps the
//!   position of its first occurrence. A key spelled both ways never counts
//!   towards the `1..=N` sequence case.
//! - **Negative numbers**: `-` folds into a number token that starts right
//!   after it. `- 5` is rejected.
//! - **Recursion**: nested tables recurse with no depth cap. Depth is bounded
//!   only by the thread's stack.

use std::collections::HashMap;

use crate::encoder::format_float;
use crate::error::ParseError;
use crate::lexer::{Punct, Token, TokenKind};
use crate::options::{EmptyTable, ParseOptions};
use crate::types::Value;

/// Parse a token stream (as produced by [`crate::lexer::tokenize`]) into the
/// payload value.
pub fn parse(tokens: &[Token], options: &ParseOptions) -> Result<Value, ParseError> {
    let eof_offset = tokens.last().map_or(0, |t| t.offset);
    let mut parser = Parser {
        tokens,
        pos: 0,
        eof: Token::new(TokenKind::Eof, eof_offset),
        options,
    };
    parser.document()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldKey {
    Name(String),
    Index(i64),
}

impl FieldKey {
    /// The JSON key text, plus the index when the key was an integer.
    fn into_parts(self) -> (String, Option<i64>) {
        match self {
            FieldKey::Name(name) => (name, None),
            FieldKey::Index(i) => (i.to_string(), Some(i)),
        }
    }
}

struct Field {
    key: Option<FieldKey>,
    value: Value,
    offset: usize,
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    eof: Token,
    options: &'t ParseOptions,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    fn at(&self, punct: Punct) -> bool {
        self.peek().is_punct(punct)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Error for the current token, which did not match `expected`.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => ParseError::UnexpectedEndOfInput {
                offset: token.offset,
                expected,
            },
            _ => ParseError::UnexpectedToken {
                offset: token.offset,
                expected,
                found: token.kind.describe(),
            },
        }
    }

    fn expect(&mut self, punct: Punct, expected: &'static str) -> Result<(), ParseError> {
        if self.at(punct) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of input")),
        }
    }

    fn document(&mut self) -> Result<Value, ParseError> {
        match self.peek().kind {
            TokenKind::Punct(Punct::LBrace) => {
                let value = self.table()?;
                self.expect_eof()?;
                Ok(value)
            }
            TokenKind::Identifier(_) => {
                let mut payloads = vec![self.entry()?];
                while matches!(self.peek().kind, TokenKind::Identifier(_)) {
                    payloads.push(self.entry()?);
                }
                self.expect_eof()?;
                Ok(merge_payloads(payloads))
            }
            _ => Err(ParseError::MissingEntryPoint {
                offset: self.peek().offset,
            }),
        }
    }

    /// `name.path:method(table)` or `name{...}`; returns the table.
    fn entry(&mut self) -> Result<Value, ParseError> {
        let start = self.peek().offset;
        self.bump();
        while (self.at(Punct::Dot) || self.at(Punct::Colon))
            && matches!(self.peek_nth(1).kind, TokenKind::Identifier(_))
        {
            self.pos += 2;
        }

        if self.at(Punct::LParen) {
            self.bump();
            let value = self.table()?;
            self.expect(Punct::RParen, "`)`")?;
            Ok(value)
        } else if self.at(Punct::LBrace) {
            self.table()
        } else {
            Err(ParseError::MissingEntryPoint { offset: start })
        }
    }

    fn table(&mut self) -> Result<Value, ParseError> {
        self.expect(Punct::LBrace, "`{`")?;
        let mut fields = Vec::new();

        loop {
            if self.at(Punct::RBrace) {
                self.bump();
                break;
            }
            fields.push(self.field()?);

            if self.at(Punct::Comma) || self.at(Punct::Semicolon) {
                self.bump();
            } else if self.at(Punct::RBrace) {
                self.bump();
                break;
            } else {
                return Err(self.unexpected("`,` or `}`"));
            }
        }

        self.classify(fields)
    }

    fn field(&mut self) -> Result<Field, ParseError> {
        let offset = self.peek().offset;

        if let TokenKind::Identifier(name) = &self.peek().kind {
            if self.peek_nth(1).is_punct(Punct::Equals) {
                let key = FieldKey::Name(name.clone());
                self.pos += 2;
                let value = self.value()?;
                return Ok(Field {
                    key: Some(key),
                    value,
                    offset,
                });
            }
        }

        if self.at(Punct::LBracket) {
            self.bump();
            let key = self.bracket_key()?;
            self.expect(Punct::RBracket, "`]`")?;
            self.expect(Punct::Equals, "`=`")?;
            let value = self.value()?;
            return Ok(Field {
                key: Some(key),
                value,
                offset,
            });
        }

        let value = self.value()?;
        Ok(Field {
            key: None,
            value,
            offset,
        })
    }

    /// The `key` inside `[key] = value`. Integral numbers become indices so
    /// `[1]`, `[2]`, ... can form a sequence, and `[1e16]` names the same key
    /// as `[10000000000000000]`. Other numbers use their JSON text.
    fn bracket_key(&mut self) -> Result<FieldKey, ParseError> {
        let key = match self.peek().kind.clone() {
            TokenKind::Str(s) => {
                self.bump();
                FieldKey::Name(s)
            }
            TokenKind::Number { .. } | TokenKind::Punct(Punct::Minus) => match self.number()? {
                Value::Integer(i) => FieldKey::Index(i),
                // `i64::MAX as f64` rounds up to 2^63, which is out of range.
                Value::Float(f)
                    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
                {
                    FieldKey::Index(f as i64)
                }
                Value::Float(f) => FieldKey::Name(format_float(f)),
                _ => unreachable!("number() only yields numeric values"),
            },
            _ => return Err(self.unexpected("string or number key")),
        };
        Ok(key)
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        let value = match self.peek().kind.clone() {
            TokenKind::Str(s) => {
                self.bump();
                Value::Text(s)
            }
            TokenKind::True => {
                self.bump();
                Value::Boolean(true)
            }
            TokenKind::False => {
                self.bump();
                Value::Boolean(false)
            }
            TokenKind::Nil => {
                self.bump();
                Value::Null
            }
            TokenKind::Number { .. } | TokenKind::Punct(Punct::Minus) => self.number()?,
            TokenKind::Punct(Punct::LBrace) => self.table()?,
            _ => return Err(self.unexpected("value")),
        };
        Ok(value)
    }

    /// A number token, optionally preceded by an adjacent `-`.
    fn number(&mut self) -> Result<Value, ParseError> {
        let mut negative = false;
        if self.at(Punct::Minus) {
            let minus = self.peek().offset;
            self.bump();
            let next = self.peek();
            match next.kind {
                TokenKind::Number { .. } if next.offset == minus + 1 => negative = true,
                TokenKind::Eof => return Err(self.unexpected("number after `-`")),
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: minus,
                        expected: "number immediately after `-`",
                        found: next.kind.describe(),
                    })
                }
            }
        }

        let token = self.peek();
        let TokenKind::Number { text, is_float } = &token.kind else {
            return Err(self.unexpected("number"));
        };
        let value = number_value(text, *is_float, negative).ok_or_else(|| {
            ParseError::UnexpectedToken {
                offset: token.offset,
                expected: "finite number",
                found: token.kind.describe(),
            }
        })?;
        self.bump();
        Ok(value)
    }

    fn classify(&self, fields: Vec<Field>) -> Result<Value, ParseError> {
        let Some(first) = fields.first() else {
            return Ok(match self.options.empty_table {
                EmptyTable::Object => Value::Mapping(Vec::new()),
                EmptyTable::Array => Value::Sequence(Vec::new()),
            });
        };

        let keyed = first.key.is_some();
        if let Some(odd) = fields.iter().find(|f| f.key.is_some() != keyed) {
            return Err(ParseError::MixedTableForm { offset: odd.offset });
        }
        if !keyed {
            return Ok(Value::Sequence(
                fields.into_iter().map(|f| f.value).collect(),
            ));
        }

        let mut entries: Vec<(String, Option<i64>, Value)> = Vec::with_capacity(fields.len());
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(fields.len());
        for Field { key, value, .. } in fields {
            let Some(key) = key else { continue };
            let (text, index) = key.into_parts();
            match slots.get(&text) {
                Some(&slot) => {
                    let entry = &mut entries[slot];
                    if entry.1 != index {
                        entry.1 = None;
                    }
                    entry.2 = value;
                }
                None => {
                    slots.insert(text.clone(), entries.len());
                    entries.push((text, index, value));
                }
            }
        }

        let len = entries.len() as i64;
        let contiguous = entries
            .iter()
            .all(|(_, index, _)| matches!(index, Some(i) if (1..=len).contains(i)));
        if contiguous {
            // Keys are unique, so N distinct keys within 1..=N are exactly 1..=N.
            entries.sort_by_key(|(_, index, _)| index.unwrap_or(i64::MAX));
            return Ok(Value::Sequence(
                entries.into_iter().map(|(_, _, value)| value).collect(),
            ));
        }

        Ok(Value::Mapping(
            entries
                .into_iter()
                .map(|(text, _, value)| (text, value))
                .collect(),
        ))
    }
}

/// Integer if the text is a plain integer that fits `i64`, otherwise a float.
/// `None` when the text is not a finite number.
fn number_value(text: &str, is_float: bool, negative: bool) -> Option<Value> {
    if !is_float {
        let parsed = if negative {
            format!("-{text}").parse::<i64>()
        } else {
            text.parse::<i64>()
        };
        if let Ok(n) = parsed {
            return Some(Value::Integer(n));
        }
    }
    let f: f64 = text.parse().ok().filter(|f: &f64| f.is_finite())?;
    Some(Value::Float(if negative { -f } else { f }))
}

fn merge_payloads(mut payloads: Vec<Value>) -> Value {
    if payloads.len() == 1 {
        if let Some(only) = payloads.pop() {
            return only;
        }
    }
    let mut merged = Vec::new();
    for payload in payloads {
        match payload {
            Value::Sequence(items) => merged.extend(items),
            other => merged.push(other),
        }
    }
    Value::Sequence(merged)
}
