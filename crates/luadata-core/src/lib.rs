//! # luadata-core
//!
//! Pure-Rust converter from **Lua data-table literals** to JSON.
//!
//! Data-definition files such as Factorio prototypes are Lua scripts that do
//! nothing but pass one big table literal to a call like `data:extend(...)`.
//! This crate reads that restricted grammar (tables, strings, numbers,
//! booleans, `nil`, comments), builds a [`Value`] tree and writes it back out
//! as JSON. It never executes Lua.
//!
//! ## Quick start
//!
//! ```rust
//! use luadata_core::{convert, ConvertOptions};
//!
//! let lua = r#"
//! data:extend({
//!   { type = "item", name = "kr-biomass", stack_size = 200, }
//! })
//! "#;
//! let json = convert(lua, &ConvertOptions::new().with_indent(0)).unwrap();
//! assert_eq!(json, "[{\"type\":\"item\",\"name\":\"kr-biomass\",\"stack_size\":200}]\n");
//! ```
//!
//! ## Modules
//!
//! - [`lexer`] — source text → tokens (comments stripped, offsets kept)
//! - [`parser`] — tokens → [`Value`] (entry call, table classification)
//! - [`encoder`] — [`Value`] → JSON text
//! - [`types`] — the [`Value`] tree
//! - [`options`] — parse and encode configuration
//! - [`error`] — lexing and parsing errors with source offsets

pub mod encoder;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod types;

pub use encoder::encode;
pub use error::{line_col, LexError, LuaDataError, ParseError, Result};
pub use lexer::{tokenize, Lexer, Punct, Token, TokenKind};
pub use options::{ConvertOptions, EmptyTable, EncodeOptions, ParseOptions};
pub use parser::parse;
pub use types::Value;

/// Tokenize and parse a whole source file into its payload value.
///
/// Lexing finishes before parsing starts, so a file with a lexical error never
/// reaches the parser.
pub fn parse_str(source: &str, options: &ParseOptions) -> Result<Value> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens, options)?)
}

/// Convert one source file to JSON text.
///
/// Either the complete JSON document is returned or an error; there is no
/// partial output.
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String> {
    let value = parse_str(source, &options.parse)?;
    Ok(encode(&value, &options.encode))
}
