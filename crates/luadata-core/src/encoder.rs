//! JSON encoder for [`Value`] trees.
//!
//! Output goes through `serde_json`'s serializer with a [`Formatter`] that
//! wraps its compact or pretty formatter and changes two things:
//!
//! - **Float fidelity**: a `Float` always carries a decimal point (`2.0`,
//!   `1.0e20`), so a value that was a float in the source never reads back as
//!   an integer.
//! - **ASCII-only output**: with [`EncodeOptions::ascii_only`] every non-ASCII
//!   character is written as `\uXXXX` (a surrogate pair above the BMP).
//!
//! Mappings keep the order their keys first appeared in the source, because
//! `Value`'s `Serialize` impl walks the stored entries in order.
//!
//! Encoding cannot fail: every `Value` the parser produces is representable.
//!
//! # Example
//! ```
//! use luadata_core::{encode, EncodeOptions, Value};
//!
//! let value = Value::Mapping(vec![
//!     ("name".to_string(), Value::Text("iron-plate".to_string())),
//!     ("weight".to_string(), Value::Float(2.0)),
//! ]);
//! let json = encode(&value, &EncodeOptions::compact());
//! assert_eq!(json, "{\"name\":\"iron-plate\",\"weight\":2.0}\n");
//! ```

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::Serializer;

use crate::options::EncodeOptions;
use crate::types::Value;

/// Encode a value tree as JSON text terminated by a newline.
pub fn encode(value: &Value, options: &EncodeOptions) -> String {
    let mut out = Vec::new();
    if options.indent == 0 {
        write_json(&mut out, value, CompactFormatter, options.ascii_only);
    } else {
        let indent = vec![b' '; options.indent];
        let pretty = PrettyFormatter::with_indent(&indent);
        write_json(&mut out, value, pretty, options.ascii_only);
    }
    out.push(b'\n');
    String::from_utf8(out)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn write_json<F: Formatter>(out: &mut Vec<u8>, value: &Value, layout: F, ascii_only: bool) {
    let formatter = LuaDataFormatter { layout, ascii_only };
    let mut serializer = Serializer::with_formatter(out, formatter);
    // Writes into a Vec never fail and `Value` has no unrepresentable case.
    let written = value.serialize(&mut serializer);
    debug_assert!(written.is_ok(), "serializing a Value failed: {written:?}");
}

/// Delegates layout (whitespace, separators) to `layout` and overrides how
/// floats and string contents are written.
struct LuaDataFormatter<F> {
    layout: F,
    ascii_only: bool,
}

impl<F: Formatter> Formatter for LuaDataFormatter<F> {
    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if !self.ascii_only || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.layout.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.layout.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.layout.end_object_value(writer)
    }
}

/// Render a finite float so it always reads back as a float: `2.0`, `0.1`,
/// `1.0e20`, `1.5e-7`.
pub(crate) fn format_float(f: f64) -> String {
    // `Debug` gives the shortest round-trip form and switches to exponent
    // notation for very large and very small magnitudes.
    let s = format!("{f:?}");
    if s.contains('.') {
        return s;
    }
    match s.find('e') {
        Some(e) => format!("{}.0{}", &s[..e], &s[e..]),
        None => format!("{s}.0"),
    }
}
