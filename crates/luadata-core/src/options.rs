//! Configuration for parsing and encoding.
//!
//! - [`ParseOptions`]: how ambiguous tables are classified
//! - [`EncodeOptions`]: JSON layout (indent width, ASCII-only escaping)
//! - [`ConvertOptions`]: both of the above, for [`convert`](crate::convert)
//!
//! ```rust
//! use luadata_core::{ConvertOptions, EmptyTable};
//!
//! let options = ConvertOptions::new()
//!     .with_indent(4)
//!     .with_empty_table(EmptyTable::Array);
//! assert_eq!(options.encode.indent, 4);
//! ```

/// What an empty table `{}` becomes. Nothing in `{}` says whether it is a
/// list or a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyTable {
    /// `{}` in the output.
    #[default]
    Object,
    /// `[]` in the output.
    Array,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub empty_table: EmptyTable,
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_empty_table(mut self, empty_table: EmptyTable) -> Self {
        self.empty_table = empty_table;
        self
    }
}

/// JSON output layout.
///
/// An `indent` of `0` produces compact single-line JSON. Output always ends
/// with a newline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub indent: usize,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ascii_only: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            ascii_only: false,
        }
    }
}

impl EncodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn compact() -> Self {
        Self {
            indent: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub encode: EncodeOptions,
}

impl ConvertOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.encode.indent = indent;
        self
    }

    #[must_use]
    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.encode.ascii_only = ascii_only;
        self
    }

    #[must_use]
    pub fn with_empty_table(mut self, empty_table: EmptyTable) -> Self {
        self.parse.empty_table = empty_table;
        self
    }
}
