//! Configuration options for transcoding.
//!
//! - [`TranscodeOptions`]: main configuration struct, built with `with_*` methods
//! - [`Delimiter`]: field separator for delimited text (comma or tab)
//! - [`AttributeMode`]: what the XML serializer does with captured `@attributes`
//!
//! ## Examples
//!
//! ```rust
//! use datacast::{AttributeMode, TranscodeOptions};
//!
//! let options = TranscodeOptions::new()
//!     .with_table_name("users")
//!     .with_xml_attributes(AttributeMode::Emit)
//!     .with_max_xml_depth(64);
//! assert_eq!(options.table_name.as_deref(), Some("users"));
//! ```

/// Default nesting limit for XML element conversion.
pub const DEFAULT_MAX_XML_DEPTH: usize = 256;

/// Field separator for delimited text.
///
/// # Examples
///
/// ```rust
/// use datacast::Delimiter;
///
/// assert_eq!(Delimiter::Comma.as_char(), ',');
/// assert_eq!(Delimiter::Tab.as_char(), '\t');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }

    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Treatment of the reserved `@attributes` key when writing XML.
///
/// The XML parser stores element attributes under `@attributes`. By default the serializer
/// drops them again, so XML → XML is lossy for attributes. `Emit` writes them back onto the
/// element that holds the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AttributeMode {
    #[default]
    Drop,
    Emit,
}

/// Configuration for a [`Transcoder`](crate::Transcoder).
#[derive(Clone, Debug)]
pub struct TranscodeOptions {
    /// Table name for SQL output; the source file stem is used when unset.
    pub table_name: Option<String>,
    pub xml_attributes: AttributeMode,
    /// Elements nested deeper than this fail XML parsing instead of recursing further.
    pub max_xml_depth: usize,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        TranscodeOptions {
            table_name: None,
            xml_attributes: AttributeMode::default(),
            max_xml_depth: DEFAULT_MAX_XML_DEPTH,
        }
    }
}

impl TranscodeOptions {
    /// Creates default options (table name from the file stem, attributes dropped,
    /// XML depth limit of 256).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::{AttributeMode, TranscodeOptions};
    ///
    /// let options = TranscodeOptions::new();
    /// assert!(options.table_name.is_none());
    /// assert_eq!(options.xml_attributes, AttributeMode::Drop);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table name used for SQL output.
    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Sets how `@attributes` are written back when serializing XML.
    #[must_use]
    pub fn with_xml_attributes(mut self, mode: AttributeMode) -> Self {
        self.xml_attributes = mode;
        self
    }

    /// Sets the maximum element nesting accepted by the XML parser.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datacast::TranscodeOptions;
    ///
    /// let options = TranscodeOptions::new().with_max_xml_depth(16);
    /// assert_eq!(options.max_xml_depth, 16);
    /// ```
    #[must_use]
    pub fn with_max_xml_depth(mut self, depth: usize) -> Self {
        self.max_xml_depth = depth;
        self
    }
}
