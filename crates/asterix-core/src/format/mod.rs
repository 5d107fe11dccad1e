//! Data-item format decoders.
//!
//! Each ASTERIX data item has a format describing its wire layout. The
//! format family is a closed set behind one capability, [`FormatNode`]:
//! - `fixed`: a content-independent, fixed-length record of bit fields
//! - `repetitive`: one count byte followed by that many fixed records
//!
//! Layering follows the protocol decoders: `layout` holds byte/bit
//! constants, `reader` does bounds-checked access, the format modules
//! decode without direct indexing, and `error` lists what can go wrong.
//!
//! Decoding never aborts the caller. Failures are reported into the
//! injected [`DiagnosticSink`] and the operation returns a degraded value
//! (zero length, aborted outcome, partial tree), so one corrupt item does
//! not stop its siblings from decoding. The format tree is built once and
//! is read-only while decoding; it can be shared across threads as long as
//! nobody mutates it concurrently.

use std::fmt;

use crate::diagnostics::DiagnosticSink;
use crate::output::OutputKind;

#[cfg(feature = "analyzer")]
use crate::analyzer::{FieldChain, FieldDefinition};

pub mod bits;
pub mod error;
pub mod fixed;
pub mod layout;
pub mod reader;
pub mod repetitive;

pub use bits::{BitsField, Encoding};
pub use error::FormatError;
pub use fixed::FixedFormat;
pub use repetitive::RepetitiveFormat;

/// Kind label of a format node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatKind {
    Fixed,
    Repetitive,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Fixed => f.write_str("fixed"),
            FormatKind::Repetitive => f.write_str("repetitive"),
        }
    }
}

/// Result of a textual decode.
///
/// `produced` tells an enclosing format whether this item contributed
/// visible output; `aborted` tells it the item was malformed and nothing
/// was appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOutcome {
    pub produced: bool,
    pub aborted: bool,
}

impl TextOutcome {
    pub const ABORTED: TextOutcome = TextOutcome {
        produced: false,
        aborted: true,
    };

    pub const fn produced(produced: bool) -> Self {
        Self {
            produced,
            aborted: false,
        }
    }

    /// Legacy single-flag view: content was produced or the item was
    /// handled by aborting.
    pub fn handled(self) -> bool {
        self.produced || self.aborted
    }
}

/// Element shape of a repetitive item: a record whose length depends on
/// the schema only.
///
/// `length` takes no buffer, so callers never have to pick a position to
/// ask it at. `record` arguments are always exactly `length()` bytes.
pub trait FixedShape {
    fn length(&self) -> usize;

    /// Append a bit field to the record template.
    fn add_field(&mut self, field: BitsField) -> Result<(), FormatError>;

    /// Render one record; returns whether anything visible was produced.
    fn decode_record(
        &self,
        out: &mut String,
        header: &str,
        kind: OutputKind,
        record: &[u8],
        sink: &mut dyn DiagnosticSink,
    ) -> bool;

    fn describe(&self, header: &str) -> String;

    /// Exclude the named field from output; returns whether it exists.
    fn exclude_field(&mut self, name: &str) -> bool;

    fn is_field_excluded(&self, name: &str) -> bool;

    /// Decoded fields of one record located at `offset` in the capture.
    #[cfg(feature = "analyzer")]
    fn export_record(
        &self,
        record: &[u8],
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> FieldChain;

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self) -> Vec<FieldDefinition>;
}

/// Capability shared by every data-item format.
///
/// `data` starts at the first byte of the item instance; `declared_len` is
/// the item length located by the enclosing record decoder. `data` may be
/// longer than the item but never shorter: a declared length running past
/// the buffer end is reported, not read.
pub trait FormatNode {
    fn kind(&self) -> FormatKind;

    /// Total item length derived from `data`, or 0 when it cannot be
    /// determined. Callers must treat 0 as a failure.
    fn length(&self, data: &[u8], sink: &mut dyn DiagnosticSink) -> usize;

    /// Add a bit field to the record template. Returns whether it was added.
    fn add_field(&mut self, field: BitsField, sink: &mut dyn DiagnosticSink) -> bool;

    fn decode_text(
        &self,
        out: &mut String,
        header: &str,
        kind: OutputKind,
        data: &[u8],
        declared_len: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> TextOutcome;

    fn describe(&self, header: &str, sink: &mut dyn DiagnosticSink) -> String;

    fn exclude_field(&mut self, name: &str, sink: &mut dyn DiagnosticSink) -> bool;

    fn is_field_excluded(&self, name: &str, sink: &mut dyn DiagnosticSink) -> bool;

    #[cfg(feature = "analyzer")]
    fn export_tree(
        &self,
        data: &[u8],
        declared_len: usize,
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<FieldChain>;

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self, sink: &mut dyn DiagnosticSink) -> Option<Vec<FieldDefinition>>;
}

/// Closed set of data-item formats.
///
/// # Examples
/// ```
/// use asterix_core::{DataItemFormat, Diagnostics, FixedFormat, FormatNode, RepetitiveFormat};
///
/// let mut format = DataItemFormat::Repetitive(RepetitiveFormat::new());
/// format.add_sub_item(DataItemFormat::Fixed(FixedFormat::new(2)))?;
///
/// let mut sink = Diagnostics::new();
/// assert_eq!(format.length(&[3], &mut sink), 7);
/// # Ok::<(), asterix_core::FormatError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DataItemFormat {
    Fixed(FixedFormat),
    Repetitive(RepetitiveFormat),
}

impl DataItemFormat {
    /// Attach a sub-item while the schema is being loaded. A repetitive
    /// format only accepts a fixed element; a fixed format takes none.
    pub fn add_sub_item(&mut self, item: DataItemFormat) -> Result<(), FormatError> {
        match self {
            DataItemFormat::Repetitive(repetitive) => match item {
                DataItemFormat::Fixed(fixed) => {
                    repetitive.push_sub_item(fixed);
                    Ok(())
                }
                other => Err(FormatError::WrongElementKind { kind: other.kind() }),
            },
            DataItemFormat::Fixed(_) => Err(FormatError::NoSubItems {
                kind: FormatKind::Fixed,
            }),
        }
    }

    fn node(&self) -> &dyn FormatNode {
        match self {
            DataItemFormat::Fixed(fixed) => fixed,
            DataItemFormat::Repetitive(repetitive) => repetitive,
        }
    }

    fn node_mut(&mut self) -> &mut dyn FormatNode {
        match self {
            DataItemFormat::Fixed(fixed) => fixed,
            DataItemFormat::Repetitive(repetitive) => repetitive,
        }
    }
}

impl FormatNode for DataItemFormat {
    fn kind(&self) -> FormatKind {
        self.node().kind()
    }

    fn length(&self, data: &[u8], sink: &mut dyn DiagnosticSink) -> usize {
        self.node().length(data, sink)
    }

    fn add_field(&mut self, field: BitsField, sink: &mut dyn DiagnosticSink) -> bool {
        self.node_mut().add_field(field, sink)
    }

    fn decode_text(
        &self,
        out: &mut String,
        header: &str,
        kind: OutputKind,
        data: &[u8],
        declared_len: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> TextOutcome {
        self.node()
            .decode_text(out, header, kind, data, declared_len, sink)
    }

    fn describe(&self, header: &str, sink: &mut dyn DiagnosticSink) -> String {
        self.node().describe(header, sink)
    }

    fn exclude_field(&mut self, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
        self.node_mut().exclude_field(name, sink)
    }

    fn is_field_excluded(&self, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
        self.node().is_field_excluded(name, sink)
    }

    #[cfg(feature = "analyzer")]
    fn export_tree(
        &self,
        data: &[u8],
        declared_len: usize,
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<FieldChain> {
        self.node().export_tree(data, declared_len, offset, sink)
    }

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self, sink: &mut dyn DiagnosticSink) -> Option<Vec<FieldDefinition>> {
        self.node().export_definitions(sink)
    }
}
