//! ASTERIX data-item format decoders.
//!
//! This crate decodes the byte range of one ASTERIX data item into text
//! (plain, line-oriented, or JSON) or into an analyzer tree of located
//! fields. Locating the item inside a record and loading the category
//! schema belong to the caller; the crate supplies the format family those
//! layers assemble:
//! - [`FixedFormat`]: a fixed-length record of bit fields
//! - [`RepetitiveFormat`]: a count byte followed by that many fixed records
//!
//! Decoding is synchronous and side-effect free. Problems are reported into
//! a caller-supplied [`DiagnosticSink`] and the call returns a degraded but
//! well-defined result; no decode call panics or aborts the caller.
//!
//! Invariants:
//! - A repetitive item is decoded only when `declared_len == 1 + N * L`.
//! - Declared lengths are checked against the buffer before any slicing.
//! - JSON output never carries an empty `[]` for a repetitive item that
//!   produced nothing.
//!
//! # Examples
//! ```
//! use asterix_core::{
//!     BitsField, Diagnostics, Encoding, FixedFormat, FormatNode, OutputKind, RepetitiveFormat,
//! };
//!
//! // I048/250-style element: 56 bits of Mode S MB data, then BDS1/BDS2.
//! let element = FixedFormat::new(8)
//!     .with_field(BitsField::new("MBDATA", 9, 64, Encoding::Hex)?)?
//!     .with_field(BitsField::new("BDS1", 5, 8, Encoding::Unsigned)?)?
//!     .with_field(BitsField::new("BDS2", 1, 4, Encoding::Unsigned)?)?;
//! let format = RepetitiveFormat::with_element(element);
//!
//! let data = [0x01, 0xA0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x40];
//! let mut out = String::new();
//! let mut sink = Diagnostics::new();
//! let outcome = format.decode_text(&mut out, "I048/250", OutputKind::Json, &data, 9, &mut sink);
//! assert!(outcome.produced && sink.is_empty());
//! assert_eq!(out, r#"[{"MBDATA":"A0000000000001","BDS1":4,"BDS2":0}]"#);
//! # Ok::<(), asterix_core::FormatError>(())
//! ```

pub mod diagnostics;
pub mod format;
pub mod output;

#[cfg(feature = "analyzer")]
pub mod analyzer;

pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Discard, Severity};
pub use format::{
    BitsField, DataItemFormat, Encoding, FixedFormat, FixedShape, FormatError, FormatKind,
    FormatNode, RepetitiveFormat, TextOutcome,
};
pub use output::{OutputKind, UnknownOutputKind};

#[cfg(feature = "analyzer")]
pub use analyzer::{DecodedField, FieldChain, FieldDefinition, FieldValue};
