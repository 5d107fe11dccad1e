//! Repetitive data items.
//!
//! Wire layout: one unsigned repetition-count byte `N`, then `N` copies of a
//! fixed-length element record. A well-formed instance always satisfies
//! `declared_len == 1 + N * element_len`; every entry point checks this
//! before letting `N` drive iteration, and checks the declared length
//! against the buffer before slicing elements.
//!
//! The element is the first entry of the sub-item list. Later entries are
//! kept but never consulted.

use crate::diagnostics::DiagnosticSink;
use crate::output::{JsonArray, OutputKind};

#[cfg(feature = "analyzer")]
use crate::analyzer::{DecodedField, FieldChain, FieldDefinition, FieldValue};

use super::bits::BitsField;
use super::error::FormatError;
use super::fixed::FixedFormat;
use super::layout;
use super::reader::ItemReader;
use super::{FixedShape, FormatKind, FormatNode, TextOutcome};

/// Count byte followed by `count` fixed records of element shape `F`.
///
/// # Examples
/// ```
/// use asterix_core::{
///     BitsField, Diagnostics, Encoding, FixedFormat, FormatNode, OutputKind, RepetitiveFormat,
/// };
///
/// let element = FixedFormat::new(1).with_field(BitsField::new("V", 1, 8, Encoding::Unsigned)?)?;
/// let format = RepetitiveFormat::with_element(element);
///
/// let mut out = String::new();
/// let mut sink = Diagnostics::new();
/// let data = [0x02, 0x07, 0x09];
/// format.decode_text(&mut out, "", OutputKind::Json, &data, data.len(), &mut sink);
/// assert_eq!(out, r#"[{"V":7},{"V":9}]"#);
/// # Ok::<(), asterix_core::FormatError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RepetitiveFormat<F: FixedShape = FixedFormat> {
    sub_items: Vec<F>,
}

impl RepetitiveFormat {
    /// Empty format; the loader attaches the element afterwards.
    pub fn new() -> Self {
        Self {
            sub_items: Vec::new(),
        }
    }
}

impl<F: FixedShape> Default for RepetitiveFormat<F> {
    fn default() -> Self {
        Self {
            sub_items: Vec::new(),
        }
    }
}

impl<F: FixedShape> RepetitiveFormat<F> {
    pub fn with_element(element: F) -> Self {
        Self {
            sub_items: vec![element],
        }
    }

    pub fn push_sub_item(&mut self, element: F) {
        self.sub_items.push(element);
    }

    pub fn element(&self) -> Option<&F> {
        self.sub_items.first()
    }

    pub fn element_mut(&mut self) -> Option<&mut F> {
        self.sub_items.first_mut()
    }

    fn require_element(&self, sink: &mut dyn DiagnosticSink) -> Option<&F> {
        let element = self.element();
        if element.is_none() {
            sink.error(&FormatError::MissingElement);
        }
        element
    }

    fn require_element_mut(&mut self, sink: &mut dyn DiagnosticSink) -> Option<&mut F> {
        if self.sub_items.is_empty() {
            sink.error(&FormatError::MissingElement);
        }
        self.sub_items.first_mut()
    }

    /// Element records of one well-formed instance, in wire order.
    fn records<'a>(
        reader: &ItemReader<'a>,
        count: u8,
        element_len: usize,
        declared_len: usize,
    ) -> Result<Vec<&'a [u8]>, FormatError> {
        let expected = layout::REPETITION_COUNT_LEN + count as usize * element_len;
        if expected != declared_len {
            return Err(FormatError::LengthMismatch {
                declared: declared_len,
                expected,
                count,
                element_len,
            });
        }
        reader.require_len(declared_len)?;
        (0..count as usize)
            .map(|index| reader.element(index, element_len))
            .collect()
    }
}

impl<F: FixedShape> FormatNode for RepetitiveFormat<F> {
    fn kind(&self) -> FormatKind {
        FormatKind::Repetitive
    }

    fn length(&self, data: &[u8], sink: &mut dyn DiagnosticSink) -> usize {
        let Some(element) = self.require_element(sink) else {
            return 0;
        };
        match ItemReader::new(data).read_repetition_count() {
            Ok(count) => layout::REPETITION_COUNT_LEN + count as usize * element.length(),
            Err(err) => {
                sink.error(&err);
                0
            }
        }
    }

    fn add_field(&mut self, field: BitsField, sink: &mut dyn DiagnosticSink) -> bool {
        let Some(element) = self.require_element_mut(sink) else {
            return false;
        };
        match element.add_field(field) {
            Ok(()) => true,
            Err(err) => {
                sink.error(&err);
                false
            }
        }
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
        let Some(element) = self.require_element(sink) else {
            return TextOutcome::ABORTED;
        };
        let reader = ItemReader::new(data);
        let records = reader
            .read_repetition_count()
            .and_then(|count| Self::records(&reader, count, element.length(), declared_len));
        let records = match records {
            Ok(records) => records,
            Err(err) => {
                sink.error(&err);
                return TextOutcome::ABORTED;
            }
        };

        if kind.is_json() {
            let mut array = JsonArray::new();
            for record in records {
                array.push_with(|buf| element.decode_record(buf, header, kind, record, sink));
            }
            TextOutcome::produced(array.finish_into(out))
        } else {
            let mut produced = false;
            for record in records {
                produced |= element.decode_record(out, header, kind, record, sink);
            }
            TextOutcome::produced(produced)
        }
    }

    fn describe(&self, header: &str, sink: &mut dyn DiagnosticSink) -> String {
        match self.require_element(sink) {
            Some(element) => element.describe(header),
            None => FormatError::MissingElement.to_string(),
        }
    }

    fn exclude_field(&mut self, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
        let Some(element) = self.require_element_mut(sink) else {
            return false;
        };
        let found = element.exclude_field(name);
        if !found {
            sink.warn(&FormatError::UnknownField {
                name: name.to_string(),
            });
        }
        found
    }

    fn is_field_excluded(&self, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
        self.require_element(sink)
            .is_some_and(|element| element.is_field_excluded(name))
    }

    #[cfg(feature = "analyzer")]
    fn export_tree(
        &self,
        data: &[u8],
        declared_len: usize,
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<FieldChain> {
        let element = self.require_element(sink)?;
        let reader = ItemReader::new(data);
        let count = match reader.read_repetition_count() {
            Ok(count) => count,
            Err(err) => {
                sink.error(&err);
                return None;
            }
        };

        // The count node is returned even when the instance is malformed.
        let mut chain = FieldChain::single(DecodedField::new(
            layout::REPETITION_COUNT_ID,
            offset,
            layout::REPETITION_COUNT_LEN,
            FieldValue::Unsigned(u64::from(count)),
        ));

        let element_len = element.length();
        let records = match Self::records(&reader, count, element_len, declared_len) {
            Ok(records) => records,
            Err(err) => {
                sink.error(&err);
                return Some(chain);
            }
        };

        let mut record_offset = offset + layout::ELEMENTS_OFFSET;
        for record in records {
            chain.append(element.export_record(record, record_offset, sink));
            record_offset += element_len;
        }
        Some(chain)
    }

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self, sink: &mut dyn DiagnosticSink) -> Option<Vec<FieldDefinition>> {
        let element = self.require_element(sink)?;
        let mut definitions = vec![FieldDefinition {
            id: layout::REPETITION_COUNT_ID.to_string(),
            name: layout::REPETITION_COUNT_NAME.to_string(),
            unit: None,
            encoding: super::Encoding::Unsigned.label(),
        }];
        definitions.extend(element.export_definitions());
        Some(definitions)
    }
}
