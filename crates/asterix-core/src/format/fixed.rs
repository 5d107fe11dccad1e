use crate::diagnostics::DiagnosticSink;
use crate::output::OutputKind;

#[cfg(feature = "analyzer")]
use crate::analyzer::{DecodedField, FieldChain, FieldDefinition};

use super::bits::BitsField;
use super::error::FormatError;
use super::reader::ItemReader;
use super::{FixedShape, FormatKind, FormatNode, TextOutcome};

/// Fixed-length record made of bit fields.
///
/// # Examples
/// ```
/// use asterix_core::{BitsField, Diagnostics, Encoding, FixedFormat, FormatNode, OutputKind};
///
/// let format = FixedFormat::new(2)
///     .with_field(BitsField::new("SAC", 9, 16, Encoding::Unsigned)?)?
///     .with_field(BitsField::new("SIC", 1, 8, Encoding::Unsigned)?)?;
///
/// let mut out = String::new();
/// let mut sink = Diagnostics::new();
/// let outcome = format.decode_text(&mut out, "", OutputKind::Json, &[0x19, 0xC9], 2, &mut sink);
/// assert!(outcome.produced);
/// assert_eq!(out, r#"{"SAC":25,"SIC":201}"#);
/// # Ok::<(), asterix_core::FormatError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FixedFormat {
    length: usize,
    fields: Vec<BitsField>,
}

impl FixedFormat {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: BitsField) -> Result<Self, FormatError> {
        FixedShape::add_field(&mut self, field)?;
        Ok(self)
    }

    pub fn fields(&self) -> &[BitsField] {
        &self.fields
    }

    fn field(&self, name: &str) -> Option<&BitsField> {
        self.fields.iter().find(|field| field.short_name() == name)
    }

    /// `data` holds at least `declared_len` bytes and the declared length
    /// matches the record length.
    fn checked_record<'a>(&self, data: &'a [u8], declared_len: usize) -> Result<&'a [u8], FormatError> {
        if declared_len != self.length {
            return Err(FormatError::FixedLengthMismatch {
                declared: declared_len,
                expected: self.length,
            });
        }
        ItemReader::new(data).read_slice(0..self.length)
    }
}

impl FixedShape for FixedFormat {
    fn length(&self) -> usize {
        self.length
    }

    fn add_field(&mut self, field: BitsField) -> Result<(), FormatError> {
        field.byte_range(self.length)?;
        self.fields.push(field);
        Ok(())
    }

    fn decode_record(
        &self,
        out: &mut String,
        header: &str,
        kind: OutputKind,
        record: &[u8],
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        let mut produced = false;
        if kind.is_json() {
            out.push('{');
            for field in &self.fields {
                let mut rendered = String::new();
                match field.render(&mut rendered, header, kind, record) {
                    Ok(true) => {
                        if produced {
                            out.push(',');
                        }
                        out.push_str(&rendered);
                        produced = true;
                    }
                    Ok(false) => {}
                    Err(err) => sink.error(&err),
                }
            }
            out.push('}');
        } else {
            for field in &self.fields {
                match field.render(out, header, kind, record) {
                    Ok(rendered) => produced |= rendered,
                    Err(err) => sink.error(&err),
                }
            }
        }
        produced
    }

    fn describe(&self, header: &str) -> String {
        self.fields.iter().map(|field| field.describe(header)).collect()
    }

    fn exclude_field(&mut self, name: &str) -> bool {
        let mut found = false;
        for field in self.fields.iter_mut().filter(|f| f.short_name() == name) {
            field.set_excluded();
            found = true;
        }
        found
    }

    fn is_field_excluded(&self, name: &str) -> bool {
        self.field(name).is_some_and(BitsField::is_excluded)
    }

    #[cfg(feature = "analyzer")]
    fn export_record(
        &self,
        record: &[u8],
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> FieldChain {
        let mut chain = FieldChain::new();
        for field in self.fields.iter().filter(|f| !f.is_excluded()) {
            let located = field
                .byte_range(record.len())
                .and_then(|range| field.extract(record).map(|value| (range, value)));
            match located {
                Ok((range, value)) => chain.push(DecodedField::new(
                    field.short_name(),
                    offset + range.start,
                    range.len(),
                    field.to_field_value(value),
                )),
                Err(err) => sink.error(&err),
            }
        }
        chain
    }

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self) -> Vec<FieldDefinition> {
        self.fields.iter().map(BitsField::definition).collect()
    }
}

impl FormatNode for FixedFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Fixed
    }

    fn length(&self, _data: &[u8], _sink: &mut dyn DiagnosticSink) -> usize {
        self.length
    }

    fn add_field(&mut self, field: BitsField, sink: &mut dyn DiagnosticSink) -> bool {
        match FixedShape::add_field(self, field) {
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
        match self.checked_record(data, declared_len) {
            Ok(record) => TextOutcome::produced(self.decode_record(out, header, kind, record, sink)),
            Err(err) => {
                sink.error(&err);
                TextOutcome::ABORTED
            }
        }
    }

    fn describe(&self, header: &str, _sink: &mut dyn DiagnosticSink) -> String {
        FixedShape::describe(self, header)
    }

    fn exclude_field(&mut self, name: &str, sink: &mut dyn DiagnosticSink) -> bool {
        let found = FixedShape::exclude_field(self, name);
        if !found {
            sink.warn(&FormatError::UnknownField {
                name: name.to_string(),
            });
        }
        found
    }

    fn is_field_excluded(&self, name: &str, _sink: &mut dyn DiagnosticSink) -> bool {
        FixedShape::is_field_excluded(self, name)
    }

    #[cfg(feature = "analyzer")]
    fn export_tree(
        &self,
        data: &[u8],
        declared_len: usize,
        offset: usize,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<FieldChain> {
        match self.checked_record(data, declared_len) {
            Ok(record) => Some(self.export_record(record, offset, sink)),
            Err(err) => {
                sink.error(&err);
                None
            }
        }
    }

    #[cfg(feature = "analyzer")]
    fn export_definitions(&self, _sink: &mut dyn DiagnosticSink) -> Option<Vec<FieldDefinition>> {
        Some(FixedShape::export_definitions(self))
    }
}
