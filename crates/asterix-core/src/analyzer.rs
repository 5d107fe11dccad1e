//! Analyzer-tree export types.
//!
//! A packet-analyzer front end receives decoded fields as an ordered chain
//! of `(id, offset, length, value)` records, each offset pointing into the
//! original capture buffer. Producers build a [`FieldChain`] and hand it to
//! the caller by value; nothing retains a reference into it afterwards.

use serde::Serialize;

/// Typed value carried by a decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// One decoded field located in the original buffer.
///
/// # Examples
/// ```
/// use asterix_core::{DecodedField, FieldValue};
///
/// let field = DecodedField::new("REP", 10, 1, FieldValue::Unsigned(2));
/// assert_eq!(field.offset, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    /// Field identifier (short name, or `REP` for a repetition count).
    pub id: String,
    /// Byte offset into the original buffer.
    pub offset: usize,
    /// Number of bytes the field spans.
    pub length: usize,
    pub value: FieldValue,
}

impl DecodedField {
    pub fn new(id: impl Into<String>, offset: usize, length: usize, value: FieldValue) -> Self {
        Self {
            id: id.into(),
            offset,
            length,
            value,
        }
    }
}

/// Forward-only sequence of decoded fields, in buffer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldChain {
    fields: Vec<DecodedField>,
}

impl FieldChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: DecodedField) -> Self {
        Self {
            fields: vec![field],
        }
    }

    pub fn push(&mut self, field: DecodedField) {
        self.fields.push(field);
    }

    /// Splice `other` onto the tail of this chain.
    pub fn append(&mut self, other: FieldChain) {
        self.fields.extend(other.fields);
    }

    pub fn head(&self) -> Option<&DecodedField> {
        self.fields.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodedField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_vec(self) -> Vec<DecodedField> {
        self.fields
    }
}

impl IntoIterator for FieldChain {
    type Item = DecodedField;
    type IntoIter = std::vec::IntoIter<DecodedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldChain {
    type Item = &'a DecodedField;
    type IntoIter = std::slice::Iter<'a, DecodedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Static description of a field an analyzer can register up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Encoding label (e.g., `unsigned`, `ascii`).
    pub encoding: &'static str,
}
