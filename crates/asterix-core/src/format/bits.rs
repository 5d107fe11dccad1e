use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::error::FormatError;
use super::layout;
use crate::output::{OutputKind, json_number, json_string};

/// How the bits of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Unsigned,
    /// Two's complement over the field width.
    Signed,
    /// ICAO 6-bit characters (callsigns).
    #[serde(rename = "6bitschar")]
    SixBitChar,
    Octal,
    Hex,
    Ascii,
}

impl Encoding {
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Unsigned => "unsigned",
            Encoding::Signed => "signed",
            Encoding::SixBitChar => "6bitschar",
            Encoding::Octal => "octal",
            Encoding::Hex => "hex",
            Encoding::Ascii => "ascii",
        }
    }
}

/// Value extracted from a field before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum BitsValue {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

/// One bit-level field of a fixed-length record.
///
/// Bits are numbered from 1 at the least significant bit of the record's
/// last byte up to `8 * length` at the most significant bit of its first
/// byte; a field spans `from..=to`.
///
/// # Examples
/// ```
/// use asterix_core::{BitsField, Encoding};
///
/// let sac = BitsField::new("SAC", 9, 16, Encoding::Unsigned)?.with_name("System Area Code");
/// assert_eq!(sac.width(), 8);
/// # Ok::<(), asterix_core::FormatError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BitsField {
    short_name: String,
    name: String,
    from: usize,
    to: usize,
    encoding: Encoding,
    scale: Option<f64>,
    unit: Option<String>,
    meanings: BTreeMap<u64, String>,
    excluded: bool,
}

impl BitsField {
    pub fn new(
        short_name: impl Into<String>,
        from: usize,
        to: usize,
        encoding: Encoding,
    ) -> Result<Self, FormatError> {
        let short_name = short_name.into();
        if from == 0 || to < from {
            return Err(FormatError::InvalidBitRange {
                name: short_name,
                from,
                to,
            });
        }
        let width = to - from + 1;
        let byte_aligned = (from - 1) % 8 == 0 && width % 8 == 0;
        let supported = match encoding {
            Encoding::Unsigned | Encoding::Signed => width <= layout::MAX_NUMERIC_WIDTH,
            Encoding::SixBitChar => {
                width <= layout::MAX_NUMERIC_WIDTH && width % layout::SIX_BIT_CHAR_WIDTH == 0
            }
            Encoding::Octal => {
                width <= layout::MAX_NUMERIC_WIDTH && width % layout::OCTAL_DIGIT_WIDTH == 0
            }
            Encoding::Hex => width <= layout::MAX_NUMERIC_WIDTH || byte_aligned,
            Encoding::Ascii => byte_aligned,
        };
        if !supported {
            return Err(FormatError::UnsupportedWidth {
                name: short_name,
                width,
            });
        }
        Ok(Self {
            name: short_name.clone(),
            short_name,
            from,
            to,
            encoding,
            scale: None,
            unit: None,
            meanings: BTreeMap::new(),
            excluded: false,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_meaning(mut self, value: u64, meaning: impl Into<String>) -> Self {
        self.meanings.insert(value, meaning.into());
        self
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_bit(&self) -> usize {
        self.from
    }

    pub fn to_bit(&self) -> usize {
        self.to
    }

    pub fn width(&self) -> usize {
        self.to - self.from + 1
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub(crate) fn set_excluded(&mut self) {
        self.excluded = true;
    }

    /// Byte range within a `record_len`-byte record touched by this field.
    pub fn byte_range(&self, record_len: usize) -> Result<std::ops::Range<usize>, FormatError> {
        let total_bits = record_len * 8;
        if self.to > total_bits {
            return Err(FormatError::InvalidBitRange {
                name: self.short_name.clone(),
                from: self.from,
                to: self.to,
            });
        }
        let first = (total_bits - self.to) / 8;
        let last = (total_bits - self.from) / 8;
        Ok(first..last + 1)
    }

    /// Extract the field from one record. `record` must be exactly the
    /// fixed record the field belongs to.
    pub fn extract(&self, record: &[u8]) -> Result<BitsValue, FormatError> {
        let range = self.byte_range(record.len())?;
        let bytes = &record[range];
        let width = self.width();

        if width > layout::MAX_NUMERIC_WIDTH {
            // Only byte-aligned Ascii/Hex fields get here.
            return Ok(match self.encoding {
                Encoding::Ascii => BitsValue::Text(ascii_text(bytes)),
                _ => BitsValue::Text(bytes.iter().fold(String::new(), |mut acc, b| {
                    let _ = write!(acc, "{b:02X}");
                    acc
                })),
            });
        }

        let raw = extract_unsigned(bytes, (self.from - 1) % 8, width);
        Ok(match self.encoding {
            Encoding::Unsigned => BitsValue::Unsigned(raw),
            Encoding::Signed => BitsValue::Signed(sign_extend(raw, width)),
            Encoding::SixBitChar => BitsValue::Text(six_bit_text(raw, width)),
            Encoding::Octal => {
                let digits = width / layout::OCTAL_DIGIT_WIDTH;
                BitsValue::Text(format!("{raw:0digits$o}"))
            }
            Encoding::Hex => {
                let digits = width.div_ceil(4);
                BitsValue::Text(format!("{raw:0digits$X}"))
            }
            Encoding::Ascii => BitsValue::Text(ascii_text(bytes)),
        })
    }

    fn meaning(&self, value: &BitsValue) -> Option<&str> {
        match value {
            BitsValue::Unsigned(raw) => self.meanings.get(raw).map(String::as_str),
            _ => None,
        }
    }

    fn scaled(&self, value: &BitsValue) -> Option<f64> {
        let scale = self.scale?;
        match value {
            BitsValue::Unsigned(raw) => Some(*raw as f64 * scale),
            BitsValue::Signed(raw) => Some(*raw as f64 * scale),
            BitsValue::Text(_) => None,
        }
    }

    fn raw_json(value: &BitsValue) -> String {
        match value {
            BitsValue::Unsigned(raw) => raw.to_string(),
            BitsValue::Signed(raw) => raw.to_string(),
            BitsValue::Text(text) => json_string(text),
        }
    }

    fn display(&self, value: &BitsValue) -> String {
        let mut shown = match (self.scaled(value), value) {
            (Some(scaled), _) => scaled.to_string(),
            (None, BitsValue::Unsigned(raw)) => raw.to_string(),
            (None, BitsValue::Signed(raw)) => raw.to_string(),
            (None, BitsValue::Text(text)) => text.clone(),
        };
        if let Some(unit) = &self.unit {
            shown.push(' ');
            shown.push_str(unit);
        }
        if let Some(meaning) = self.meaning(value) {
            let _ = write!(shown, " ({meaning})");
        }
        shown
    }

    /// Append this field's rendering of `record` to `out`. Excluded fields
    /// render nothing and return `Ok(false)`.
    pub fn render(
        &self,
        out: &mut String,
        header: &str,
        kind: OutputKind,
        record: &[u8],
    ) -> Result<bool, FormatError> {
        if self.excluded {
            return Ok(false);
        }
        let value = self.extract(record)?;
        match kind {
            OutputKind::Text => {
                let _ = write!(out, "\n\t{}: {}", self.short_name, self.display(&value));
            }
            OutputKind::Out => {
                let _ = write!(
                    out,
                    "\n{} {}",
                    qualified(header, &self.short_name),
                    self.display(&value)
                );
            }
            OutputKind::Json => {
                let _ = write!(
                    out,
                    "{}:{}",
                    json_string(&self.short_name),
                    Self::raw_json(&value)
                );
            }
            OutputKind::JsonHuman => {
                let shown = match (self.scaled(&value), self.meaning(&value)) {
                    (Some(scaled), _) => json_number(scaled),
                    (None, Some(meaning)) => json_string(meaning),
                    (None, None) => Self::raw_json(&value),
                };
                let _ = write!(out, "{}:{}", json_string(&self.short_name), shown);
            }
            OutputKind::JsonExtensive => {
                let _ = write!(
                    out,
                    "{}:{{\"val\":{},\"desc\":{}",
                    json_string(&self.short_name),
                    Self::raw_json(&value),
                    json_string(&self.name)
                );
                if let Some(scaled) = self.scaled(&value) {
                    let _ = write!(out, ",\"scaled\":{}", json_number(scaled));
                }
                if let Some(unit) = &self.unit {
                    let _ = write!(out, ",\"unit\":{}", json_string(unit));
                }
                if let Some(meaning) = self.meaning(&value) {
                    let _ = write!(out, ",\"meaning\":{}", json_string(meaning));
                }
                out.push('}');
            }
        }
        Ok(true)
    }

    /// One descriptor line: `header.SHORT<TAB>name [unit]`.
    pub fn describe(&self, header: &str) -> String {
        let mut line = format!("{}\t{}", qualified(header, &self.short_name), self.name);
        if let Some(unit) = &self.unit {
            let _ = write!(line, " [{unit}]");
        }
        line.push('\n');
        line
    }
}

#[cfg(feature = "analyzer")]
impl BitsField {
    pub(crate) fn to_field_value(&self, value: BitsValue) -> crate::analyzer::FieldValue {
        use crate::analyzer::FieldValue;

        if let Some(scaled) = self.scaled(&value) {
            return FieldValue::Float(scaled);
        }
        match value {
            BitsValue::Unsigned(raw) => FieldValue::Unsigned(raw),
            BitsValue::Signed(raw) => FieldValue::Signed(raw),
            BitsValue::Text(text) => FieldValue::Text(text),
        }
    }

    pub(crate) fn definition(&self) -> crate::analyzer::FieldDefinition {
        crate::analyzer::FieldDefinition {
            id: self.short_name.clone(),
            name: self.name.clone(),
            unit: self.unit.clone(),
            encoding: self.encoding.label(),
        }
    }
}

pub(crate) fn qualified(header: &str, short_name: &str) -> String {
    if header.is_empty() {
        short_name.to_string()
    } else {
        format!("{header}.{short_name}")
    }
}

/// Read `width` bits starting `shift` bits above the LSB of `bytes`.
fn extract_unsigned(bytes: &[u8], shift: usize, width: usize) -> u64 {
    let acc = bytes
        .iter()
        .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));
    let mask = if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    ((acc >> shift) & mask) as u64
}

fn sign_extend(raw: u64, width: usize) -> i64 {
    if width >= 64 {
        return raw as i64;
    }
    let shift = 64 - width;
    ((raw << shift) as i64) >> shift
}

fn six_bit_text(raw: u64, width: usize) -> String {
    let chars = width / layout::SIX_BIT_CHAR_WIDTH;
    let text: String = (0..chars)
        .map(|i| {
            let index = (raw >> (layout::SIX_BIT_CHAR_WIDTH * (chars - 1 - i))) & 0x3F;
            layout::SIX_BIT_ALPHABET[index as usize] as char
        })
        .collect();
    text.trim_end().to_string()
}

fn ascii_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .trim_end()
        .to_string()
}
