//! Output kinds and the string helpers shared by the format decoders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Textual rendering selected by the caller for one decode call.
///
/// Only [`OutputKind::is_json`] changes how grouped formats wrap their
/// elements; the individual field renderings differ per kind.
///
/// # Examples
/// ```
/// use asterix_core::OutputKind;
///
/// let kind: OutputKind = "jsonh".parse().unwrap();
/// assert_eq!(kind, OutputKind::JsonHuman);
/// assert!(kind.is_json());
/// assert!(!OutputKind::Text.is_json());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Indented, human-readable text.
    #[default]
    #[serde(rename = "text")]
    Text,
    /// One `header.field value` line per field.
    #[serde(rename = "out")]
    Out,
    /// Compact JSON with raw field values.
    #[serde(rename = "json")]
    Json,
    /// JSON with scaled values and meanings.
    #[serde(rename = "jsonh")]
    JsonHuman,
    /// JSON with one object per field (raw value, description, meaning).
    #[serde(rename = "jsone")]
    JsonExtensive,
}

impl OutputKind {
    pub const ALL: [OutputKind; 5] = [
        OutputKind::Text,
        OutputKind::Out,
        OutputKind::Json,
        OutputKind::JsonHuman,
        OutputKind::JsonExtensive,
    ];

    pub fn is_json(self) -> bool {
        matches!(
            self,
            OutputKind::Json | OutputKind::JsonHuman | OutputKind::JsonExtensive
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputKind::Text => "text",
            OutputKind::Out => "out",
            OutputKind::Json => "json",
            OutputKind::JsonHuman => "jsonh",
            OutputKind::JsonExtensive => "jsone",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output kind '{0}' (expected text, out, json, jsonh or jsone)")]
pub struct UnknownOutputKind(pub String);

impl FromStr for OutputKind {
    type Err = UnknownOutputKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        OutputKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| UnknownOutputKind(value.to_string()))
    }
}

/// Scratch buffer for a JSON array whose elements may all turn out empty.
///
/// Elements are separated by `,` (never trailing). The finished array is
/// appended to the caller's accumulator only when at least one element
/// produced content; otherwise it is dropped without a trace.
#[derive(Debug)]
pub struct JsonArray {
    buf: String,
    elements: usize,
    produced: bool,
}

impl JsonArray {
    pub fn new() -> Self {
        Self {
            buf: String::from("["),
            elements: 0,
            produced: false,
        }
    }

    /// Render one element into the scratch buffer. `render` returns whether
    /// it produced visible content.
    pub fn push_with<F>(&mut self, render: F)
    where
        F: FnOnce(&mut String) -> bool,
    {
        if self.elements > 0 {
            self.buf.push(',');
        }
        self.produced |= render(&mut self.buf);
        self.elements += 1;
    }

    pub fn produced(&self) -> bool {
        self.produced
    }

    /// Close the array and append it to `out` if anything was produced.
    pub fn finish_into(mut self, out: &mut String) -> bool {
        self.buf.push(']');
        if self.produced {
            out.push_str(&self.buf);
        }
        self.produced
    }
}

impl Default for JsonArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote and escape `value` as a JSON string literal.
pub fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Render a float as a JSON number; non-finite values become `null`.
pub fn json_number(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|number| number.to_string())
        .unwrap_or_else(|| "null".to_string())
}
