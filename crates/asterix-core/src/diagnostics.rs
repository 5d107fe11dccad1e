//! Diagnostics reported while decoding.
//!
//! Decoders never abort on bad input. They report what went wrong into a
//! caller-supplied [`DiagnosticSink`] and return a degraded result, so one
//! corrupt item does not block its siblings. Each decoding thread owns its
//! sink; nothing here is global.

use serde::Serialize;

use crate::format::FormatError;

/// Severity label attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Single severity-tagged message.
///
/// # Examples
/// ```
/// use asterix_core::{Diagnostic, FormatError, Severity};
///
/// let diagnostic = Diagnostic::from(&FormatError::MissingElement);
/// assert_eq!(diagnostic.severity, Severity::Error);
/// assert_eq!(diagnostic.code, "ASX-REP-NO-ELEMENT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity label (`error` or `warning`).
    pub severity: Severity,
    /// Stable identifier (e.g., `ASX-REP-LENGTH`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub fn warning(error: &FormatError) -> Self {
        Self {
            severity: Severity::Warning,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<&FormatError> for Diagnostic {
    fn from(error: &FormatError) -> Self {
        Self {
            severity: Severity::Error,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Receiver for decode diagnostics. Reporting must never fail.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, error: &FormatError) {
        self.report(Diagnostic::from(error));
    }

    fn warn(&mut self, error: &FormatError) {
        self.report(Diagnostic::warning(error));
    }
}

/// In-memory collector preserving report order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    /// Whether any diagnostic carries `code`.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Sink that drops every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl DiagnosticSink for Discard {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
