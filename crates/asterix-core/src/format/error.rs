use thiserror::Error;

use super::FormatKind;

/// Errors raised while building or decoding data-item formats.
///
/// Schema-integrity variants (`MissingElement`, `WrongElementKind`,
/// `InvalidBitRange`, `UnsupportedWidth`) describe a defective format tree.
/// The remaining variants describe bad input data for one item instance.
///
/// # Examples
/// ```
/// use asterix_core::FormatError;
///
/// let err = FormatError::LengthMismatch {
///     declared: 6,
///     expected: 5,
///     count: 2,
///     element_len: 2,
/// };
/// assert!(err.to_string().contains("repetitive length mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("repetitive format has no fixed element attached")]
    MissingElement,
    #[error("repetitive format requires a fixed element, got {kind}")]
    WrongElementKind { kind: FormatKind },
    #[error(
        "repetitive length mismatch: declared {declared} bytes, expected {expected} \
         ({count} x {element_len} + 1)"
    )]
    LengthMismatch {
        declared: usize,
        expected: usize,
        count: u8,
        element_len: usize,
    },
    #[error("fixed length mismatch: declared {declared} bytes, expected {expected}")]
    FixedLengthMismatch { declared: usize, expected: usize },
    #[error("{kind} format does not take sub-items")]
    NoSubItems { kind: FormatKind },
    #[error("item too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid bit range for field {name}: {from}..={to}")]
    InvalidBitRange { name: String, from: usize, to: usize },
    #[error("unsupported width for field {name}: {width} bits")]
    UnsupportedWidth { name: String, width: usize },
    #[error("unknown field: {name}")]
    UnknownField { name: String },
}

impl FormatError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::MissingElement => "ASX-REP-NO-ELEMENT",
            FormatError::WrongElementKind { .. } => "ASX-REP-WRONG-KIND",
            FormatError::LengthMismatch { .. } => "ASX-REP-LENGTH",
            FormatError::FixedLengthMismatch { .. } => "ASX-FIXED-LENGTH",
            FormatError::NoSubItems { .. } => "ASX-NO-SUBITEMS",
            FormatError::TooShort { .. } => "ASX-TOO-SHORT",
            FormatError::InvalidBitRange { .. } => "ASX-BITS-RANGE",
            FormatError::UnsupportedWidth { .. } => "ASX-BITS-WIDTH",
            FormatError::UnknownField { .. } => "ASX-UNKNOWN-FIELD",
        }
    }

    /// Whether the error points at the format tree rather than the input.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FormatError::MissingElement
                | FormatError::WrongElementKind { .. }
                | FormatError::NoSubItems { .. }
                | FormatError::InvalidBitRange { .. }
                | FormatError::UnsupportedWidth { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::FormatError;
    use crate::format::FormatKind;

    #[test]
    fn codes_are_stable() {
        assert_eq!(FormatError::MissingElement.code(), "ASX-REP-NO-ELEMENT");
        let err = FormatError::TooShort {
            needed: 4,
            actual: 2,
        };
        assert_eq!(err.code(), "ASX-TOO-SHORT");
        assert!(err.to_string().contains("need 4 bytes, got 2"));
    }

    #[test]
    fn schema_errors_are_classified() {
        assert!(FormatError::MissingElement.is_schema_error());
        assert!(
            FormatError::WrongElementKind {
                kind: FormatKind::Repetitive
            }
            .is_schema_error()
        );
        assert!(
            !FormatError::LengthMismatch {
                declared: 6,
                expected: 5,
                count: 2,
                element_len: 2,
            }
            .is_schema_error()
        );
    }
}
