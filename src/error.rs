//! Errors raised by the algebra layer.
//!
//! Only invalid parameters are errors. Irregular data (inverted intervals,
//! inconsistent block fields) is processed as-is and never reported here.

use thiserror::Error;

/// Which side of an interval an extension applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Upstream,
    Downstream,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Upstream => write!(f, "upstream"),
            Side::Downstream => write!(f, "downstream"),
        }
    }
}

/// Invalid arguments to an algebra operation.
///
/// These are returned when the operation is built, before any output exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    #[error("{side} extension must be non-negative, got {amount}")]
    NegativeExtension { side: Side, amount: i64 },

    #[error("Query window end ({end}) is before its start ({start})")]
    InvalidWindow { start: i64, end: i64 },
}

pub type Result<T> = std::result::Result<T, AlgebraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AlgebraError::NegativeExtension {
            side: Side::Downstream,
            amount: -5,
        };
        assert_eq!(
            err.to_string(),
            "downstream extension must be non-negative, got -5"
        );

        let err = AlgebraError::InvalidWindow { start: 10, end: 5 };
        assert!(err.to_string().contains("before its start"));
    }
}
