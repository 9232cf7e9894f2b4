//! Error types for the UCI coding core.

use thiserror::Error;

/// Result type for UCI coding operations.
pub type UciResult<T> = Result<T, UciError>;

/// Errors surfaced by the UCI encoder/decoder pipeline.
///
/// A CRC mismatch on decode is deliberately *not* an error: it is reported
/// through the `valid` flag of the decoded value so higher layers can discard
/// the PDU without unwinding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UciError {
    /// A buffer or parameter failed basic validation.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// PUSCH code rate is not a finite positive number.
    #[error("invalid code rate: {rate}")]
    InvalidRate { rate: f32 },

    /// PUCCH format 4 spreading factor out of range.
    #[error("invalid OCC length: {occ_length} (must be 1 or 2)")]
    InvalidOccLength { occ_length: u32 },

    /// Combination not implemented by this pipeline.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Block payload/rate point that cannot be decoded (A = 11 with E <= 16).
    #[error("under rate-matched block: A={a}, E={e}")]
    UnderRateMatched { a: usize, e: usize },

    /// Received LLR sequence carries no energy.
    #[error("received all-zero LLRs")]
    AllZeros,

    /// No polar code exists for the requested (K, E) operating point.
    #[error("polar code selection failed: K={k}, E={e}")]
    PolarCodeSelectFailed { k: usize, e: usize },

    /// The polar decoder rejected its input.
    #[error("polar decoding failed")]
    PolarDecodeFailed,

    /// The CSI codec rejected the report values on pack.
    #[error("CSI part 1 packing failed")]
    CsiPackFailed,

    /// The CSI codec rejected the bit sequence on unpack.
    #[error("CSI part 1 unpacking failed")]
    CsiUnpackFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UciError::UnderRateMatched { a: 11, e: 16 };
        assert_eq!(err.to_string(), "under rate-matched block: A=11, E=16");

        let err = UciError::InvalidOccLength { occ_length: 3 };
        assert!(err.to_string().contains("OCC length: 3"));
    }
}
