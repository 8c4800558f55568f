use thiserror::Error;

/// Errors produced when decoding primitive values from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    /// A byte slice did not have the required length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Text was not a canonical unsigned decimal integer.
    #[error("not a canonical decimal integer: {0:?}")]
    InvalidDecimal(String),

    /// A decimal integer does not fit in 256 bits.
    #[error("integer does not fit in 256 bits")]
    Overflow,

    /// Text was not valid base58.
    #[error("invalid base58 encoding")]
    InvalidBase58,
}
