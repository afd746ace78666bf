//! Error types for the star ledger core.

use thiserror::Error;

use crate::types::BlockHash;

/// Core errors that can occur while encoding, decoding, or parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("malformed challenge: {0}")]
    MalformedChallenge(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,
}

/// Integrity failures found when auditing blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block {height}: stored hash {stored} does not match recomputed {computed}")]
    HashMismatch {
        height: u64,
        stored: BlockHash,
        computed: BlockHash,
    },

    #[error("block {height}: previous_hash {got} does not link to {expected}")]
    BrokenLink {
        height: u64,
        expected: BlockHash,
        got: BlockHash,
    },
}

impl ValidationError {
    /// The height of the offending block.
    pub fn height(&self) -> u64 {
        match self {
            ValidationError::HashMismatch { height, .. } => *height,
            ValidationError::BrokenLink { height, .. } => *height,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
