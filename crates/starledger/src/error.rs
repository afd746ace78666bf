//! Error types for the ledger and the registry.

use starledger_core::{Block, BlockHash, CoreError};
use starledger_store::StoreError;
use thiserror::Error;

/// Errors from ledger construction and append.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A restored chain had no genesis block.
    #[error("chain has no genesis block")]
    MissingGenesis,

    /// A sealed block no longer extends the tip.
    #[error("stale tip: block sealed for height {got}, next height is {expected}")]
    StaleTip { expected: u64, got: u64 },

    /// Payload encoding failed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Errors that can occur during registry operations.
///
/// All variants are recoverable by the caller; none aborts the process.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The challenge window has passed. Request a new challenge.
    #[error("challenge expired: issued at {issued_at}, now {now}, window {window_seconds}s")]
    ExpiredChallenge {
        issued_at: i64,
        now: i64,
        window_seconds: u64,
    },

    /// Signature verification failed or the verifier could not run.
    #[error("invalid signature")]
    InvalidSignature,

    /// The message is not a challenge issued for this identity.
    #[error("invalid challenge: {0}")]
    InvalidChallenge(String),

    /// The challenge was already used for a claim on this chain.
    #[error("challenge already used")]
    ChallengeReused,

    /// The claim was appended but the chain failed re-validation.
    ///
    /// The block stays on the chain; appends are never rolled back.
    #[error("chain inconsistent at heights {heights:?} after appending block {}", .block.height())]
    ChainInconsistent { block: Box<Block>, heights: Vec<u64> },

    /// The store already holds a different block at the height being written.
    #[error("store conflict at height {height}: existing block {existing}")]
    PersistConflict { height: u64, existing: BlockHash },

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
