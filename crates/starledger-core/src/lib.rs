//! # Star Ledger Core
//!
//! Pure primitives for the star ledger: blocks, canonical hashing, payloads,
//! and the ownership challenge.
//!
//! This crate contains no I/O, no storage, no locking. It is pure computation
//! over hash-linked data structures. Wall-clock time and signature checks are
//! injected through the [`Clock`] and [`SignatureVerifier`] capabilities.
//!
//! ## Key Types
//!
//! - [`Block`] - One sealed ledger entry with a self-computed hash
//! - [`BlockHash`] - Blake3 digest of a block's canonical header
//! - [`Payload`] - Tagged block content: genesis marker or star claim
//! - [`OwnershipChallenge`] - Self-certifying, time-stamped challenge message
//!
//! ## Canonicalization
//!
//! Block hashes are computed over deterministic CBOR. See [`canonical`] module.

pub mod block;
pub mod canonical;
pub mod challenge;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod types;
pub mod validation;

pub use block::Block;
pub use canonical::canonical_header_bytes;
pub use challenge::{ChallengeResponse, OwnershipChallenge, CHALLENGE_TAG, DEFAULT_WINDOW_SECS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Ed25519Verifier, Keypair, SignatureVerifier};
pub use error::{CoreError, ValidationError};
pub use payload::{GenesisMarker, Payload, Star, StarClaim, GENESIS_DATA};
pub use types::BlockHash;
pub use validation::{validate_block, validate_link};
