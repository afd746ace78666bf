//! # Starledger
//!
//! A hash-linked ledger of star claims, with challenge/response
//! ownership verification.
//!
//! ## Overview
//!
//! - **Blocks**: Immutable, sealed entries whose hash covers height,
//!   previous hash, timestamp, and payload
//! - **Ledger**: The ordered chain, starting at a fixed genesis block
//! - **Challenges**: Self-certifying `identity:timestamp:starRegistry`
//!   messages, valid for a fixed window (300 seconds by default)
//! - **Claims**: A star registered by an identity that signed a challenge
//!
//! ## Key Concepts
//!
//! - **Append is final**: A sealed block is never rolled back. Audits
//!   report problems, they never repair them.
//! - **Stateless challenges**: The issue time travels inside the message,
//!   so no session store is needed. A leaked message stays usable until
//!   its window closes unless `single_use_challenges` is enabled.
//! - **Fail closed**: A verifier that errors counts as a bad signature.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger::{RegistryConfig, StarRegistry};
//! use starledger::core::{Keypair, Star};
//! use starledger::store::SqliteStore;
//!
//! async fn example() -> starledger::Result<()> {
//!     let store = SqliteStore::open("stars.db")?;
//!     let registry = StarRegistry::open(store, RegistryConfig::default()).await?;
//!
//!     let keypair = Keypair::generate();
//!     let identity = keypair.address();
//!
//!     let challenge = registry.issue_challenge(&identity);
//!     let signature = keypair.sign_message(&challenge.message);
//!
//!     let star = Star {
//!         ra: "16h 29m 1.0s".into(),
//!         dec: "68° 52' 56.9".into(),
//!         story: "Found star using https://www.google.com/sky/".into(),
//!         ..Star::default()
//!     };
//!     let block = registry
//!         .submit_claim(&identity, &challenge.message, &signature, star)
//!         .await?;
//!     assert_eq!(block.height(), 1);
//!
//!     assert!(registry.validate_chain().is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `starledger::core` - Core primitives (Block, Payload, challenges, keys)
//! - `starledger::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod ledger;
pub mod registry;

// Re-export component crates
pub use starledger_core as core;
pub use starledger_store as store;

// Re-export main types for convenience
pub use config::RegistryConfig;
pub use error::{LedgerError, RegistryError, Result};
pub use ledger::{ClaimScan, Ledger};
pub use registry::StarRegistry;

// Re-export commonly used core types
pub use starledger_core::{
    Block, BlockHash, ChallengeResponse, Clock, Keypair, ManualClock, OwnershipChallenge, Payload,
    SignatureVerifier, Star, StarClaim, SystemClock,
};
