//! # Star Ledger Store
//!
//! Durable persistence for sealed blocks. Provides a trait-based interface
//! with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The ledger itself lives in memory; a [`Store`] keeps a verbatim copy of
//! every sealed block so that a restarted process reloads exactly the same
//! chain. Stored hashes are never recomputed on load, so rows altered on
//! disk surface as validation failures instead of being silently re-sealed.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting a block
//!
//! ## Usage
//!
//! ```rust,no_run
//! use starledger_core::Block;
//! use starledger_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     let genesis = Block::genesis(1_700_000_000).unwrap();
//!     store.insert_block(&genesis).await.unwrap();
//!
//!     let chain = store.load_chain().await.unwrap();
//!     assert_eq!(chain.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: Inserting the same block twice returns `AlreadyExists`
//! - **Conflict detection**: A different block at an occupied height returns `Conflict`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
