//! # Starledger Testkit
//!
//! Testing utilities for Starledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Header vectors**: Pinned canonical header bytes for hash reproducibility
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Claimants and clock-driven registries for test scenarios
//!
//! ## Header Vectors
//!
//! ```rust
//! use starledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use starledger_testkit::generators::{block_from_params, BlockParams};
//!
//! proptest! {
//!     #[test]
//!     fn block_hash_is_deterministic(params: BlockParams) {
//!         let b1 = block_from_params(&params);
//!         let b2 = block_from_params(&params);
//!         prop_assert_eq!(b1.hash(), b2.hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use starledger_testkit::fixtures::{sample_star, TestFixture, TestRegistry};
//!
//! async fn example() {
//!     let registry = TestRegistry::memory().await.unwrap();
//!     let block = TestFixture::new().claim(&registry, sample_star()).await.unwrap();
//!     assert_eq!(block.height(), 1);
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, sample_star, TestFixture, TestRegistry, FIXTURE_EPOCH};
pub use generators::{block_from_params, BlockParams};
pub use vectors::{all_vectors, verify_all_vectors, HeaderVector};
