//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use starledger::{RegistryConfig, RegistryError, StarRegistry};
use starledger_core::{Block, ChallengeResponse, Ed25519Verifier, Keypair, ManualClock, Star};
use starledger_store::{MemoryStore, SqliteStore, Store};

/// Clock start for fixture registries.
pub const FIXTURE_EPOCH: i64 = 1_700_000_000;

/// A claimant: one keypair, identified by its hex public key.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The identity to claim under.
    pub fn identity(&self) -> String {
        self.keypair.address()
    }

    /// Sign an issued challenge.
    pub fn sign(&self, challenge: &ChallengeResponse) -> String {
        self.keypair.sign_message(&challenge.message)
    }

    /// Request a challenge, sign it, and submit `star`.
    pub async fn claim<S: Store>(
        &self,
        registry: &StarRegistry<S>,
        star: Star,
    ) -> Result<Block, RegistryError> {
        let identity = self.identity();
        let challenge = registry.issue_challenge(&identity);
        registry
            .submit_claim(&identity, &challenge.message, &self.sign(&challenge), star)
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A star with every field filled in.
pub fn sample_star() -> Star {
    Star {
        ra: "16h 29m 1.0s".into(),
        dec: "68° 52' 56.9".into(),
        story: "Found star using https://www.google.com/sky/".into(),
        magnitude: Some("4.8".into()),
        constellation: Some("Draco".into()),
    }
}

/// A registry driven by a manual clock starting at [`FIXTURE_EPOCH`].
pub struct TestRegistry<S: Store> {
    pub registry: StarRegistry<S>,
    pub clock: Arc<ManualClock>,
}

impl TestRegistry<MemoryStore> {
    /// In-memory registry with the default config.
    pub async fn memory() -> Result<Self, RegistryError> {
        Self::open(MemoryStore::new(), RegistryConfig::default()).await
    }

    /// In-memory registry with a custom config.
    pub async fn memory_with(config: RegistryConfig) -> Result<Self, RegistryError> {
        Self::open(MemoryStore::new(), config).await
    }
}

impl TestRegistry<SqliteStore> {
    /// SQLite-backed registry at `path`, created if missing.
    pub async fn sqlite(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Self::open(SqliteStore::open(path)?, RegistryConfig::default()).await
    }
}

impl<S: Store> TestRegistry<S> {
    /// Open over any store with Ed25519 verification.
    pub async fn open(store: S, config: RegistryConfig) -> Result<Self, RegistryError> {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH));
        let registry =
            StarRegistry::open_with(store, Arc::new(Ed25519Verifier), clock.clone(), config).await?;
        Ok(Self { registry, clock })
    }
}

impl<S: Store> Deref for TestRegistry<S> {
    type Target = StarRegistry<S>;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}
