//! The StarRegistry: ownership challenges, claim submission, and lookups.
//!
//! The registry owns the in-memory [`Ledger`] and a durable [`Store`].
//! Every accepted claim is sealed against the current tip, persisted,
//! and only then pushed onto the ledger, all under one async append gate.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use starledger_core::{
    Block, BlockHash, ChallengeResponse, Clock, Ed25519Verifier, OwnershipChallenge, Payload,
    SignatureVerifier, Star, StarClaim, SystemClock,
};
use starledger_store::{InsertResult, Store};

use crate::config::RegistryConfig;
use crate::error::{LedgerError, RegistryError, Result};
use crate::ledger::Ledger;

/// The star registry service.
///
/// Safe to share across tasks; all methods take `&self`.
pub struct StarRegistry<S: Store> {
    ledger: Ledger,
    store: Arc<S>,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
    /// Serializes seal, persist, push.
    append_gate: Mutex<()>,
}

impl<S: Store> StarRegistry<S> {
    /// Open a registry with Ed25519 identities and the system clock.
    pub async fn open(store: S, config: RegistryConfig) -> Result<Self> {
        Self::open_with(store, Arc::new(Ed25519Verifier), Arc::new(SystemClock), config).await
    }

    /// Open a registry with an injected verifier and clock.
    ///
    /// An empty store gets a fresh genesis block. Otherwise the chain is
    /// restored exactly as stored; inconsistencies are logged, never repaired.
    pub async fn open_with(
        store: S,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Result<Self> {
        let blocks = store.load_chain().await?;

        let ledger = if blocks.is_empty() {
            let ledger = Ledger::with_clock(Arc::clone(&clock))?;
            let genesis = ledger.tip().ok_or(LedgerError::MissingGenesis)?;
            persist(&store, &genesis).await?;
            ledger
        } else {
            let ledger = Ledger::from_blocks(blocks, Arc::clone(&clock))?;
            let heights = ledger.validate();
            if heights.is_empty() {
                info!(height = ledger.height(), "restored ledger");
            } else {
                warn!(height = ledger.height(), ?heights, "restored ledger is inconsistent");
            }
            ledger
        };

        Ok(Self {
            ledger,
            store: Arc::new(store),
            verifier,
            clock,
            config,
            append_gate: Mutex::new(()),
        })
    }

    /// Issue an ownership challenge for `identity`.
    pub fn issue_challenge(&self, identity: &str) -> ChallengeResponse {
        let challenge = OwnershipChallenge::issue(identity, self.clock.now());
        debug!(identity, issued_at = challenge.issued_at(), "issued challenge");

        ChallengeResponse {
            message: challenge.message(),
            window_seconds: self.config.window_seconds,
        }
    }

    /// Submit a signed challenge together with a star, appending a claim.
    ///
    /// Nothing is appended unless the challenge is well-formed, inside its
    /// window, issued for `identity`, and the signature verifies. If the
    /// chain fails re-validation after the append, the block stays on the
    /// chain and is returned inside [`RegistryError::ChainInconsistent`].
    pub async fn submit_claim(
        &self,
        identity: &str,
        message: &str,
        signature: &str,
        star: Star,
    ) -> Result<Block> {
        self.check_challenge(identity, message)
            .map_err(|e| rejected(identity, e))?;
        self.verify_signature(identity, message, signature)
            .map_err(|e| rejected(identity, e))?;

        let claim = StarClaim {
            address: identity.to_string(),
            signature: signature.to_string(),
            message: message.to_string(),
            star,
        };
        let payload = Payload::from(claim).encode()?;

        let gate = self.append_gate.lock().await;

        if self.config.single_use_challenges && self.ledger.contains_message(message) {
            return Err(rejected(identity, RegistryError::ChallengeReused));
        }

        let block = self.ledger.seal_next(payload);
        persist(self.store.as_ref(), &block).await?;
        self.ledger.push(block.clone())?;
        drop(gate);

        info!(identity, height = block.height(), hash = %block.hash(), "claim accepted");

        if self.config.revalidate_after_append {
            let heights = self.ledger.validate();
            if !heights.is_empty() {
                return Err(RegistryError::ChainInconsistent {
                    block: Box::new(block),
                    heights,
                });
            }
        }

        Ok(block)
    }

    fn check_challenge(&self, identity: &str, message: &str) -> Result<()> {
        let challenge = OwnershipChallenge::parse(message)
            .map_err(|e| RegistryError::InvalidChallenge(e.to_string()))?;

        let now = self.clock.now();
        if challenge.elapsed(now) < 0 {
            return Err(RegistryError::InvalidChallenge(format!(
                "issued at {} is in the future (now {now})",
                challenge.issued_at()
            )));
        }
        if !challenge.is_within_window(now, self.config.window_seconds) {
            return Err(RegistryError::ExpiredChallenge {
                issued_at: challenge.issued_at(),
                now,
                window_seconds: self.config.window_seconds,
            });
        }
        if challenge.identity() != identity {
            return Err(RegistryError::InvalidChallenge(format!(
                "issued for {}",
                challenge.identity()
            )));
        }

        Ok(())
    }

    /// Fails closed: a verifier error counts as a bad signature.
    fn verify_signature(&self, identity: &str, message: &str, signature: &str) -> Result<()> {
        match self.verifier.verify(message, identity, signature) {
            Ok(true) => Ok(()),
            Ok(false) => Err(RegistryError::InvalidSignature),
            Err(e) => {
                debug!(identity, error = %e, "signature verifier failed");
                Err(RegistryError::InvalidSignature)
            }
        }
    }

    pub fn get_block_by_hash(&self, hash: &BlockHash) -> Option<Block> {
        self.ledger.get_by_hash(hash)
    }

    pub fn get_block_by_height(&self, height: u64) -> Option<Block> {
        self.ledger.get_by_height(height)
    }

    /// Claims owned by `identity`, in chain order.
    pub fn get_claims_by_identity(&self, identity: &str) -> Vec<StarClaim> {
        self.ledger.get_payloads_by_identity(identity)
    }

    pub fn get_height(&self) -> u64 {
        self.ledger.height()
    }

    /// Full chain audit. Returns offending heights; empty means sound.
    pub fn validate_chain(&self) -> Vec<u64> {
        self.ledger.validate()
    }

    /// Snapshot of the whole chain, genesis first.
    ///
    /// The ledger is never handed out. Every append goes through
    /// [`StarRegistry::submit_claim`], which persists before pushing.
    pub fn blocks(&self) -> Vec<Block> {
        self.ledger.blocks()
    }

    pub fn block_count(&self) -> u64 {
        self.ledger.block_count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl<S: Store> std::fmt::Debug for StarRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarRegistry")
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Write a block to the store, accepting an identical copy already there.
async fn persist<S: Store + ?Sized>(store: &S, block: &Block) -> Result<()> {
    match store.insert_block(block).await? {
        InsertResult::Inserted | InsertResult::AlreadyExists => Ok(()),
        InsertResult::Conflict { existing } => Err(RegistryError::PersistConflict {
            height: block.height(),
            existing,
        }),
    }
}

fn rejected(identity: &str, err: RegistryError) -> RegistryError {
    warn!(identity, reason = %err, "claim rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use starledger_core::{CoreError, Keypair, ManualClock};
    use starledger_store::MemoryStore;

    const T0: i64 = 1_700_000_000;

    struct FailingVerifier;

    impl SignatureVerifier for FailingVerifier {
        fn verify(&self, _: &str, _: &str, _: &str) -> std::result::Result<bool, CoreError> {
            Err(CoreError::InvalidPublicKey)
        }
    }

    fn star(story: &str) -> Star {
        Star {
            ra: "16h 29m 1.0s".into(),
            dec: "68° 52' 56.9".into(),
            story: story.into(),
            ..Star::default()
        }
    }

    async fn registry_with(
        store: MemoryStore,
        config: RegistryConfig,
    ) -> (StarRegistry<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let registry = StarRegistry::open_with(store, Arc::new(Ed25519Verifier), clock.clone(), config)
            .await
            .unwrap();
        (registry, clock)
    }

    async fn registry() -> (StarRegistry<MemoryStore>, Arc<ManualClock>) {
        registry_with(MemoryStore::new(), RegistryConfig::default()).await
    }

    #[tokio::test]
    async fn test_open_persists_genesis() {
        let (registry, _) = registry().await;

        assert_eq!(registry.get_height(), 0);
        assert_eq!(registry.store().block_count().await.unwrap(), 1);
        assert_eq!(
            registry.store().get_block(0).await.unwrap(),
            registry.get_block_by_height(0)
        );
    }

    #[tokio::test]
    async fn test_issue_challenge() {
        let (registry, _) = registry().await;
        let response = registry.issue_challenge("abc");

        assert_eq!(response.message, "abc:1700000000:starRegistry");
        assert_eq!(response.window_seconds, 300);
    }

    #[tokio::test]
    async fn test_accepted_claim_is_persisted() {
        let (registry, clock) = registry().await;
        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();

        let message = registry.issue_challenge(&identity).message;
        clock.advance(30);
        let block = registry
            .submit_claim(&identity, &message, &keypair.sign_message(&message), star("one"))
            .await
            .unwrap();

        assert_eq!(block.height(), 1);
        assert_eq!(block.timestamp(), T0 + 30);
        assert_eq!(registry.store().get_block(1).await.unwrap(), Some(block));
    }

    #[tokio::test]
    async fn test_future_challenge_is_invalid() {
        let (registry, _) = registry().await;
        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = OwnershipChallenge::issue(identity.as_str(), T0 + 60).message();

        let err = registry
            .submit_claim(&identity, &message, &keypair.sign_message(&message), star("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChallenge(_)));
        assert_eq!(registry.get_height(), 0);
    }

    #[tokio::test]
    async fn test_challenge_for_other_identity_is_invalid() {
        let (registry, _) = registry().await;
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);

        let message = registry.issue_challenge(&alice.address()).message;
        let err = registry
            .submit_claim(&bob.address(), &message, &bob.sign_message(&message), star("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChallenge(_)));
    }

    #[tokio::test]
    async fn test_malformed_challenge_is_invalid() {
        let (registry, _) = registry().await;
        let err = registry
            .submit_claim("abc", "abc:soon:starRegistry", "00", star("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChallenge(_)));
    }

    #[tokio::test]
    async fn test_verifier_error_fails_closed() {
        let clock = Arc::new(ManualClock::new(T0));
        let registry = StarRegistry::open_with(
            MemoryStore::new(),
            Arc::new(FailingVerifier),
            clock,
            RegistryConfig::default(),
        )
        .await
        .unwrap();

        let message = registry.issue_challenge("abc").message;
        let err = registry
            .submit_claim("abc", &message, "00", star("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSignature));
        assert_eq!(registry.get_height(), 0);
    }

    #[tokio::test]
    async fn test_malformed_identity_is_invalid_signature() {
        let (registry, _) = registry().await;
        let message = registry.issue_challenge("not-hex").message;

        let err = registry
            .submit_claim("not-hex", &message, "zz", star("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_single_use_challenges() {
        let config = RegistryConfig {
            single_use_challenges: true,
            ..RegistryConfig::default()
        };
        let (registry, _) = registry_with(MemoryStore::new(), config).await;
        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = registry.issue_challenge(&identity).message;
        let signature = keypair.sign_message(&message);

        registry
            .submit_claim(&identity, &message, &signature, star("one"))
            .await
            .unwrap();
        let err = registry
            .submit_claim(&identity, &message, &signature, star("two"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::ChallengeReused));
        assert_eq!(registry.get_height(), 1);
    }

    #[tokio::test]
    async fn test_challenge_reusable_within_window_by_default() {
        let (registry, _) = registry().await;
        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = registry.issue_challenge(&identity).message;
        let signature = keypair.sign_message(&message);

        for story in ["one", "two"] {
            registry
                .submit_claim(&identity, &message, &signature, star(story))
                .await
                .unwrap();
        }
        assert_eq!(registry.get_claims_by_identity(&identity).len(), 2);
    }

    #[tokio::test]
    async fn test_store_conflict_leaves_ledger_unchanged() {
        let (registry, _) = registry().await;
        let genesis = registry.get_block_by_height(0).unwrap();
        let foreign = Block::seal(b"foreign".to_vec(), 1, *genesis.hash(), T0 - 1);
        registry.store().insert_block(&foreign).await.unwrap();

        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = registry.issue_challenge(&identity).message;
        let err = registry
            .submit_claim(&identity, &message, &keypair.sign_message(&message), star("x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::PersistConflict { height: 1, existing } if existing == *foreign.hash()
        ));
        assert_eq!(registry.get_height(), 0);
    }

    #[tokio::test]
    async fn test_inconsistent_chain_keeps_appended_block() {
        let store = MemoryStore::new();
        let genesis = Block::genesis(T0).unwrap();
        let first = Block::seal(b"first".to_vec(), 1, *genesis.hash(), T0);
        let forged = Block::from_parts(1, *genesis.hash(), T0, b"forged".to_vec(), *first.hash());
        store.insert_block(&genesis).await.unwrap();
        store.overwrite(forged);

        let (registry, _) = registry_with(store, RegistryConfig::default()).await;
        assert_eq!(registry.validate_chain(), vec![1]);

        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = registry.issue_challenge(&identity).message;
        let err = registry
            .submit_claim(&identity, &message, &keypair.sign_message(&message), star("x"))
            .await
            .unwrap_err();

        match err {
            RegistryError::ChainInconsistent { block, heights } => {
                assert_eq!(block.height(), 2);
                assert_eq!(heights, vec![1]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.get_height(), 2);
    }

    #[tokio::test]
    async fn test_revalidation_can_be_disabled() {
        let store = MemoryStore::new();
        let genesis = Block::genesis(T0).unwrap();
        let forged = Block::from_parts(1, *genesis.hash(), T0, b"forged".to_vec(), BlockHash::ZERO);
        store.insert_block(&genesis).await.unwrap();
        store.overwrite(forged);

        let config = RegistryConfig {
            revalidate_after_append: false,
            ..RegistryConfig::default()
        };
        let (registry, _) = registry_with(store, config).await;

        let keypair = Keypair::from_seed(&[1; 32]);
        let identity = keypair.address();
        let message = registry.issue_challenge(&identity).message;
        let block = registry
            .submit_claim(&identity, &message, &keypair.sign_message(&message), star("x"))
            .await
            .unwrap();

        assert_eq!(block.height(), 2);
        assert!(!registry.validate_chain().is_empty());
    }
}
