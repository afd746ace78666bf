//! Registry configuration.

use serde::Deserialize;
use starledger_core::DEFAULT_WINDOW_SECS;

/// Configuration for the [`StarRegistry`](crate::StarRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds a challenge stays valid. The boundary is inclusive.
    pub window_seconds: u64,

    /// Run a full chain audit after every accepted claim.
    pub revalidate_after_append: bool,

    /// Reject a challenge message that already backs a claim on the chain.
    ///
    /// Off by default: the challenge is stateless and a message may be
    /// reused until its window closes.
    pub single_use_challenges: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECS,
            revalidate_after_append: true,
            single_use_challenges: false,
        }
    }
}
