//! Ownership challenge: a self-certifying, time-stamped message.
//!
//! The message format is `<identity>:<issued_at>:starRegistry`. Validity is
//! re-derived from the embedded timestamp alone, so no outstanding
//! challenges are stored. A forwarded message stays valid until its window
//! closes; there is no replay protection inside the window.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Protocol tag distinguishing challenge messages from other formats.
pub const CHALLENGE_TAG: &str = "starRegistry";

/// Seconds a challenge stays valid after issue.
pub const DEFAULT_WINDOW_SECS: u64 = 300;

/// A parsed ownership challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipChallenge {
    identity: String,
    issued_at: i64,
}

impl OwnershipChallenge {
    /// Issue a challenge for `identity` at time `now`.
    pub fn issue(identity: impl Into<String>, now: i64) -> Self {
        Self {
            identity: identity.into(),
            issued_at: now,
        }
    }

    /// Parse a challenge message.
    ///
    /// Splits from the right, so the identity may itself contain `:`.
    pub fn parse(message: &str) -> Result<Self, CoreError> {
        let mut parts = message.rsplitn(3, ':');
        let tag = parts.next();
        let issued_at = parts.next();
        let identity = parts.next();

        let (identity, issued_at) = match (identity, issued_at, tag) {
            (Some(identity), Some(issued_at), Some(CHALLENGE_TAG)) => (identity, issued_at),
            (Some(_), Some(_), Some(tag)) => {
                return Err(CoreError::MalformedChallenge(format!("unknown tag {tag:?}")))
            }
            _ => return Err(CoreError::MalformedChallenge("expected identity:time:tag".into())),
        };

        if identity.is_empty() {
            return Err(CoreError::MalformedChallenge("empty identity".into()));
        }

        let parsed = issued_at
            .parse::<i64>()
            .map_err(|e| CoreError::MalformedChallenge(format!("bad timestamp: {e}")))?;

        // Only the form `message()` produces: no sign prefix, no leading zeros.
        if parsed.to_string() != issued_at {
            return Err(CoreError::MalformedChallenge(format!(
                "non-canonical timestamp {issued_at:?}"
            )));
        }

        Ok(Self {
            identity: identity.to_string(),
            issued_at: parsed,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// The message the identity must sign.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Seconds elapsed between issue and `now`. Negative if issued in the future.
    pub fn elapsed(&self, now: i64) -> i64 {
        now.saturating_sub(self.issued_at)
    }

    /// Whether a response at `now` falls inside the window. The boundary is inclusive.
    pub fn is_within_window(&self, now: i64, window_secs: u64) -> bool {
        let elapsed = self.elapsed(now);
        elapsed >= 0 && (elapsed as u64) <= window_secs
    }
}

impl fmt::Display for OwnershipChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.identity, self.issued_at, CHALLENGE_TAG)
    }
}

/// What a caller receives when requesting a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub message: String,
    pub window_seconds: u64,
}
