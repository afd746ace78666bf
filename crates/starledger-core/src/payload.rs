//! Block payloads.
//!
//! A block carries opaque bytes; the ledger itself only ever writes two
//! shapes, so they are modelled as a tagged variant and decoded
//! explicitly rather than inferred from content.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Data carried by the genesis block.
pub const GENESIS_DATA: &str = "Genesis Block";

/// The content of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Fixed marker of the first block in a chain.
    Genesis(GenesisMarker),
    /// A star registered by a verified identity.
    StarClaim(StarClaim),
}

/// Payload of the genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMarker {
    pub data: String,
}

/// A claim of a star, bound to the identity that signed the challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarClaim {
    /// The identity (address) that owns the star.
    pub address: String,
    /// Signature over `message`, as submitted.
    pub signature: String,
    /// The ownership challenge that was signed.
    pub message: String,
    /// Descriptive star metadata.
    pub star: Star,
}

/// Free-form star coordinates and story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    /// Right ascension, e.g. `16h 29m 1.0s`.
    pub ra: String,
    /// Declination, e.g. `68° 52' 56.9`.
    pub dec: String,
    pub story: String,
    pub magnitude: Option<String>,
    pub constellation: Option<String>,
}

impl Payload {
    /// The genesis marker payload.
    pub fn genesis() -> Self {
        Payload::Genesis(GenesisMarker {
            data: GENESIS_DATA.to_string(),
        })
    }

    /// The owning identity, if this payload has one.
    pub fn address(&self) -> Option<&str> {
        match self {
            Payload::Genesis(_) => None,
            Payload::StarClaim(claim) => Some(&claim.address),
        }
    }

    /// Check if this is the genesis marker.
    pub fn is_genesis(&self) -> bool {
        matches!(self, Payload::Genesis(_))
    }

    /// Serialize to CBOR bytes.
    pub fn encode(&self) -> Result<Bytes, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| CoreError::Encoding(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    /// Deserialize from CBOR bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))
    }
}

impl From<StarClaim> for Payload {
    fn from(claim: StarClaim) -> Self {
        Payload::StarClaim(claim)
    }
}
