//! Proptest generators for property-based testing.

use proptest::prelude::*;

use starledger_core::{Block, BlockHash, Keypair, Payload, Star, StarClaim};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random BlockHash.
pub fn block_hash() -> impl Strategy<Value = BlockHash> {
    any::<[u8; 32]>().prop_map(BlockHash::from_bytes)
}

/// Generate a timestamp in seconds, including pre-epoch values.
pub fn timestamp() -> impl Strategy<Value = i64> {
    -4_000_000_000i64..=4_000_000_000i64
}

/// Generate payload bytes of specified max length.
pub fn payload_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Free text: any printable Unicode, possibly empty.
pub fn text() -> impl Strategy<Value = String> {
    "\\PC{0,48}"
}

/// Generate star metadata, with empty and non-ASCII values.
pub fn star() -> impl Strategy<Value = Star> {
    (
        text(),
        text(),
        text(),
        proptest::option::of(text()),
        proptest::option::of(text()),
    )
        .prop_map(|(ra, dec, story, magnitude, constellation)| Star {
            ra,
            dec,
            story,
            magnitude,
            constellation,
        })
}

/// Generate a claim whose signature and message are well-formed for its keypair.
pub fn star_claim() -> impl Strategy<Value = StarClaim> {
    (keypair(), 0i64..=4_000_000_000i64, star()).prop_map(|(keypair, issued_at, star)| {
        let address = keypair.address();
        let message = format!("{address}:{issued_at}:starRegistry");
        StarClaim {
            signature: keypair.sign_message(&message),
            address,
            message,
            star,
        }
    })
}

/// Generate either payload shape.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        1 => Just(Payload::genesis()),
        9 => star_claim().prop_map(Payload::StarClaim),
    ]
}

/// Parameters for sealing a block.
#[derive(Debug, Clone)]
pub struct BlockParams {
    pub height: u64,
    pub previous_hash: BlockHash,
    pub timestamp: i64,
    pub payload: Vec<u8>,
}

impl Arbitrary for BlockParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (any::<u64>(), block_hash(), timestamp(), payload_bytes(512))
            .prop_map(|(height, previous_hash, timestamp, payload)| BlockParams {
                height,
                previous_hash,
                timestamp,
                payload,
            })
            .boxed()
    }
}

/// Seal a block from parameters.
pub fn block_from_params(params: &BlockParams) -> Block {
    Block::seal(
        params.payload.clone(),
        params.height,
        params.previous_hash,
        params.timestamp,
    )
}
