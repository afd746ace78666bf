//! Canonical CBOR encoding of block headers.
//!
//! The block hash is Blake3 over these bytes, so the encoding is the
//! integrity format of the whole ledger and must never change:
//! - A map with four integer keys, sorted by encoded bytes
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Timestamps are i64 seconds, never floats
//!
//! Any change to key assignment or encoding rules changes every hash in
//! every existing chain.

use crate::types::BlockHash;

/// Header field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const HEIGHT: u64 = 0;
    pub const PREVIOUS_HASH: u64 = 1;
    pub const TIMESTAMP: u64 = 2;
    pub const PAYLOAD: u64 = 3;
}

/// A header value. Only the shapes the header actually uses.
enum Field<'a> {
    Unsigned(u64),
    Signed(i64),
    Bytes(&'a [u8]),
}

/// Encode the hashed fields of a block to canonical CBOR bytes.
///
/// The block's own hash is never part of its input.
pub fn canonical_header_bytes(
    height: u64,
    previous_hash: &BlockHash,
    timestamp: i64,
    payload: &[u8],
) -> Vec<u8> {
    let entries = [
        (keys::HEIGHT, Field::Unsigned(height)),
        (keys::PREVIOUS_HASH, Field::Bytes(previous_hash.as_bytes())),
        (keys::TIMESTAMP, Field::Signed(timestamp)),
        (keys::PAYLOAD, Field::Bytes(payload)),
    ];

    let mut buf = Vec::with_capacity(payload.len() + 64);
    encode_map_canonical(&mut buf, &entries);
    buf
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(u64, Field<'_>)]) {
    let mut pairs: Vec<(Vec<u8>, &Field<'_>)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_uint(&mut key_buf, 0, *k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_field(buf, value);
    }
}

fn encode_field(buf: &mut Vec<u8>, field: &Field<'_>) {
    match field {
        Field::Unsigned(n) => encode_uint(buf, 0, *n),
        Field::Signed(n) => encode_int(buf, *n),
        Field::Bytes(b) => encode_bytes(buf, b),
    }
}

/// Encode a signed integer (major types 0 and 1).
fn encode_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n as i128) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}
