//! crates/es_io/src/digest.rs
//!
//! SHA-256 fingerprints for report artifacts. Digests are lowercase hex.
//! Use `sha256_canonical` for JSON values (goes through canonical_json) and
//! `sha256_hex` for raw bytes.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_json_bytes;
use crate::IoResult;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Digest of the canonical encoding, so key order never changes the result.
pub fn sha256_canonical(v: &Value) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_json_bytes(v)?))
}
