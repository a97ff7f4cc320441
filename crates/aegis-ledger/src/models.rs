//! Ledger data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SHA-256 digest size in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte SHA-256 hash value.
pub type Hash = [u8; HASH_SIZE];

/// The `prev_hash` of the first entry in every chain.
pub const GENESIS_HASH: Hash = [0u8; HASH_SIZE];

/// Lowercase hex rendering of a hash, for logs and CLI output.
pub fn to_hex(hash: &Hash) -> String {
    let mut s = String::with_capacity(HASH_SIZE * 2);
    for byte in hash {
        s.push_str(&format!("{byte:02x}"));
    }
    s
}

/// One audit record.
///
/// The verdict payload is stored as a JSON value; hashing serializes it
/// with `serde_json`, whose object maps keep keys sorted, so the byte
/// stream is deterministic for a given value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the chain, starting at 0.
    pub sequence_no: u64,
    /// Unix epoch milliseconds at append time.
    pub timestamp_ms: u64,
    /// The request this verdict belongs to.
    pub request_id: String,
    /// The full security verdict, as serialized by the gateway.
    pub verdict: serde_json::Value,
    /// Hash of the previous entry ([`GENESIS_HASH`] for the first).
    pub prev_hash: Hash,
    /// Hash over this entry's fields and `prev_hash`.
    pub entry_hash: Hash,
}

/// Errors from the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Sled database operation failed.
    #[error("ledger database error: {0}")]
    Database(#[from] sled::Error),

    /// Entry (de)serialization failed.
    #[error("ledger serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data violates the chain's invariants.
    #[error("ledger corrupt: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
