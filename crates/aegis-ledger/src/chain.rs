//! Hash chain computation and verification.

use sha2::{Digest, Sha256};

use crate::models::{to_hex, AuditEntry, Hash, Result, GENESIS_HASH};

/// Domain separator, so these hashes can never collide with hashes of
/// other structures that happen to share a byte layout.
const ENTRY_PREFIX: &[u8] = b"aegis-audit-v1";

/// Compute the hash of one entry.
///
/// Covers the sequence number, timestamp, request id, the canonical JSON
/// bytes of the verdict, and the previous entry's hash. Field boundaries
/// are unambiguous because the integer fields are fixed-width and the
/// request id is length-prefixed.
pub fn entry_hash(
    sequence_no: u64,
    timestamp_ms: u64,
    request_id: &str,
    verdict: &serde_json::Value,
    prev_hash: &Hash,
) -> Result<Hash> {
    let verdict_bytes = serde_json::to_vec(verdict)?;

    let mut hasher = Sha256::new();
    hasher.update(ENTRY_PREFIX);
    hasher.update(sequence_no.to_be_bytes());
    hasher.update(timestamp_ms.to_be_bytes());
    hasher.update((request_id.len() as u64).to_be_bytes());
    hasher.update(request_id.as_bytes());
    hasher.update(&verdict_bytes);
    hasher.update(prev_hash);

    Ok(hasher.finalize().into())
}

/// Outcome of verifying a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainVerification {
    /// Every link checks out.
    Intact { length: usize },
    /// The chain breaks at `sequence_no`; `detail` names which invariant
    /// failed.
    Broken { sequence_no: u64, detail: String },
}

impl ChainVerification {
    pub fn is_intact(&self) -> bool {
        matches!(self, ChainVerification::Intact { .. })
    }
}

/// Verify a full chain, in order.
///
/// Checks, per entry: contiguous sequence numbers from 0, `prev_hash`
/// linkage (genesis for the first entry), and the recomputed entry hash.
/// Stops at the first broken link.
pub fn verify_chain(entries: &[AuditEntry]) -> Result<ChainVerification> {
    let mut expected_prev = GENESIS_HASH;

    for (i, entry) in entries.iter().enumerate() {
        if entry.sequence_no != i as u64 {
            return Ok(ChainVerification::Broken {
                sequence_no: entry.sequence_no,
                detail: format!("expected sequence {i}, found {}", entry.sequence_no),
            });
        }

        if entry.prev_hash != expected_prev {
            return Ok(ChainVerification::Broken {
                sequence_no: entry.sequence_no,
                detail: format!(
                    "prev_hash mismatch: expected {}, found {}",
                    to_hex(&expected_prev),
                    to_hex(&entry.prev_hash)
                ),
            });
        }

        let recomputed = entry_hash(
            entry.sequence_no,
            entry.timestamp_ms,
            &entry.request_id,
            &entry.verdict,
            &entry.prev_hash,
        )?;
        if recomputed != entry.entry_hash {
            return Ok(ChainVerification::Broken {
                sequence_no: entry.sequence_no,
                detail: format!(
                    "entry hash mismatch: expected {}, found {}",
                    to_hex(&recomputed),
                    to_hex(&entry.entry_hash)
                ),
            });
        }

        expected_prev = entry.entry_hash;
    }

    Ok(ChainVerification::Intact {
        length: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_chain(n: u64) -> Vec<AuditEntry> {
        let mut entries = Vec::new();
        let mut prev = GENESIS_HASH;
        for seq in 0..n {
            let verdict = json!({"decision": "allowed", "risk_score": seq});
            let hash = entry_hash(seq, 1000 + seq, &format!("req-{seq}"), &verdict, &prev).unwrap();
            entries.push(AuditEntry {
                sequence_no: seq,
                timestamp_ms: 1000 + seq,
                request_id: format!("req-{seq}"),
                verdict,
                prev_hash: prev,
                entry_hash: hash,
            });
            prev = hash;
        }
        entries
    }

    #[test]
    fn test_empty_chain_is_intact() {
        assert_eq!(
            verify_chain(&[]).unwrap(),
            ChainVerification::Intact { length: 0 }
        );
    }

    #[test]
    fn test_valid_chain() {
        let entries = make_chain(5);
        assert_eq!(
            verify_chain(&entries).unwrap(),
            ChainVerification::Intact { length: 5 }
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let verdict = json!({"a": 1, "b": 2});
        let h1 = entry_hash(0, 42, "req", &verdict, &GENESIS_HASH).unwrap();
        let h2 = entry_hash(0, 42, "req", &verdict, &GENESIS_HASH).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_depends_on_every_field() {
        let verdict = json!({"a": 1});
        let base = entry_hash(0, 42, "req", &verdict, &GENESIS_HASH).unwrap();

        assert_ne!(base, entry_hash(1, 42, "req", &verdict, &GENESIS_HASH).unwrap());
        assert_ne!(base, entry_hash(0, 43, "req", &verdict, &GENESIS_HASH).unwrap());
        assert_ne!(base, entry_hash(0, 42, "req2", &verdict, &GENESIS_HASH).unwrap());
        assert_ne!(
            base,
            entry_hash(0, 42, "req", &json!({"a": 2}), &GENESIS_HASH).unwrap()
        );
        assert_ne!(base, entry_hash(0, 42, "req", &verdict, &[1u8; 32]).unwrap());
    }

    #[test]
    fn test_tampered_verdict_detected() {
        let mut entries = make_chain(4);
        entries[1].verdict = json!({"decision": "blocked"});

        match verify_chain(&entries).unwrap() {
            ChainVerification::Broken { sequence_no, .. } => assert_eq!(sequence_no, 1),
            other => panic!("expected broken chain, got {other:?}"),
        }
    }

    #[test]
    fn test_removed_entry_detected() {
        let mut entries = make_chain(4);
        entries.remove(2);

        match verify_chain(&entries).unwrap() {
            ChainVerification::Broken { sequence_no, .. } => assert_eq!(sequence_no, 3),
            other => panic!("expected broken chain, got {other:?}"),
        }
    }

    #[test]
    fn test_reordered_entries_detected() {
        let mut entries = make_chain(4);
        entries.swap(1, 2);
        assert!(!verify_chain(&entries).unwrap().is_intact());
    }

    #[test]
    fn test_first_break_reported() {
        let mut entries = make_chain(6);
        entries[2].timestamp_ms += 1;
        entries[4].timestamp_ms += 1;

        match verify_chain(&entries).unwrap() {
            ChainVerification::Broken { sequence_no, .. } => assert_eq!(sequence_no, 2),
            other => panic!("expected broken chain, got {other:?}"),
        }
    }
}
