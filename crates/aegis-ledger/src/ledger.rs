//! The append-only ledger over Sled.

use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::chain::{entry_hash, verify_chain, ChainVerification};
use crate::models::{AuditEntry, Hash, LedgerError, Result, GENESIS_HASH};

/// Tree holding the chain, keyed by big-endian sequence number so Sled's
/// lexicographic iteration yields chain order.
const ENTRY_TREE: &str = "audit_entries";

/// Mutable chain head, guarded by one lock so appends are strictly
/// serialized: each entry's `prev_hash` is fixed before the next append
/// can start.
struct Tail {
    next_sequence: u64,
    prev_hash: Hash,
}

/// Persistent hash-chained audit log.
///
/// # Thread Safety
///
/// Reads go straight to Sled, which is thread-safe. Appends serialize on
/// an internal lock; concurrent appenders each get a distinct sequence
/// number and a correct predecessor hash, in lock-acquisition order.
pub struct AuditLedger {
    db: sled::Db,
    entries: sled::Tree,
    tail: Mutex<Tail>,
}

impl AuditLedger {
    /// Open or create a ledger at `path`.
    ///
    /// Existing entries are replayed to find the chain head, and the whole
    /// chain is verified; a broken chain is reported as
    /// [`LedgerError::Corrupt`] rather than silently extended.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory ledger for tests. Dropped data is lost.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let entries = db.open_tree(ENTRY_TREE)?;

        let existing = Self::read_all(&entries)?;
        match verify_chain(&existing)? {
            ChainVerification::Intact { .. } => {}
            ChainVerification::Broken { sequence_no, detail } => {
                return Err(LedgerError::Corrupt(format!(
                    "chain broken at sequence {sequence_no}: {detail}"
                )));
            }
        }

        let tail = match existing.last() {
            Some(last) => Tail {
                next_sequence: last.sequence_no + 1,
                prev_hash: last.entry_hash,
            },
            None => Tail {
                next_sequence: 0,
                prev_hash: GENESIS_HASH,
            },
        };

        Ok(Self {
            db,
            entries,
            tail: Mutex::new(tail),
        })
    }

    /// Append one verdict, returning the stored entry.
    pub fn append(&self, request_id: &str, verdict: serde_json::Value) -> Result<AuditEntry> {
        let timestamp_ms = unix_millis();

        let mut tail = self
            .tail
            .lock()
            .map_err(|_| LedgerError::Corrupt("ledger writer lock poisoned".to_string()))?;

        let sequence_no = tail.next_sequence;
        let prev_hash = tail.prev_hash;
        let hash = entry_hash(sequence_no, timestamp_ms, request_id, &verdict, &prev_hash)?;

        let entry = AuditEntry {
            sequence_no,
            timestamp_ms,
            request_id: request_id.to_string(),
            verdict,
            prev_hash,
            entry_hash: hash,
        };

        let bytes = serde_json::to_vec(&entry)?;
        self.entries.insert(sequence_no.to_be_bytes(), bytes)?;

        tail.next_sequence = sequence_no + 1;
        tail.prev_hash = hash;

        Ok(entry)
    }

    /// All entries, in chain order.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        Self::read_all(&self.entries)
    }

    /// The entry at `sequence_no`, if present.
    pub fn entry(&self, sequence_no: u64) -> Result<Option<AuditEntry>> {
        match self.entries.get(sequence_no.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Re-verify the persisted chain.
    pub fn verify(&self) -> Result<ChainVerification> {
        verify_chain(&self.entries()?)
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the newest entry, or genesis when empty.
    pub fn head_hash(&self) -> Result<Hash> {
        let tail = self
            .tail
            .lock()
            .map_err(|_| LedgerError::Corrupt("ledger writer lock poisoned".to_string()))?;
        Ok(tail.prev_hash)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    fn read_all(tree: &sled::Tree) -> Result<Vec<AuditEntry>> {
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for AuditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLedger")
            .field("entries", &self.len())
            .finish()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
