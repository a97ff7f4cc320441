//! # Aegis Audit Ledger
//!
//! Tamper-evident audit logging for the gateway. Every security verdict is
//! appended as an entry whose hash covers the entry's own fields plus the
//! hash of the entry before it, forming a chain back to a fixed genesis
//! value. Rewriting or removing any historical entry breaks every hash
//! after it.
//!
//! ## Threat Model
//!
//! The ledger defends against:
//!
//! - **Silent tampering**: editing a stored entry invalidates its own hash.
//! - **Truncation and splicing**: each entry commits to its predecessor, so
//!   removing or reordering entries breaks the chain.
//! - **Loss on restart**: entries are persisted in an embedded Sled
//!   database and the chain is re-verified on open.
//!
//! What it does not defend against: an attacker who can rewrite the whole
//! database and recompute every hash. Anchoring the head hash externally is
//! out of scope here.
//!
//! ## Structure
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`AuditEntry`] | One verdict, its sequence number, and both hashes |
//! | [`chain`] | Hash computation and whole-chain verification |
//! | [`AuditLedger`] | Single-writer append log over Sled |

pub mod chain;
pub mod ledger;
pub mod models;

pub use chain::{verify_chain, ChainVerification};
pub use ledger::AuditLedger;
pub use models::{to_hex, AuditEntry, Hash, LedgerError, Result, GENESIS_HASH, HASH_SIZE};
