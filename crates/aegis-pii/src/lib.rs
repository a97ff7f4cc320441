//! # Aegis PII - Sensitive Data Detection and Sanitization
//!
//! This crate finds sensitive data in text and transforms it under one of
//! three runtime-selected modes. It serves two call sites in the gateway
//! pipeline: the prompt-side **PIISanitizer** and the response-side
//! **ResponseGuard**, which share one detector and one transform vocabulary
//! so the two can never drift apart.
//!
//! ## Detection
//!
//! Detection is pattern-based with per-category checksum and structural
//! validators to cut false positives:
//!
//! | Category | Pattern | Validator |
//! |----------|---------|-----------|
//! | Credit card | IIN-prefixed digit groups | Luhn mod-10 + network prefix |
//! | Aadhaar | 12-digit groups | Verhoeff checksum |
//! | SSN | 3-2-4 digit groups | Area/group/serial range rules |
//! | IPv4 | Dotted quad | Octet range 0-255 |
//! | Email | RFC-ish local@domain | Structural re-check |
//! | Phone | Digit groups | Digit count |
//!
//! Auth secrets (private keys, JWTs, key/value credentials, database URLs)
//! are scanned first; financial and personal identifiers follow. A span
//! already claimed by a higher-priority category is never reported twice,
//! and the final match list is non-overlapping and ordered left to right.
//!
//! ## Transform Modes
//!
//! - [`SanitizeMode::Detect`] - report matches, leave the text untouched.
//! - [`SanitizeMode::Mask`] - partial masking that keeps non-sensitive
//!   context: `john.doe@email.com` becomes `j***@email.com`,
//!   `4111111111111111` becomes `**** **** **** 1111`.
//! - [`SanitizeMode::Redact`] - the whole span is replaced with a fixed
//!   category tag such as `[REDACTED_EMAIL]`, so output length is
//!   independent of the secret's length.
//!
//! Replacement is a single left-to-right pass over the original offsets;
//! earlier replacements never shift spans that have not been processed yet.
//!
//! ## Usage
//!
//! ```rust
//! use aegis_pii::{PiiSanitizer, SanitizeMode};
//!
//! let sanitizer = PiiSanitizer::new();
//! let out = sanitizer.sanitize("reach me at jane@corp.example", SanitizeMode::Mask);
//! assert_eq!(out.text, "reach me at j***@corp.example");
//! assert_eq!(out.matches.len(), 1);
//! ```

pub mod detector;
pub mod guard;
pub mod models;
pub mod sanitizer;
pub mod validators;

pub use detector::PiiDetector;
pub use guard::{GuardOutcome, ResponseGuard};
pub use models::{PiiCategory, PiiMatch, PiiSummary, SanitizeMode, SanitizeOutcome};
pub use sanitizer::PiiSanitizer;
