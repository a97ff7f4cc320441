//! Text transformation over detected spans.
//!
//! Masking keeps enough context to stay useful downstream (last four card
//! digits, the email domain); redaction replaces each span with its
//! category's fixed placeholder. Both are single left-to-right passes over
//! the original byte offsets, so replacement lengths never shift later
//! spans.

use crate::detector::PiiDetector;
use crate::models::{PiiCategory, PiiMatch, SanitizeMode, SanitizeOutcome};

/// Detection plus replacement in one component.
///
/// Construction compiles the full pattern set once; `sanitize` itself is
/// read-only and shareable across requests.
pub struct PiiSanitizer {
    detector: PiiDetector,
}

impl PiiSanitizer {
    pub fn new() -> Self {
        Self {
            detector: PiiDetector::new(),
        }
    }

    /// Detect without transforming.
    pub fn detect(&self, text: &str) -> Vec<PiiMatch> {
        self.detector.detect(text)
    }

    /// Run one sanitization pass over `text` in the given mode.
    pub fn sanitize(&self, text: &str, mode: SanitizeMode) -> SanitizeOutcome {
        let matches = self.detector.detect(text);
        let sanitized = match mode {
            SanitizeMode::Detect => text.to_string(),
            SanitizeMode::Mask | SanitizeMode::Redact => replace_spans(text, &matches, mode),
        };

        SanitizeOutcome {
            sanitized_length: sanitized.len(),
            text: sanitized,
            matches,
            mode,
            original_length: text.len(),
        }
    }
}

impl Default for PiiSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble the output in one pass. `matches` is non-overlapping and sorted
/// by start, which the detector guarantees. Shared with the response guard.
pub(crate) fn replace_spans(text: &str, matches: &[PiiMatch], mode: SanitizeMode) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for m in matches {
        out.push_str(&text[cursor..m.start]);
        let value = &text[m.start..m.end];
        match mode {
            SanitizeMode::Redact => out.push_str(m.category.redact_tag()),
            _ => out.push_str(&mask_value(m.category, value)),
        }
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Category-specific partial mask.
fn mask_value(category: PiiCategory, value: &str) -> String {
    match category {
        PiiCategory::Email => mask_email(value),
        PiiCategory::CreditCard => mask_card(value),
        PiiCategory::Phone => mask_digits_keep_last(value, 4),
        PiiCategory::Ssn => format!("***-**-{}", last_digits(value, 4)),
        PiiCategory::Aadhaar => format!("**** **** {}", last_digits(value, 4)),
        PiiCategory::IpAddress => mask_ip(value),
        PiiCategory::JwtToken | PiiCategory::ApiKey | PiiCategory::AccessToken => {
            mask_token(value)
        }
        PiiCategory::PrivateKey => "[MASKED_PRIVATE_KEY]".to_string(),
        PiiCategory::DbUrl => mask_db_url(value),
        PiiCategory::Password => "********".to_string(),
        PiiCategory::Cvv => "***".to_string(),
        PiiCategory::BankAccount => format!("****{}", last_digits(value, 4)),
        PiiCategory::Iban => mask_generic(value),
    }
}

/// `john.doe@email.com` -> `j***@email.com`
fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => mask_generic(value),
    }
}

/// `4111111111111111` -> `**** **** **** 1111`
fn mask_card(value: &str) -> String {
    format!("**** **** **** {}", last_digits(value, 4))
}

/// Star every digit except the trailing `keep`, preserving separators.
fn mask_digits_keep_last(value: &str, keep: usize) -> String {
    let digit_count = value.chars().filter(|c| c.is_ascii_digit()).count();
    let starred = digit_count.saturating_sub(keep);
    let mut seen = 0usize;
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen <= starred {
                    '*'
                } else {
                    c
                }
            } else {
                c
            }
        })
        .collect()
}

/// `192.168.1.100` -> `192.168.*.*`
fn mask_ip(value: &str) -> String {
    let octets: Vec<&str> = value.split('.').collect();
    if octets.len() == 4 {
        format!("{}.{}.*.*", octets[0], octets[1])
    } else {
        mask_generic(value)
    }
}

/// Keep four characters at each end: `eyJhb...Qssw5c` style.
fn mask_token(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "*".repeat(chars.len())
    }
}

/// `postgres://user:pw@host/db` -> `postgres://***`
fn mask_db_url(value: &str) -> String {
    match value.split_once("://") {
        Some((scheme, _)) => format!("{scheme}://***"),
        None => mask_generic(value),
    }
}

/// First and last character kept, everything between starred.
fn mask_generic(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 | 2 => "*".repeat(chars.len()),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    }
}

fn last_digits(value: &str, n: usize) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= n {
        digits.into_iter().collect()
    } else {
        digits[digits.len() - n..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("My email is john.doe@email.com", SanitizeMode::Mask);
        assert_eq!(out.text, "My email is j***@email.com");
    }

    #[test]
    fn test_mask_credit_card() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("card: 4111111111111111", SanitizeMode::Mask);
        assert_eq!(out.text, "card: **** **** **** 1111");
    }

    #[test]
    fn test_mask_both_scenario() {
        let s = PiiSanitizer::new();
        let out = s.sanitize(
            "My email is john.doe@email.com and my card is 4111111111111111",
            SanitizeMode::Mask,
        );
        assert_eq!(
            out.text,
            "My email is j***@email.com and my card is **** **** **** 1111"
        );
        assert_eq!(out.matches.len(), 2);
        let summary = out.summary();
        assert!(summary.detected);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.types, vec!["email", "credit_card"]);
    }

    #[test]
    fn test_redact_mode() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("reach me at john.doe@email.com", SanitizeMode::Redact);
        assert_eq!(out.text, "reach me at [REDACTED_EMAIL]");
    }

    #[test]
    fn test_detect_mode_leaves_text_untouched() {
        let s = PiiSanitizer::new();
        let text = "ssn 123-45-6789";
        let out = s.sanitize(text, SanitizeMode::Detect);
        assert_eq!(out.text, text);
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.original_length, out.sanitized_length);
    }

    #[test]
    fn test_mask_ssn() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("ssn is 123-45-6789", SanitizeMode::Mask);
        assert_eq!(out.text, "ssn is ***-**-6789");
    }

    #[test]
    fn test_mask_phone_keeps_separators() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("call +1-555-123-4567 now", SanitizeMode::Mask);
        assert_eq!(out.text, "call +*-***-***-4567 now");
    }

    #[test]
    fn test_mask_ip() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("host 192.168.1.100 down", SanitizeMode::Mask);
        assert_eq!(out.text, "host 192.168.*.* down");
    }

    #[test]
    fn test_mask_db_url() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("use postgres://u:p@db:5432/prod", SanitizeMode::Mask);
        assert_eq!(out.text, "use postgres://***");
    }

    #[test]
    fn test_mask_password() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("password: hunter2secret", SanitizeMode::Mask);
        assert_eq!(out.text, "password: ********");
    }

    #[test]
    fn test_lengths_recorded() {
        let s = PiiSanitizer::new();
        let text = "reach me at john.doe@email.com";
        let out = s.sanitize(text, SanitizeMode::Redact);
        assert_eq!(out.original_length, text.len());
        assert_eq!(out.sanitized_length, out.text.len());
        assert_ne!(out.original_length, out.sanitized_length);
    }

    #[test]
    fn test_mask_is_idempotent() {
        let s = PiiSanitizer::new();
        let first = s.sanitize(
            "john.doe@email.com, card 4111111111111111, ssn 123-45-6789",
            SanitizeMode::Mask,
        );
        let second = s.sanitize(&first.text, SanitizeMode::Mask);
        assert_eq!(second.text, first.text);
        assert!(second.matches.is_empty());
    }

    #[test]
    fn test_redact_is_idempotent() {
        let s = PiiSanitizer::new();
        let first = s.sanitize("mail john.doe@email.com now", SanitizeMode::Redact);
        let second = s.sanitize(&first.text, SanitizeMode::Redact);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_clean_text_passthrough() {
        let s = PiiSanitizer::new();
        let out = s.sanitize("nothing sensitive here", SanitizeMode::Mask);
        assert_eq!(out.text, "nothing sensitive here");
        assert!(out.matches.is_empty());
        assert!(!out.summary().detected);
    }
}
