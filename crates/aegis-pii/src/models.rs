//! Category registry and result types for PII handling.

use serde::{Deserialize, Serialize};

/// The categories of sensitive data the detector recognizes.
///
/// The set is open-ended by design (new categories are added here as rules
/// grow) but enumerable: every variant carries its own label, redact tag,
/// base confidence, and risk weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    // Auth secrets
    PrivateKey,
    JwtToken,
    ApiKey,
    AccessToken,
    Password,
    // Infrastructure
    DbUrl,
    // Financial
    CreditCard,
    Iban,
    Cvv,
    BankAccount,
    // Personal identifiers
    Email,
    Ssn,
    Aadhaar,
    Phone,
    // Confidential
    IpAddress,
}

impl PiiCategory {
    /// All categories in detection priority order: most specific first so a
    /// JWT is never reported as a generic token and a card number is never
    /// reported as a phone number.
    pub const DETECTION_ORDER: [PiiCategory; 15] = [
        PiiCategory::PrivateKey,
        PiiCategory::JwtToken,
        PiiCategory::ApiKey,
        PiiCategory::AccessToken,
        PiiCategory::Password,
        PiiCategory::DbUrl,
        PiiCategory::CreditCard,
        PiiCategory::Iban,
        PiiCategory::Cvv,
        PiiCategory::BankAccount,
        PiiCategory::Email,
        PiiCategory::Ssn,
        PiiCategory::Aadhaar,
        PiiCategory::Phone,
        PiiCategory::IpAddress,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PiiCategory::PrivateKey => "Private Key",
            PiiCategory::JwtToken => "JWT Token",
            PiiCategory::ApiKey => "API Key",
            PiiCategory::AccessToken => "Access Token",
            PiiCategory::Password => "Password",
            PiiCategory::DbUrl => "Database URL",
            PiiCategory::CreditCard => "Credit Card Number",
            PiiCategory::Iban => "IBAN",
            PiiCategory::Cvv => "CVV Code",
            PiiCategory::BankAccount => "Bank Account Number",
            PiiCategory::Email => "Email Address",
            PiiCategory::Ssn => "Social Security Number",
            PiiCategory::Aadhaar => "Aadhaar Number",
            PiiCategory::Phone => "Phone Number",
            PiiCategory::IpAddress => "IP Address",
        }
    }

    /// The fixed placeholder used in redact mode. Fixed per category, so
    /// redacted output length never depends on the secret's length.
    pub fn redact_tag(&self) -> &'static str {
        match self {
            PiiCategory::PrivateKey => "[REDACTED_PRIVATE_KEY]",
            PiiCategory::JwtToken => "[REDACTED_JWT]",
            PiiCategory::ApiKey => "[REDACTED_API_KEY]",
            PiiCategory::AccessToken => "[REDACTED_TOKEN]",
            PiiCategory::Password => "[REDACTED_PASSWORD]",
            PiiCategory::DbUrl => "[REDACTED_DB_URL]",
            PiiCategory::CreditCard => "[REDACTED_CREDIT_CARD]",
            PiiCategory::Iban => "[REDACTED_IBAN]",
            PiiCategory::Cvv => "[REDACTED_CVV]",
            PiiCategory::BankAccount => "[REDACTED_BANK_ACCT]",
            PiiCategory::Email => "[REDACTED_EMAIL]",
            PiiCategory::Ssn => "[REDACTED_SSN]",
            PiiCategory::Aadhaar => "[REDACTED_AADHAAR]",
            PiiCategory::Phone => "[REDACTED_PHONE]",
            PiiCategory::IpAddress => "[REDACTED_IP]",
        }
    }

    /// Base detection confidence assigned when the pattern (and validator,
    /// where one exists) matches.
    pub fn base_confidence(&self) -> f64 {
        match self {
            PiiCategory::PrivateKey => 0.97,
            PiiCategory::JwtToken => 0.95,
            PiiCategory::ApiKey => 0.90,
            PiiCategory::AccessToken => 0.88,
            PiiCategory::Password => 0.80,
            PiiCategory::DbUrl => 0.92,
            PiiCategory::CreditCard => 0.98,
            PiiCategory::Iban => 0.88,
            PiiCategory::Cvv => 0.70,
            PiiCategory::BankAccount => 0.75,
            PiiCategory::Email => 0.95,
            PiiCategory::Ssn => 0.92,
            PiiCategory::Aadhaar => 0.90,
            PiiCategory::Phone => 0.85,
            PiiCategory::IpAddress => 0.85,
        }
    }

    /// Weight this category contributes to the aggregate risk score.
    pub fn risk_weight(&self) -> u8 {
        match self {
            PiiCategory::PrivateKey
            | PiiCategory::JwtToken
            | PiiCategory::ApiKey
            | PiiCategory::AccessToken
            | PiiCategory::Password
            | PiiCategory::DbUrl
            | PiiCategory::CreditCard
            | PiiCategory::Cvv
            | PiiCategory::Ssn
            | PiiCategory::Aadhaar => 10,
            PiiCategory::Iban
            | PiiCategory::BankAccount
            | PiiCategory::Email
            | PiiCategory::Phone => 7,
            PiiCategory::IpAddress => 4,
        }
    }

    /// True for authentication secrets. A secret-category match in a model
    /// response forces the response-filtered flag on the verdict.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            PiiCategory::PrivateKey
                | PiiCategory::JwtToken
                | PiiCategory::ApiKey
                | PiiCategory::AccessToken
                | PiiCategory::Password
        )
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiCategory::PrivateKey => "private_key",
            PiiCategory::JwtToken => "jwt_token",
            PiiCategory::ApiKey => "api_key",
            PiiCategory::AccessToken => "access_token",
            PiiCategory::Password => "password",
            PiiCategory::DbUrl => "db_url",
            PiiCategory::CreditCard => "credit_card",
            PiiCategory::Iban => "iban",
            PiiCategory::Cvv => "cvv",
            PiiCategory::BankAccount => "bank_account",
            PiiCategory::Email => "email",
            PiiCategory::Ssn => "ssn",
            PiiCategory::Aadhaar => "aadhaar",
            PiiCategory::Phone => "phone",
            PiiCategory::IpAddress => "ip_address",
        }
    }
}

impl std::fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected sensitive span.
///
/// Offsets are byte indices into the original text. Within one detection
/// result, spans never overlap and are ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiMatch {
    pub category: PiiCategory,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// Operating mode for the sanitizer and the response guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizeMode {
    /// Record matches without altering the text.
    Detect,
    /// Partially obscure each span, keeping non-sensitive context.
    Mask,
    /// Replace each span with its category's fixed placeholder tag.
    Redact,
}

impl std::str::FromStr for SanitizeMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detect" => Ok(SanitizeMode::Detect),
            "mask" => Ok(SanitizeMode::Mask),
            "redact" => Ok(SanitizeMode::Redact),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Error returned when parsing a sanitize mode from a string.
#[derive(Debug, thiserror::Error)]
#[error("unknown sanitize mode: {0} (expected detect, mask, or redact)")]
pub struct UnknownMode(pub String);

/// Result of one sanitization pass.
///
/// The original text is deliberately absent: it is needed only transiently
/// for scoring and must never travel with the sanitized output. Only its
/// length is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizeOutcome {
    /// The transformed text (identical to the input in detect mode).
    pub text: String,
    /// All detected spans, non-overlapping, left to right.
    pub matches: Vec<PiiMatch>,
    /// The mode the transform ran under.
    pub mode: SanitizeMode,
    /// Byte length of the original input.
    pub original_length: usize,
    /// Byte length of the transformed text.
    pub sanitized_length: usize,
}

impl SanitizeOutcome {
    /// Project the verdict-facing summary.
    pub fn summary(&self) -> PiiSummary {
        let mut types: Vec<String> = Vec::new();
        for m in &self.matches {
            let name = m.category.as_str().to_string();
            if !types.contains(&name) {
                types.push(name);
            }
        }
        PiiSummary {
            detected: !self.matches.is_empty(),
            count: self.matches.len(),
            types,
            original_length: self.original_length,
            sanitized_length: self.sanitized_length,
        }
    }
}

/// The PII block of the security verdict. Field set is part of the stable
/// verdict schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiSummary {
    pub detected: bool,
    pub count: usize,
    pub types: Vec<String>,
    pub original_length: usize,
    pub sanitized_length: usize,
}

impl PiiSummary {
    /// Summary for text that was never scanned (e.g. a short-circuited
    /// request).
    pub fn empty(original_length: usize) -> Self {
        Self {
            detected: false,
            count: 0,
            types: Vec::new(),
            original_length,
            sanitized_length: original_length,
        }
    }
}
