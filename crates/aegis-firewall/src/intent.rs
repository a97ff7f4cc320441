//! Intent classification.
//!
//! Labels a prompt with one of the closed [`IntentLabel`] variants using
//! per-label keyword vocabularies. Classification is a pure function of the
//! input text: no randomness, no hidden state.

use crate::models::IntentLabel;

/// Minimum aggregate vocabulary weight required to assign a label.
const MIN_MATCH_WEIGHT: f64 = 0.5;

/// A weighted phrase vocabulary for one intent label.
struct Vocabulary {
    label: IntentLabel,
    phrases: &'static [(&'static str, f64)],
}

const CHAT_PHRASES: &[(&str, f64)] = &[
    ("hello", 0.8),
    ("hi ", 0.6),
    ("hey", 0.6),
    ("how are you", 0.8),
    ("thank you", 0.6),
    ("thanks", 0.5),
    ("tell me about", 0.6),
    ("what do you think", 0.6),
    ("chat", 0.5),
    ("talk to me", 0.6),
];

const SUMMARIZE_PHRASES: &[(&str, f64)] = &[
    ("summarize", 0.9),
    ("summary", 0.8),
    ("tl;dr", 0.9),
    ("tldr", 0.8),
    ("condense", 0.7),
    ("shorten", 0.6),
    ("key points", 0.7),
    ("brief overview", 0.7),
    ("in a few sentences", 0.6),
];

const TOOL_PHRASES: &[(&str, f64)] = &[
    ("run the", 0.7),
    ("execute", 0.8),
    ("invoke", 0.8),
    ("call the", 0.6),
    ("use the tool", 0.9),
    ("search for", 0.6),
    ("look up", 0.6),
    ("calculate", 0.7),
    ("fetch", 0.6),
    ("query the", 0.7),
];

const ADMIN_PHRASES: &[(&str, f64)] = &[
    ("password", 0.8),
    ("credential", 0.8),
    ("api key", 0.7),
    ("all users", 0.8),
    ("user accounts", 0.8),
    ("delete user", 0.9),
    ("grant access", 0.9),
    ("revoke access", 0.9),
    ("admin", 0.7),
    ("system settings", 0.8),
    ("audit trail", 0.7),
    ("show me all", 0.6),
];

/// Keyword-based intent classifier.
///
/// Vocabularies are scanned in [`IntentLabel::ALL`] order; the label with the
/// strictly highest aggregate weight wins, so ties resolve to the earliest
/// label and identical input always yields an identical label.
pub struct IntentClassifier {
    vocabularies: Vec<Vocabulary>,
    min_weight: f64,
}

impl IntentClassifier {
    /// Create a classifier with the built-in vocabularies.
    pub fn new() -> Self {
        Self {
            vocabularies: vec![
                Vocabulary {
                    label: IntentLabel::Chat,
                    phrases: CHAT_PHRASES,
                },
                Vocabulary {
                    label: IntentLabel::Summarize,
                    phrases: SUMMARIZE_PHRASES,
                },
                Vocabulary {
                    label: IntentLabel::Tool,
                    phrases: TOOL_PHRASES,
                },
                Vocabulary {
                    label: IntentLabel::Admin,
                    phrases: ADMIN_PHRASES,
                },
            ],
            min_weight: MIN_MATCH_WEIGHT,
        }
    }

    /// Label the prompt's intent.
    pub fn classify(&self, prompt_text: &str) -> IntentLabel {
        let text = prompt_text.to_lowercase();

        let mut best = IntentLabel::Unknown;
        let mut best_weight = 0.0_f64;

        for vocab in &self.vocabularies {
            let weight: f64 = vocab
                .phrases
                .iter()
                .filter(|(phrase, _)| text.contains(phrase))
                .map(|(_, w)| w)
                .sum();

            if weight > best_weight {
                best_weight = weight;
                best = vocab.label;
            }
        }

        if best_weight < self.min_weight {
            IntentLabel::Unknown
        } else {
            best
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
