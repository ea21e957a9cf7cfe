//! Keyword-overlap FAQ lookup

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{normalize, token_set};

/// Minimum score an entry needs before its response is returned
///
/// A single substring hit scores 1, which is too weak on its own: keyword
/// fragments show up inside unrelated words.
pub const FAQ_THRESHOLD: u32 = 2;

/// One fact in the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FaqEntry {
    /// Keyword phrases (single words or short multi-word phrases)
    pub keywords: Vec<String>,

    /// Response spoken when this entry wins
    pub response: String,
}

/// Score one entry against a question
///
/// Each keyword phrase scores 2 when all of its words appear in the question,
/// otherwise 1 when the raw phrase appears inside the normalized question.
#[must_use]
pub fn score_entry(
    entry: &FaqEntry,
    question_norm: &str,
    question_tokens: &HashSet<String>,
) -> u32 {
    entry
        .keywords
        .iter()
        .map(|keyword| {
            let keyword_tokens = token_set(keyword);
            if keyword_tokens.is_subset(question_tokens) {
                2
            } else if question_norm.contains(keyword.as_str()) {
                1
            } else {
                0
            }
        })
        .sum()
}

/// Find the best FAQ response for a question
///
/// Entries are scored in table order and only a strictly higher score
/// replaces the current best, so earlier entries win ties. Returns `None`
/// when the best score is below [`FAQ_THRESHOLD`].
#[must_use]
pub fn match_faq<'a>(question: &str, entries: &'a [FaqEntry]) -> Option<&'a str> {
    let question_norm = normalize(question);
    let question_tokens = token_set(question);

    let mut best: Option<&FaqEntry> = None;
    let mut best_score = 0;

    for entry in entries {
        let score = score_entry(entry, &question_norm, &question_tokens);
        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    tracing::trace!(best_score, "faq lookup scored");

    best.filter(|_| best_score >= FAQ_THRESHOLD)
        .map(|entry| entry.response.as_str())
}
