//! Fuzzy interpretation of typed or recognized input
//!
//! Everything here is pure: the same normalized input and table always
//! produce the same decision. Input from the recognizer is noisy, so every
//! matcher works on [`normalize`]d text rather than the raw string.

mod answer;
mod faq;
mod menu;

use std::collections::HashSet;

pub use answer::is_correct;
pub use faq::{FAQ_THRESHOLD, FaqEntry, match_faq, score_entry};
pub use menu::{MenuKeywordTable, parse_choice, spoken_number};

/// Lowercase, strip everything but alphanumerics and whitespace, collapse runs
/// of whitespace into single spaces and trim
///
/// Lowercasing runs before the filter: some capitals lowercase into a letter
/// plus a combining mark (`'İ'` becomes `"i\u{307}"`), and the mark must be
/// stripped on the first pass.
#[must_use]
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into words
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Word set of the normalized text
#[must_use]
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
