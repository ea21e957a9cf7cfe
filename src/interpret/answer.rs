//! Free-text answer matching

use super::{normalize, token_set};

/// Check whether the user's answer matches any accepted phrasing
///
/// A phrasing matches when its normalized form appears inside the normalized
/// answer, or when every one of its words appears somewhere in the answer.
/// Empty phrasings never match.
#[must_use]
pub fn is_correct<S: AsRef<str>>(user_text: &str, accepted_answers: &[S]) -> bool {
    let user_norm = normalize(user_text);
    let user_tokens = token_set(user_text);

    accepted_answers.iter().any(|answer| {
        let answer_norm = normalize(answer.as_ref());
        if !answer_norm.is_empty() && user_norm.contains(&answer_norm) {
            return true;
        }

        let answer_tokens = token_set(answer.as_ref());
        !answer_tokens.is_empty() && answer_tokens.is_subset(&user_tokens)
    })
}
