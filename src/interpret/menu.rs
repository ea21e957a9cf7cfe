//! Menu-choice resolution for typed and spoken input

use serde::{Deserialize, Serialize};

use super::normalize;

/// Spoken number words and the digits they stand for
///
/// The flag marks homophones the recognizer produces for small numbers
/// ("won" for "one", "for" for "four"). Those are ordinary English words too.
const SPOKEN_NUMBERS: &[(&str, &str, bool)] = &[
    ("one", "1", false),
    ("won", "1", true),
    ("want", "1", true),
    ("two", "2", false),
    ("to", "2", true),
    ("too", "2", true),
    ("three", "3", false),
    ("tree", "3", true),
    ("free", "3", true),
    ("four", "4", false),
    ("for", "4", true),
    ("fore", "4", true),
    ("five", "5", false),
    ("six", "6", false),
    ("sex", "6", true),
    ("sits", "6", true),
];

/// Homophones only count as numbers in utterances at most this many words long
const HOMOPHONE_MAX_WORDS: usize = 2;

/// Ordered mapping from normalized phrase to choice token
///
/// Order matters: the keyword tier returns the first phrase found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MenuKeywordTable {
    entries: Vec<(String, String)>,
}

impl MenuKeywordTable {
    /// Build a table from `(phrase, token)` pairs
    #[must_use]
    pub fn new<P, T>(entries: impl IntoIterator<Item = (P, T)>) -> Self
    where
        P: Into<String>,
        T: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(p, t)| (p.into(), t.into()))
                .collect(),
        }
    }

    /// Iterate `(phrase, token)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    /// Iterate the distinct choice tokens
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, t)| t.as_str())
    }

    /// Look up a token value in the table
    #[must_use]
    pub fn token(&self, value: &str) -> Option<&str> {
        self.tokens().find(|t| *t == value)
    }

    /// Number of phrases
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no phrases
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map one word to a digit through the spoken-number lexicon
///
/// Homophones are only honored when `allow_homophones` is set.
#[must_use]
pub fn spoken_number(word: &str, allow_homophones: bool) -> Option<&'static str> {
    SPOKEN_NUMBERS
        .iter()
        .find(|(w, _, homophone)| *w == word && (allow_homophones || !homophone))
        .map(|(_, digit, _)| *digit)
}

/// Resolve raw input to a choice token from the table
///
/// Tries, in order: the whole input equal to a token ("1"), a spoken number
/// word naming a valid token ("won"), then the first phrase contained in the
/// input ("ask a question").
#[must_use]
pub fn parse_choice<'a>(raw: &str, table: &'a MenuKeywordTable) -> Option<&'a str> {
    let text = normalize(raw);
    if text.is_empty() {
        return None;
    }

    if let Some(token) = table.token(&text) {
        return Some(token);
    }

    let words: Vec<&str> = text.split(' ').collect();
    let allow_homophones = words.len() <= HOMOPHONE_MAX_WORDS;
    for &word in &words {
        if let Some(token) = spoken_number(word, allow_homophones).and_then(|d| table.token(d)) {
            tracing::debug!(word, token, "spoken number matched");
            return Some(token);
        }
    }

    table
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map(|(_, token)| token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_menu() -> MenuKeywordTable {
        MenuKeywordTable::new([
            ("full lesson", "1"),
            ("all levels", "1"),
            ("single level", "2"),
            ("pick a level", "2"),
            ("ask a question", "3"),
            ("question", "3"),
            ("exit", "4"),
            ("quit", "4"),
        ])
    }

    #[test]
    fn test_exact_digit() {
        assert_eq!(parse_choice("1", &main_menu()), Some("1"));
        assert_eq!(parse_choice(" 4. ", &main_menu()), Some("4"));
    }

    #[test]
    fn test_spoken_number() {
        let table = main_menu();
        assert_eq!(parse_choice("three", &table), Some("3"));
        assert_eq!(parse_choice("won", &table), Some("1"));
        assert_eq!(parse_choice("Too!", &table), Some("2"));
        assert_eq!(parse_choice("option four", &table), Some("4"));
        assert_eq!(parse_choice("number for", &table), Some("4"));
    }

    #[test]
    fn test_spoken_number_outside_table_is_skipped() {
        // "six" maps to 6, which the main menu doesn't offer
        assert_eq!(parse_choice("six", &main_menu()), None);
    }

    #[test]
    fn test_homophones_ignored_in_sentences() {
        assert_eq!(parse_choice("I'd like to ask a question", &main_menu()), Some("3"));
        assert_eq!(parse_choice("I want the full lesson", &main_menu()), Some("1"));
    }

    #[test]
    fn test_number_word_wins_over_keyword() {
        // Tier 2 is tried before the keyword phrases
        assert_eq!(parse_choice("give me two full lesson", &main_menu()), Some("2"));
    }

    #[test]
    fn test_keyword_phrase() {
        assert_eq!(parse_choice("let's QUIT now", &main_menu()), Some("4"));
        assert_eq!(parse_choice("pick a level please", &main_menu()), Some("2"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_choice("xyz", &main_menu()), None);
        assert_eq!(parse_choice("", &main_menu()), None);
        assert_eq!(parse_choice("?!", &main_menu()), None);
    }

    #[test]
    fn test_table_deserializes_in_order() {
        let table: MenuKeywordTable =
            serde_json::from_str(r#"[["core", "2"], ["fusion", "2"], ["photon", "3"]]"#).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.iter().next(), Some(("core", "2")));
    }
}
