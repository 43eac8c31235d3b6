//! Portuguese reference word lists used by the garbage-score signals.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const STOPLIST_RAW: &str = include_str!("pt_stoplist.txt");
const DICTIONARY_RAW: &str = include_str!("pt_dictionary.txt");

fn parse_wordlist(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_lowercase())
        .collect()
}

/// High-frequency Portuguese function words, used by signal 4 (stoplist
/// membership) of the word-garbage score.
pub static STOPLIST: Lazy<HashSet<String>> = Lazy::new(|| parse_wordlist(STOPLIST_RAW));

/// Frequency dictionary of common Portuguese and Brazilian legal vocabulary,
/// used by signal 7 (dictionary miss rate) of the word-garbage score.
pub static DICTIONARY: Lazy<HashSet<String>> = Lazy::new(|| parse_wordlist(DICTIONARY_RAW));

pub fn is_stopword(word: &str) -> bool {
    STOPLIST.contains(&word.to_lowercase())
}

pub fn is_in_dictionary(word: &str) -> bool {
    DICTIONARY.contains(&word.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_function_words_are_in_the_stoplist() {
        assert!(is_stopword("de"));
        assert!(is_stopword("que"));
        assert!(is_stopword("COM"));
    }

    #[test]
    fn legal_vocabulary_is_in_the_dictionary() {
        assert!(is_in_dictionary("sentença"));
        assert!(is_in_dictionary("processo"));
        assert!(is_in_dictionary("ACÓRDÃO"));
    }

    #[test]
    fn nonsense_token_is_absent_from_both() {
        assert!(!is_stopword("qzxjklw"));
        assert!(!is_in_dictionary("qzxjklw"));
    }
}
