use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::fs;
use anyhow::Result;
use rand::{seq::IndexedRandom, Rng};

use crate::error::HangmanError;

/// Word list indexed by word length, used to pick hidden words for new games
pub struct Dictionary {
    by_length: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    /// Load dictionary from a file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let dictionary = Self::from_words(content.lines());

        tracing::info!("Loaded {} words into dictionary", dictionary.len());

        Ok(dictionary)
    }

    /// Build a dictionary from raw lines.
    ///
    /// Line terminators and surrounding whitespace are stripped before the
    /// length is measured, so stored words never carry a trailing `\r` or `\n`.
    /// Entries containing anything other than ASCII letters are skipped.
    pub fn from_words<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = lines
            .into_iter()
            .filter_map(|line| {
                let word = line.as_ref().trim();
                (!word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
                    .then(|| word.to_ascii_lowercase())
            })
            .collect();

        let mut by_length: HashMap<usize, Vec<String>> = HashMap::new();
        for word in words {
            by_length.entry(word.len()).or_default().push(word);
        }

        Self { by_length }
    }

    /// Create an empty dictionary (used when the word list is missing)
    pub fn empty() -> Self {
        Self {
            by_length: HashMap::new(),
        }
    }

    /// Pick a uniformly random word of exactly `length` letters
    pub fn select(&self, length: usize) -> Result<String, HangmanError> {
        self.select_with(length, &mut rand::rng())
    }

    pub fn select_with<R: Rng + ?Sized>(
        &self,
        length: usize,
        rng: &mut R,
    ) -> Result<String, HangmanError> {
        self.by_length
            .get(&length)
            .and_then(|words| words.choose(rng))
            .cloned()
            .ok_or(HangmanError::NoWordAvailable(length))
    }

    /// Number of distinct words of the given length
    pub fn count_of_length(&self, length: usize) -> usize {
        self.by_length.get(&length).map_or(0, Vec::len)
    }

    /// Get the number of words in the dictionary
    pub fn len(&self) -> usize {
        self.by_length.values().map(Vec::len).sum()
    }

    /// Check if dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_empty_dictionary() {
        let dict = Dictionary::empty();
        assert!(dict.is_empty());
        assert!(matches!(dict.select(5), Err(HangmanError::NoWordAvailable(5))));
    }

    #[test]
    fn test_terminators_are_stripped_before_length_check() {
        // Windows and unix line endings must both yield 5-letter words
        let content = "apple\r\nmango\nkiwi\r\n";
        let dict = Dictionary::from_words(content.split_inclusive('\n'));

        assert_eq!(dict.count_of_length(5), 2);
        assert_eq!(dict.count_of_length(4), 1);
        assert_eq!(dict.count_of_length(6), 0);

        for _ in 0..20 {
            let word = dict.select(5).unwrap();
            assert_eq!(word.len(), 5);
            assert!(!word.ends_with('\r') && !word.ends_with('\n'));
        }
    }

    #[test]
    fn test_non_alphabetic_entries_are_skipped() {
        let dict = Dictionary::from_words(["hello", "he11o", "it's", "", "   ", "WORLD"]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.count_of_length(5), 2);
    }

    #[test]
    fn test_words_are_lowercased_and_deduplicated() {
        let dict = Dictionary::from_words(["Apple", "APPLE", "apple"]);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.select(5).unwrap(), "apple");
    }

    #[test]
    fn test_missing_length_reports_no_word_available() {
        let dict = Dictionary::from_words(["cat", "dog"]);
        assert!(matches!(dict.select(7), Err(HangmanError::NoWordAvailable(7))));
    }

    #[test]
    fn test_every_matching_word_can_be_selected() {
        // Guards against an off-by-one range that skips the first or last entry
        let words = ["aaa", "bbb", "ccc", "ddd"];
        let dict = Dictionary::from_words(words);
        let mut rng = StdRng::seed_from_u64(7);

        let seen: HashSet<String> = (0..500)
            .map(|_| dict.select_with(3, &mut rng).unwrap())
            .collect();

        assert_eq!(seen.len(), words.len());
    }

    #[test]
    fn test_large_word_list_keeps_every_distinct_word() {
        // Each word appears twice; 20k distinct 8-letter words must survive dedup
        let words: Vec<String> = (0..20_000u32)
            .map(|n| {
                (0..8)
                    .map(|i| (b'a' + ((n >> (i * 2)) % 26) as u8) as char)
                    .collect::<String>()
            })
            .collect();
        let distinct: HashSet<&String> = words.iter().collect();

        let dict = Dictionary::from_words(words.iter().chain(words.iter()));
        assert_eq!(dict.count_of_length(8), distinct.len());
        assert_eq!(dict.len(), distinct.len());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        assert!(Dictionary::load("/nonexistent/hangman/dictionary.txt").await.is_err());
    }
}
