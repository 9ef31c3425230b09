//! Word-level masking and removal (curse words, stopwords).
//!
//! The detector only depends on the [`WordsDetector`] contract; where the
//! vocabulary comes from is decided by a [`WordsDetectorFactory`].

use std::borrow::Cow;
use std::collections::HashSet;
use std::future::Future;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::error::{Result, SmallTalksError};
use crate::rules::with_word_boundaries;
use crate::text::collapse_whitespace;

/// Which vocabulary a detector is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordDetectorType {
    /// Words removed when computing relevant input.
    Stopwords,
    /// Words masked and flagged as profanity.
    Cursewords,
}

impl WordDetectorType {
    /// Returns a human-readable name for this vocabulary.
    pub fn name(&self) -> &'static str {
        match self {
            WordDetectorType::Stopwords => "stopwords",
            WordDetectorType::Cursewords => "cursewords",
        }
    }
}

/// Replaces or removes the words of a vocabulary.
pub trait WordsDetector: Send + Sync {
    /// Replaces every vocabulary word in `text` with `placeholder`.
    ///
    /// The flag is true iff at least one replacement happened.
    fn replace_words(&self, text: &str, placeholder: &str) -> Result<(String, bool)>;

    /// Deletes every vocabulary word from `text` and collapses whitespace.
    fn remove_words(&self, text: &str) -> Result<String>;
}

/// Produces word detectors for each vocabulary.
pub trait WordsDetectorFactory: Send + Sync {
    /// Detector type handed out by this factory.
    type Detector: WordsDetector;

    /// Loads the vocabulary for `kind` and builds a detector for it.
    fn words_detector(
        &self,
        kind: WordDetectorType,
    ) -> impl Future<Output = Result<Self::Detector>> + Send;
}

/// Regex-backed detector over a fixed word list.
///
/// Words match case-insensitively on word boundaries; longer entries win
/// over shorter ones that share a prefix.
#[derive(Debug, Clone)]
pub struct VocabularyWordsDetector {
    matcher: Option<Regex>,
    len: usize,
}

impl VocabularyWordsDetector {
    /// Builds a detector from a word list.
    ///
    /// Entries are trimmed; blank entries and duplicates (ignoring case) are
    /// dropped. Entries are matched literally.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
            .collect();

        if words.is_empty() {
            return Ok(Self::empty());
        }

        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        let pattern = words
            .iter()
            .map(|w| with_word_boundaries(&regex::escape(w)))
            .collect::<Vec<_>>()
            .join("|");

        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SmallTalksError::WordDetector(e.to_string()))?;

        Ok(Self {
            matcher: Some(matcher),
            len: words.len(),
        })
    }

    /// A detector that never matches.
    pub fn empty() -> Self {
        Self {
            matcher: None,
            len: 0,
        }
    }

    /// Returns the number of distinct words.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl WordsDetector for VocabularyWordsDetector {
    fn replace_words(&self, text: &str, placeholder: &str) -> Result<(String, bool)> {
        let Some(matcher) = &self.matcher else {
            return Ok((text.to_string(), false));
        };

        Ok(match matcher.replace_all(text, NoExpand(placeholder)) {
            Cow::Borrowed(unchanged) => (unchanged.to_string(), false),
            Cow::Owned(replaced) => (replaced, true),
        })
    }

    fn remove_words(&self, text: &str) -> Result<String> {
        let Some(matcher) = &self.matcher else {
            return Ok(text.to_string());
        };

        Ok(collapse_whitespace(&matcher.replace_all(text, "")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(words: &[&str]) -> VocabularyWordsDetector {
        VocabularyWordsDetector::new(words).unwrap()
    }

    #[test]
    fn replaces_whole_words_case_insensitively() {
        let (text, found) = detector(&["damn"]).replace_words("Damn it, DAMN!", "#").unwrap();
        assert_eq!(text, "# it, #!");
        assert!(found);
    }

    #[test]
    fn does_not_replace_inside_words() {
        let (text, found) = detector(&["hell"]).replace_words("hello shell", "#").unwrap();
        assert_eq!(text, "hello shell");
        assert!(!found);
    }

    #[test]
    fn prefers_longer_entries() {
        let (text, _) = detector(&["bull", "bullshit"]).replace_words("total bullshit", "#").unwrap();
        assert_eq!(text, "total #");
    }

    #[test]
    fn placeholder_is_inserted_literally() {
        let (text, _) = detector(&["crap"]).replace_words("crap", "$0").unwrap();
        assert_eq!(text, "$0");
    }

    #[test]
    fn entries_are_matched_literally() {
        let (text, found) = detector(&["f*ck", "a.b"]).replace_words("axb f*ck", "#").unwrap();
        assert_eq!(text, "axb #");
        assert!(found);
    }

    #[test]
    fn removes_words_and_collapses_whitespace() {
        let text = detector(&["the", "a", "is"]).remove_words("what is the weather like a day").unwrap();
        assert_eq!(text, "what weather like day");
    }

    #[test]
    fn deduplicates_and_skips_blank_entries() {
        let d = detector(&["Damn", "damn", "  ", "", " crap "]);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn empty_vocabulary_is_a_no_op() {
        let d = VocabularyWordsDetector::empty();
        assert!(d.is_empty());
        assert_eq!(d.replace_words("damn", "#").unwrap(), ("damn".to_string(), false));
        assert_eq!(d.remove_words("the  end").unwrap(), "the  end");
    }
}
