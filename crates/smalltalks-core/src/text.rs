//! Immutable, chainable text normalization.
//!
//! Every transform consumes a [`TextState`] and returns a new one. The
//! `original` text is carried through unchanged; only `current` is rewritten.
//!
//! ```
//! use smalltalks_core::text::TextState;
//!
//! let state = TextState::new("Café!!!  Olá").remove_accentuation().remove_punctuation();
//! assert_eq!(state.current(), "Cafe Ola");
//! assert_eq!(state.original(), "Café!!!  Olá");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Sentinel substituted for masked spans (curse words and claimed intents).
///
/// A single non-word symbol, so word boundaries next to it stay intact and
/// [`TextState::remove_punctuation`] strips it along with other symbols.
pub const PLACEHOLDER: &str = "\u{00A4}";

/// Runs of this many identical characters (or more) collapse to one.
const REPEAT_THRESHOLD: usize = 3;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{P}\p{S}]+").expect("Invalid regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static NONSPACING_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Mn}+").expect("Invalid regex"));

/// Original and current view of a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextState {
    original: String,
    current: String,
}

impl TextState {
    /// Starts a pipeline where original and current are the same text.
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            current: original.clone(),
            original,
        }
    }

    /// The text the pipeline started from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The text after every transform applied so far.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Consumes the state and returns the current text.
    pub fn into_current(self) -> String {
        self.current
    }

    fn map(self, f: impl FnOnce(&str) -> String) -> Self {
        let current = f(&self.current);
        Self {
            original: self.original,
            current,
        }
    }

    /// Collapses runs of three or more identical characters into one.
    ///
    /// Doubled letters ("hello", "cool") are left alone.
    pub fn remove_repeated_characters(self) -> Self {
        self.map(collapse_repeats)
    }

    /// Full Unicode lower-casing.
    pub fn to_lower(self) -> Self {
        self.map(str::to_lowercase)
    }

    /// Strips nonspacing diacritical marks ("café" becomes "cafe").
    ///
    /// Only `Mn` marks are dropped after decomposition. Spacing vowel signs
    /// (`Mc`) and enclosing marks stay, so text without a canonical
    /// decomposition passes through unchanged.
    pub fn remove_accentuation(self) -> Self {
        self.map(|text| {
            let decomposed: String = text.nfd().collect();
            NONSPACING_MARKS.replace_all(&decomposed, "").nfc().collect()
        })
    }

    /// Removes punctuation and symbol characters, then collapses whitespace.
    pub fn remove_punctuation(self) -> Self {
        self.map(|text| collapse_whitespace(&PUNCTUATION.replace_all(text, "")))
    }

    /// Removes every [`PLACEHOLDER`], then collapses whitespace.
    pub fn remove_placeholder(self) -> Self {
        self.map(|text| collapse_whitespace(&text.replace(PLACEHOLDER, "")))
    }
}

impl From<&str> for TextState {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextState {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Length of `text` in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Replaces runs of whitespace with a single space and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if run >= REPEAT_THRESHOLD { 1 } else { run };
        out.extend(std::iter::repeat(c).take(keep));
    }

    out
}
