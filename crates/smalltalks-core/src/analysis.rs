//! Analysis results returned by the detector.

use serde::{Deserialize, Serialize};

use crate::config::InformationLevel;

/// One span claimed by an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Name of the intent that matched.
    pub intent_name: String,
    /// Matched text (NORMAL and above).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Character offset of the match in the text the intent scanned (FULL only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Match length in characters (FULL only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl MatchRecord {
    /// Builds a record, keeping only the details `level` allows.
    pub fn new(
        intent_name: impl Into<String>,
        value: &str,
        index: usize,
        length: usize,
        level: InformationLevel,
    ) -> Self {
        let full = level >= InformationLevel::Full;
        Self {
            intent_name: intent_name.into(),
            value: (level >= InformationLevel::Normal).then(|| value.to_string()),
            index: full.then_some(index),
            length: full.then_some(length),
        }
    }
}

/// Result of analysing one utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Normalized input (repeats collapsed, optionally lower-cased).
    pub input: String,
    /// Input with curse words and intent matches replaced by the placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_input: Option<String>,
    /// Marked input without placeholders, punctuation or repeats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_input: Option<String>,
    /// `len(cleaned_input) / len(input)`, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_input_ratio: Option<f32>,
    /// Whether the cleaned input retains enough of the original to be used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cleaned_input: Option<bool>,
    /// Cleaned input without stopwords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_input: Option<String>,
    /// Whether any curse word was masked.
    pub have_cursed_words: bool,
    /// Matches in scan order.
    pub matches: Vec<MatchRecord>,
}

impl Analysis {
    /// Returns true if any intent matched.
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Returns true if the utterance was nothing but smalltalk.
    ///
    /// Only meaningful at NORMAL and above; at NONE there is no cleaned
    /// input to inspect and this returns false.
    pub fn is_only_smalltalk(&self) -> bool {
        self.has_matches()
            && self
                .cleaned_input
                .as_deref()
                .is_some_and(|cleaned| cleaned.is_empty())
    }

    /// Returns matches for a specific intent.
    pub fn matches_for(&self, intent_name: &str) -> Vec<&MatchRecord> {
        self.matches
            .iter()
            .filter(|m| m.intent_name == intent_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_record_respects_level() {
        let none = MatchRecord::new("greeting", "hi", 0, 2, InformationLevel::None);
        assert_eq!(none.value, None);
        assert_eq!(none.index, None);
        assert_eq!(none.length, None);

        let normal = MatchRecord::new("greeting", "hi", 0, 2, InformationLevel::Normal);
        assert_eq!(normal.value.as_deref(), Some("hi"));
        assert_eq!(normal.index, None);

        let full = MatchRecord::new("greeting", "hi", 3, 2, InformationLevel::Full);
        assert_eq!(full.value.as_deref(), Some("hi"));
        assert_eq!(full.index, Some(3));
        assert_eq!(full.length, Some(2));
    }

    #[test]
    fn serializes_camel_case_and_skips_unset() {
        let analysis = Analysis {
            input: "hi".to_string(),
            matches: vec![MatchRecord::new("greeting", "hi", 0, 2, InformationLevel::None)],
            ..Default::default()
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["haveCursedWords"], false);
        assert_eq!(json["matches"][0]["intentName"], "greeting");
        assert!(json.get("markedInput").is_none());
        assert!(json["matches"][0].get("value").is_none());
    }

    #[test]
    fn only_smalltalk_needs_empty_cleaned_input() {
        let mut analysis = Analysis {
            input: "hi".to_string(),
            matches: vec![MatchRecord::new("greeting", "hi", 0, 2, InformationLevel::Normal)],
            cleaned_input: Some(String::new()),
            ..Default::default()
        };
        assert!(analysis.is_only_smalltalk());

        analysis.cleaned_input = Some("weather".to_string());
        assert!(!analysis.is_only_smalltalk());
    }
}
