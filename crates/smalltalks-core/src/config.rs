//! Per-call pre-processing configuration.

use serde::{Deserialize, Serialize};

/// How much derived information an analysis carries.
///
/// Levels are strictly ordered: every field filled at one level is also
/// filled at each higher level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum InformationLevel {
    /// Matched intent names and the curse-word flag only.
    None = 0,
    /// Adds match values, marked/cleaned input and the cleaned ratio.
    #[default]
    Normal = 1,
    /// Adds match indices/lengths and the stopword-free relevant input.
    Full = 2,
}

impl InformationLevel {
    /// Returns a human-readable name for this level.
    pub fn name(&self) -> &'static str {
        match self {
            InformationLevel::None => "NONE",
            InformationLevel::Normal => "NORMAL",
            InformationLevel::Full => "FULL",
        }
    }
}

impl std::str::FromStr for InformationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(InformationLevel::None),
            "normal" => Ok(InformationLevel::Normal),
            "full" => Ok(InformationLevel::Full),
            other => Err(format!("unknown information level: {other}")),
        }
    }
}

/// Pre-processing options supplied with each analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreProcessingConfig {
    /// Lower-case the text before scanning for intents.
    pub to_lower: bool,
    /// Strip accents when producing marked and cleaned input.
    pub unicode_normalization: bool,
    /// Amount of derived information to compute.
    pub information_level: InformationLevel,
}

impl Default for PreProcessingConfig {
    fn default() -> Self {
        Self {
            to_lower: true,
            unicode_normalization: true,
            information_level: InformationLevel::Normal,
        }
    }
}

impl PreProcessingConfig {
    /// Sets whether input is lower-cased.
    pub fn with_to_lower(mut self, to_lower: bool) -> Self {
        self.to_lower = to_lower;
        self
    }

    /// Sets whether accents are stripped.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.unicode_normalization = enabled;
        self
    }

    /// Sets the information level.
    pub fn with_information_level(mut self, level: InformationLevel) -> Self {
        self.information_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(InformationLevel::None < InformationLevel::Normal);
        assert!(InformationLevel::Normal < InformationLevel::Full);
    }

    #[test]
    fn defaults() {
        let config = PreProcessingConfig::default();
        assert!(config.to_lower);
        assert!(config.unicode_normalization);
        assert_eq!(config.information_level, InformationLevel::Normal);
    }

    #[test]
    fn deserializes_partial_camel_case() {
        let config: PreProcessingConfig =
            serde_json::from_str(r#"{"informationLevel":"FULL","toLower":false}"#).unwrap();
        assert!(!config.to_lower);
        assert!(config.unicode_normalization);
        assert_eq!(config.information_level, InformationLevel::Full);
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("full".parse::<InformationLevel>().unwrap(), InformationLevel::Full);
        assert_eq!("NONE".parse::<InformationLevel>().unwrap(), InformationLevel::None);
        assert!("verbose".parse::<InformationLevel>().is_err());
    }
}
