//! Rule and word-list sources.
//!
//! A [`SourceProvider`] names the three payloads a detector needs (intents,
//! stopwords, curse words) and where they live. Intents are a JSON array of
//! [`Rule`] objects; word lists hold one word per line, with blank lines and
//! `#` comments ignored.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SmallTalksError};
use crate::rules::{DetectorData, Rule};
use crate::words::{VocabularyWordsDetector, WordDetectorType, WordsDetectorFactory};

/// Default file name of the intents payload.
pub const INTENTS_FILE: &str = "intents.json";
/// Default file name of the stopword list.
pub const STOPWORDS_FILE: &str = "stopwords.txt";
/// Default file name of the curse-word list.
pub const CURSEWORDS_FILE: &str = "cursewords.txt";

const BUNDLED_INTENTS: &str = include_str!("../data/intents.json");
const BUNDLED_STOPWORDS: &str = include_str!("../data/stopwords.txt");
const BUNDLED_CURSEWORDS: &str = include_str!("../data/cursewords.txt");

/// Produces the compiled detector data.
pub trait DetectorDataProvider: Send + Sync {
    /// Loads rules and compiles them, ordered for scanning.
    fn detector_data(&self) -> impl Future<Output = Result<DetectorData>> + Send;
}

/// Where a [`SourceProvider`] reads its payloads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Files on the local filesystem.
    Local,
    /// Data compiled into this crate.
    #[default]
    Bundled,
}

/// Descriptor of an intents / stopwords / curse-words bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProvider {
    /// Intents payload.
    pub intents: PathBuf,
    /// Stopword list.
    pub stop_words: PathBuf,
    /// Curse-word list.
    pub curse_words: PathBuf,
    /// How the paths are resolved.
    pub source_type: SourceType,
}

impl Default for SourceProvider {
    fn default() -> Self {
        Self::bundled()
    }
}

impl SourceProvider {
    /// The data shipped with this crate.
    pub fn bundled() -> Self {
        Self {
            intents: PathBuf::from(INTENTS_FILE),
            stop_words: PathBuf::from(STOPWORDS_FILE),
            curse_words: PathBuf::from(CURSEWORDS_FILE),
            source_type: SourceType::Bundled,
        }
    }

    /// The default file names inside `dir`.
    pub fn local(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            intents: dir.join(INTENTS_FILE),
            stop_words: dir.join(STOPWORDS_FILE),
            curse_words: dir.join(CURSEWORDS_FILE),
            source_type: SourceType::Local,
        }
    }

    /// Reads and parses the intents payload.
    pub async fn load_rules(&self) -> Result<Vec<Rule>> {
        let payload = self.read(&self.intents).await?;
        parse_rules(&payload, &self.intents)
    }

    /// Reads and parses one word list.
    pub async fn load_words(&self, kind: WordDetectorType) -> Result<Vec<String>> {
        let path = match kind {
            WordDetectorType::Stopwords => &self.stop_words,
            WordDetectorType::Cursewords => &self.curse_words,
        };
        let payload = self.read(path).await?;
        Ok(parse_word_list(&payload))
    }

    async fn read(&self, path: &Path) -> Result<String> {
        match self.source_type {
            SourceType::Local => tokio::fs::read_to_string(path).await.map_err(|source| {
                SmallTalksError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                }
            }),
            SourceType::Bundled => bundled_payload(path).map(str::to_string).ok_or_else(|| {
                SmallTalksError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no bundled resource"),
                }
            }),
        }
    }
}

impl DetectorDataProvider for SourceProvider {
    async fn detector_data(&self) -> Result<DetectorData> {
        let rules = self.load_rules().await?;
        let data = DetectorData::compile_all(&rules)?.into_scan_order();
        info!(
            intents = data.len(),
            source = %self.intents.display(),
            "Loaded smalltalk intents"
        );
        Ok(data)
    }
}

impl WordsDetectorFactory for SourceProvider {
    type Detector = VocabularyWordsDetector;

    async fn words_detector(&self, kind: WordDetectorType) -> Result<VocabularyWordsDetector> {
        let words = self.load_words(kind).await?;
        let detector = VocabularyWordsDetector::new(&words)?;
        info!(vocabulary = kind.name(), words = detector.len(), "Loaded word list");
        Ok(detector)
    }
}

fn bundled_payload(path: &Path) -> Option<&'static str> {
    match path.file_name()?.to_str()? {
        INTENTS_FILE => Some(BUNDLED_INTENTS),
        STOPWORDS_FILE => Some(BUNDLED_STOPWORDS),
        CURSEWORDS_FILE => Some(BUNDLED_CURSEWORDS),
        _ => None,
    }
}

/// Parses an intents payload.
pub fn parse_rules(payload: &str, path: &Path) -> Result<Vec<Rule>> {
    let rules: Vec<Rule> =
        serde_json::from_str(payload).map_err(|source| SmallTalksError::InvalidRuleData {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(rules = rules.len(), path = %path.display(), "Parsed rules");
    Ok(rules)
}

/// Parses a newline-delimited word list.
pub fn parse_word_list(payload: &str) -> Vec<String> {
    payload
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Rules and word lists held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rules: Vec<Rule>,
    stop_words: Vec<String>,
    curse_words: Vec<String>,
}

impl InMemorySource {
    /// Creates a source with the given rules and no word lists.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Sets the stopword list.
    pub fn with_stop_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the curse-word list.
    pub fn with_curse_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.curse_words = words.into_iter().map(Into::into).collect();
        self
    }
}

impl DetectorDataProvider for InMemorySource {
    async fn detector_data(&self) -> Result<DetectorData> {
        Ok(DetectorData::compile_all(&self.rules)?.into_scan_order())
    }
}

impl WordsDetectorFactory for InMemorySource {
    type Detector = VocabularyWordsDetector;

    async fn words_detector(&self, kind: WordDetectorType) -> Result<VocabularyWordsDetector> {
        match kind {
            WordDetectorType::Stopwords => VocabularyWordsDetector::new(&self.stop_words),
            WordDetectorType::Cursewords => VocabularyWordsDetector::new(&self.curse_words),
        }
    }
}
