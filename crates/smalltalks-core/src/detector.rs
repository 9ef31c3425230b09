//! Smalltalk detection pipeline.
//!
//! For each input the detector:
//!
//! 1. Normalizes the input for reporting (repeats collapsed, optionally
//!    lower-cased).
//! 2. Masks curse words in the raw input, then normalizes the masked text
//!    the same way to obtain the scanning text.
//! 3. Scans intents in ascending priority. Each intent finds all its
//!    non-overlapping matches in the live text, records them, and replaces
//!    them with [`PLACEHOLDER`] so later intents cannot claim the same span.
//! 4. Derives marked/cleaned/relevant text according to the
//!    [`InformationLevel`].
//!
//! Intent data and word detectors are loaded once per detector, on first
//! use or by an explicit [`SmallTalksDetector::init`].

use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::analysis::{Analysis, MatchRecord};
use crate::config::{InformationLevel, PreProcessingConfig};
use crate::error::Result;
use crate::rules::{CompiledIntent, DetectorData};
use crate::source::{DetectorDataProvider, SourceProvider};
use crate::text::{char_len, TextState, PLACEHOLDER};
use crate::words::{WordDetectorType, WordsDetector, WordsDetectorFactory};

/// Cleaned input is considered usable at or above this ratio.
pub const USE_CLEANED_INPUT_RATIO: f32 = 0.5;

/// Detector over the file-based or bundled sources.
pub type SourceDetector = SmallTalksDetector<SourceProvider, SourceProvider>;

/// Classifies utterances against smalltalk intents and flags curse words.
pub struct SmallTalksDetector<P, W>
where
    W: WordsDetectorFactory,
{
    data_provider: P,
    words_factory: W,
    data: OnceCell<DetectorData>,
    stop_words: OnceCell<W::Detector>,
    curse_words: OnceCell<W::Detector>,
}

impl SmallTalksDetector<SourceProvider, SourceProvider> {
    /// Creates a detector reading everything from one source bundle.
    pub fn from_source(source: SourceProvider) -> Self {
        Self::new(source.clone(), source)
    }

    /// Creates a detector over the data bundled with this crate.
    pub fn bundled() -> Self {
        Self::from_source(SourceProvider::bundled())
    }
}

impl<P, W> SmallTalksDetector<P, W>
where
    P: DetectorDataProvider,
    W: WordsDetectorFactory,
{
    /// Creates an uninitialized detector.
    pub fn new(data_provider: P, words_factory: W) -> Self {
        Self {
            data_provider,
            words_factory,
            data: OnceCell::new(),
            stop_words: OnceCell::new(),
            curse_words: OnceCell::new(),
        }
    }

    /// Loads word detectors and intent data if not loaded yet.
    pub async fn init(&self) -> Result<()> {
        self.stop_words().await?;
        self.curse_words().await?;
        self.detector_data().await?;
        Ok(())
    }

    /// Returns true once intent data is loaded.
    pub fn is_initialized(&self) -> bool {
        self.data.initialized()
    }

    /// Intents in scan order, if loaded.
    pub fn intents(&self) -> Option<&[CompiledIntent]> {
        self.data.get().map(DetectorData::intents)
    }

    /// Drops all loaded data; the next call loads it again.
    pub fn reset(&mut self) {
        self.data.take();
        self.stop_words.take();
        self.curse_words.take();
    }

    /// Analyses `input` with the default configuration.
    pub async fn detect(&self, input: &str) -> Result<Analysis> {
        self.analyze(input, PreProcessingConfig::default()).await
    }

    /// Analyses `input`.
    ///
    /// Success and failure are both logged with the input and configuration,
    /// followed by the elapsed time. Errors are returned unchanged.
    pub async fn analyze(&self, input: &str, config: PreProcessingConfig) -> Result<Analysis> {
        let start = Instant::now();
        let result = self.analyse_for_smalltalks(input, config).await;

        match &result {
            Ok(analysis) => info!(input, ?config, ?analysis, "Analysed input"),
            Err(e) => error!(input, ?config, error = %e, "Analysis failed"),
        }
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Detection finished"
        );

        result
    }

    async fn analyse_for_smalltalks(
        &self,
        input: &str,
        config: PreProcessingConfig,
    ) -> Result<Analysis> {
        let level = config.information_level;
        let normalized = normalize_for_scan(TextState::new(input), config);

        let data = self.detector_data().await?;
        let curse_words = self.curse_words().await?;

        let (masked, have_cursed_words) = curse_words.replace_words(input, PLACEHOLDER)?;
        let scan_text = normalize_for_scan(TextState::new(masked), config);
        let (marked, matches) = scan_intents(data.intents(), scan_text.current(), level);

        let mut analysis = Analysis {
            input: normalized.into_current(),
            have_cursed_words,
            matches,
            ..Default::default()
        };

        if level >= InformationLevel::Normal {
            self.fill_derived_fields(&mut analysis, marked, config).await?;
        }

        Ok(analysis)
    }

    async fn fill_derived_fields(
        &self,
        analysis: &mut Analysis,
        marked: String,
        config: PreProcessingConfig,
    ) -> Result<()> {
        let mut marked = TextState::new(marked);
        if config.unicode_normalization {
            marked = marked.remove_accentuation();
        }
        analysis.marked_input = Some(marked.current().to_string());

        let cleaned = marked
            .remove_punctuation()
            .remove_repeated_characters()
            .remove_placeholder()
            .into_current();

        let ratio = cleaned_ratio(&cleaned, &analysis.input);
        analysis.cleaned_input_ratio = Some(ratio);
        analysis.use_cleaned_input = Some(ratio >= USE_CLEANED_INPUT_RATIO);

        if config.information_level >= InformationLevel::Full {
            let stop_words = self.stop_words().await?;
            let relevant = stop_words.remove_words(&cleaned)?;
            analysis.relevant_input = Some(
                TextState::new(relevant)
                    .remove_repeated_characters()
                    .into_current(),
            );
        }

        analysis.cleaned_input = Some(cleaned);
        Ok(())
    }

    async fn detector_data(&self) -> Result<&DetectorData> {
        self.data
            .get_or_try_init(|| async {
                let mut data = self.data_provider.detector_data().await?;
                data.sort_by_priority();
                Ok(data)
            })
            .await
    }

    async fn stop_words(&self) -> Result<&W::Detector> {
        self.stop_words
            .get_or_try_init(|| self.words_factory.words_detector(WordDetectorType::Stopwords))
            .await
    }

    async fn curse_words(&self) -> Result<&W::Detector> {
        self.curse_words
            .get_or_try_init(|| self.words_factory.words_detector(WordDetectorType::Cursewords))
            .await
    }
}

fn normalize_for_scan(state: TextState, config: PreProcessingConfig) -> TextState {
    let state = state.remove_repeated_characters();
    if config.to_lower {
        state.to_lower()
    } else {
        state
    }
}

fn cleaned_ratio(cleaned: &str, input: &str) -> f32 {
    let input_len = char_len(input);
    if input_len == 0 {
        return 0.0;
    }
    (char_len(cleaned) as f32 / input_len as f32).clamp(0.0, 1.0)
}

/// Scans `text` with each intent in order, masking what each one claims.
///
/// Returns the masked text and one record per match. Recorded offsets are
/// character positions in the text as the recording intent saw it, i.e.
/// after every higher-precedence intent has been masked.
pub fn scan_intents(
    intents: &[CompiledIntent],
    text: &str,
    level: InformationLevel,
) -> (String, Vec<MatchRecord>) {
    let mut working = text.to_string();
    let mut records = Vec::new();

    for intent in intents {
        let mut masked = String::with_capacity(working.len());
        let mut last_end = 0;
        let mut chars_before = 0;

        for m in intent.find_iter(&working) {
            let gap = &working[last_end..m.start()];
            chars_before += char_len(gap);
            let length = char_len(m.as_str());

            records.push(MatchRecord::new(
                intent.name(),
                m.as_str(),
                chars_before,
                length,
                level,
            ));

            masked.push_str(gap);
            masked.push_str(PLACEHOLDER);
            chars_before += length;
            last_end = m.end();
        }

        if last_end > 0 {
            masked.push_str(&working[last_end..]);
            working = masked;
        }
    }

    (working, records)
}
