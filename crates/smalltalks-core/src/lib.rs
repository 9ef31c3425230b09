//! SmallTalks Core - smalltalk intent detection and profanity flagging.
//!
//! This crate turns declarative smalltalk rules into compiled matchers and
//! runs them over normalized user utterances:
//!
//! - [`text`]: chainable normalization (repeats, case, accents, punctuation)
//! - [`rules`]: rule model and compilation into anchored, bounded regexes
//! - [`words`]: curse-word masking and stopword removal
//! - [`source`]: loading rules and word lists from files or bundled data
//! - [`detector`]: the priority-ordered, masking scan producing an [`Analysis`]
//!
//! # Example
//!
//! ```no_run
//! use smalltalks_core::{InformationLevel, PreProcessingConfig, SmallTalksDetector};
//!
//! # async fn run() -> smalltalks_core::Result<()> {
//! let detector = SmallTalksDetector::bundled();
//! let config = PreProcessingConfig::default().with_information_level(InformationLevel::Full);
//! let analysis = detector.analyze("hi there, what's the weather?", config).await?;
//! for m in &analysis.matches {
//!     println!("{} -> {:?}", m.intent_name, m.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod rules;
pub mod source;
pub mod text;
pub mod words;

pub use analysis::{Analysis, MatchRecord};
pub use config::{InformationLevel, PreProcessingConfig};
pub use detector::{SmallTalksDetector, SourceDetector};
pub use error::{Result, SmallTalksError};
pub use rules::{CompiledIntent, DetectorData, PositionKind, Rule};
pub use source::{DetectorDataProvider, InMemorySource, SourceProvider, SourceType};
pub use text::{TextState, PLACEHOLDER};
pub use words::{VocabularyWordsDetector, WordDetectorType, WordsDetector, WordsDetectorFactory};
