//! Application state for the API server.

use std::sync::Arc;

use smalltalks_core::{SourceDetector, SourceProvider};
use tokio::sync::RwLock;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Smalltalk detector. Analyses share a read lock; reloads take the
    /// write lock.
    pub detector: Arc<RwLock<SourceDetector>>,
}

impl AppState {
    /// Creates application state around an existing detector.
    pub fn new(detector: SourceDetector) -> Self {
        Self {
            detector: Arc::new(RwLock::new(detector)),
        }
    }

    /// Creates application state reading from the given source.
    pub fn from_source(source: SourceProvider) -> Self {
        Self::new(SourceDetector::from_source(source))
    }

    /// Creates application state over the bundled data.
    pub fn bundled() -> Self {
        Self::new(SourceDetector::bundled())
    }
}
