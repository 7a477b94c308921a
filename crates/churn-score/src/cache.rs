//! Single-entry result cache keyed by (content fingerprint, mapping).
//!
//! The workflow is upload-at-a-time: only the most recent upload's result
//! is worth keeping, so the cache holds exactly one entry and a new key
//! evicts the old one. Results are shared out as `Arc` so repeated reads
//! of the same upload never clone the scored table.

use std::sync::Arc;

use tracing::debug;

use crate::pipeline::ScoreOutcome;

/// One-slot cache of the latest scored upload.
#[derive(Debug, Default)]
pub struct ScoreCache {
    entry: Option<(String, Arc<ScoreOutcome>)>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously scored (content, mapping) pair.
    pub fn get(&self, key: &str) -> Option<Arc<ScoreOutcome>> {
        match &self.entry {
            Some((cached_key, outcome)) if cached_key == key => {
                debug!(key, "score cache hit");
                Some(Arc::clone(outcome))
            }
            _ => None,
        }
    }

    /// Store an outcome, evicting whatever was cached before.
    pub fn insert(&mut self, key: String, outcome: ScoreOutcome) -> Arc<ScoreOutcome> {
        let shared = Arc::new(outcome);
        self.entry = Some((key, Arc::clone(&shared)));
        shared
    }
}
