//! Scoring core: the model adapter, training pipeline, explanation engine,
//! scoring orchestrator, and the fingerprint-keyed result cache.

mod cache;
mod error;
mod explain;
mod model;
mod pipeline;
mod train;

pub use cache::ScoreCache;
pub use error::{Result, ScoreError};
pub use explain::{MAX_EXPLANATIONS, explain};
pub use model::{DEFAULT_MODEL_PATH, ModelArtifact};
pub use pipeline::{ScoreOutcome, Scorer};
pub use train::{TrainOptions, TrainReport, fit};
