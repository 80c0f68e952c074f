//! Classification model management.
//!
//! A closed set of manager kinds (currently only `Online`) selected by the
//! configured mode. The pipeline depends only on the resulting
//! `ModelHandle`: a label list, a declared input length, and a scoring
//! engine behind the `Scorer` seam.

pub mod online;
pub mod scorer;

pub use online::{ModelDocuments, OnlineModelManager};
pub use scorer::{MockScorer, Scorer};

use crate::config::ManagerMode;
use crate::error::Result;
use crate::pipeline::types::ScoreVector;
use std::sync::Arc;

/// A loaded model, ready to score frames.
pub struct ModelHandle {
    labels: Vec<String>,
    input_len: usize,
    scorer: Arc<dyn Scorer>,
}

impl ModelHandle {
    /// Pairs model documents with a scoring engine.
    pub fn new(labels: Vec<String>, input_len: usize, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            labels,
            input_len,
            scorer,
        }
    }

    /// Class labels, in model output order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of input values the model expects per frame.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Name of the backing scorer.
    pub fn name(&self) -> &str {
        self.scorer.name()
    }

    /// Score one frame payload. See [`Scorer::recognize`].
    pub async fn recognize(&self, payload: &[f32]) -> Result<Option<ScoreVector>> {
        self.scorer.recognize(payload).await
    }
}

/// Model manager variants, keyed by the configured mode.
pub enum ModelManager {
    Online(OnlineModelManager),
}

impl ModelManager {
    /// Builds the manager for a configured mode.
    pub fn from_mode(mode: ManagerMode) -> Self {
        match mode {
            ManagerMode::Online => Self::Online(OnlineModelManager::new()),
        }
    }

    /// Load a model from `base_url`, pairing its documents with `scorer`.
    pub async fn load(&self, base_url: &str, scorer: Arc<dyn Scorer>) -> Result<ModelHandle> {
        match self {
            Self::Online(manager) => {
                let documents = manager.fetch(base_url).await?;
                Ok(ModelHandle::new(
                    documents.labels,
                    documents.input_len,
                    scorer,
                ))
            }
        }
    }
}
