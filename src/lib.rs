//! earshot - Streaming audio-feature classification
//!
//! Reassembles the raw byte stream of an external feature extractor into
//! fixed-size frames and classifies them with a Teachable Machine
//! speech-command model.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod feed;
pub mod model;
pub mod pipeline;
pub mod status;

// Core seams (feed → pipeline → scorer → sink)
pub use feed::{FeatureFeed, FeedEvent};
pub use model::scorer::{MockScorer, Scorer};
pub use model::{ModelHandle, ModelManager, OnlineModelManager};
pub use pipeline::controller::{Pipeline, PipelineState};
pub use pipeline::types::{Classification, FeatureFrame, Prediction, ScoreVector};

// Error handling
pub use error::{EarshotError, Result};

// Config
pub use config::{Config, ManagerMode, OutputMode};

// Status reporting
pub use status::{CollectingStatus, NullStatus, StatusEvent, StatusSink, StderrStatus};

/// Build version string with optional git commit hash.
///
/// Returns `"0.2.0+abc1234"` when git hash is available, `"0.2.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
