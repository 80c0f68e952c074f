//! Error types for earshot.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EarshotError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Model loading errors
    #[error("Failed to fetch model document {url}: {message}")]
    ModelFetch { url: String, message: String },

    #[error("Failed to parse model document {url}: {message}")]
    ModelParse { url: String, message: String },

    #[error("Model metadata has no word labels")]
    LabelsMissing,

    #[error("Model expects {model} input values but frames carry {frame}")]
    InputShapeMismatch { model: usize, frame: usize },

    // Inference errors
    #[error("Classification failed: {message}")]
    Inference { message: String },

    #[error("Model returned {scores} scores for {labels} labels")]
    ScoreLabelMismatch { scores: usize, labels: usize },

    #[error("Model returned an empty score vector")]
    EmptyScores,

    // Feature feed errors
    #[error("Failed to start feature extractor {command}: {message}")]
    FeedSpawn { command: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, EarshotError>;
