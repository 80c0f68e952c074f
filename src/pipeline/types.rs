//! Data types flowing through the classification pipeline.

use serde::{Deserialize, Serialize};

/// One fixed-size unit of audio-feature data decoded from the byte stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// Direction of arrival reported by the extractor.
    pub direction_of_arrival: f32,
    /// RMS level of the audio window the features were computed from.
    pub rms: f32,
    /// Model input values: everything after the two metadata floats.
    pub payload: Vec<f32>,
}

impl FeatureFrame {
    /// Total number of f32 values this frame was decoded from.
    pub fn float_count(&self) -> usize {
        self.payload.len() + 2
    }
}

/// Raw per-class output of the model, index-aligned with its label list.
pub type ScoreVector = Vec<f32>;

/// A single labeled score derived from a model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub score: f32,
}

/// Message emitted downstream for each successfully classified frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Direction of arrival copied from the source frame.
    pub direction_of_arrival: f32,
    /// RMS level copied from the source frame.
    pub rms: f32,
    /// Ranked, shaped predictions.
    pub payload: Vec<Prediction>,
    /// The model's full label list, in model order.
    pub classes: Vec<String>,
}
