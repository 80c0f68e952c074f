//! Online model manager: fetches Teachable Machine model documents.
//!
//! A model base URL hosts `model.json` (layer topology and weights
//! manifest) and `metadata.json` (word labels). Only the pieces the
//! pipeline needs are parsed: the label list and the declared input shape.

use crate::defaults;
use crate::error::{EarshotError, Result};

/// The parsed model documents from a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDocuments {
    /// Class labels, in model output order.
    pub labels: Vec<String>,
    /// Number of input values the model expects per frame.
    pub input_len: usize,
}

/// Fetches model documents over HTTP.
pub struct OnlineModelManager {
    client: reqwest::Client,
}

impl OnlineModelManager {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch and parse both model documents from `base_url`.
    ///
    /// Documents are addressed by plain concatenation, the way Teachable
    /// Machine publishes them — `base_url` is expected to end with `/`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success HTTP status, or a
    /// document that does not carry the expected fields.
    pub async fn fetch(&self, base_url: &str) -> Result<ModelDocuments> {
        let metadata_url = format!("{base_url}{}", defaults::METADATA_DOCUMENT);
        let metadata_text = self.get_text(&metadata_url).await?;
        let labels = parse_word_labels(&metadata_text)?;

        let model_url = format!("{base_url}{}", defaults::MODEL_DOCUMENT);
        let model_text = self.get_text(&model_url).await?;
        let input_len = parse_input_len(&model_text)?;

        Ok(ModelDocuments { labels, input_len })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| EarshotError::ModelFetch {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(EarshotError::ModelFetch {
                url: url.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        response.text().await.map_err(|e| EarshotError::ModelFetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for OnlineModelManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the `wordLabels` list from a metadata document.
pub fn parse_word_labels(text: &str) -> Result<Vec<String>> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EarshotError::ModelParse {
            url: defaults::METADATA_DOCUMENT.to_string(),
            message: e.to_string(),
        })?;

    let labels: Vec<String> = doc
        .get("wordLabels")
        .and_then(|v| v.as_array())
        .ok_or(EarshotError::LabelsMissing)?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    if labels.is_empty() {
        return Err(EarshotError::LabelsMissing);
    }
    Ok(labels)
}

/// Extract the model's expected input length from its topology document.
///
/// Reads the input layer's `batch_input_shape` and multiplies the non-batch
/// dimensions (the batch dimension is null).
pub fn parse_input_len(text: &str) -> Result<usize> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EarshotError::ModelParse {
            url: defaults::MODEL_DOCUMENT.to_string(),
            message: e.to_string(),
        })?;

    let shape = doc
        .pointer("/modelTopology/config/layers/0/config/batch_input_shape")
        .and_then(|v| v.as_array())
        .ok_or_else(|| EarshotError::ModelParse {
            url: defaults::MODEL_DOCUMENT.to_string(),
            message: "missing batch_input_shape".to_string(),
        })?;

    let mut input_len = 1usize;
    let mut dims = 0;
    for value in shape.iter().skip(1) {
        let dim = value.as_u64().ok_or_else(|| EarshotError::ModelParse {
            url: defaults::MODEL_DOCUMENT.to_string(),
            message: format!("non-numeric input dimension {value}"),
        })? as usize;
        input_len *= dim;
        dims += 1;
    }

    if dims == 0 {
        return Err(EarshotError::ModelParse {
            url: defaults::MODEL_DOCUMENT.to_string(),
            message: "batch_input_shape has no input dimensions".to_string(),
        });
    }
    Ok(input_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA_FIXTURE: &str = r#"{
        "tfjsSpeechCommandsVersion": "0.4.0",
        "modelName": "tm-my-audio-model",
        "timeStamp": "2021-03-02T10:12:01.000Z",
        "wordLabels": ["_background_noise_", "clap", "snap"]
    }"#;

    const MODEL_FIXTURE: &str = r#"{
        "modelTopology": {
            "class_name": "Sequential",
            "config": {
                "name": "sequential_1",
                "layers": [
                    {
                        "class_name": "Conv2D",
                        "config": {
                            "batch_input_shape": [null, 43, 232, 1],
                            "filters": 8
                        }
                    }
                ]
            }
        },
        "weightsManifest": []
    }"#;

    #[test]
    fn test_parse_word_labels() {
        let labels = parse_word_labels(METADATA_FIXTURE).unwrap();
        assert_eq!(labels, vec!["_background_noise_", "clap", "snap"]);
    }

    #[test]
    fn test_parse_word_labels_missing_field() {
        let result = parse_word_labels(r#"{"modelName": "x"}"#);
        assert!(matches!(result, Err(EarshotError::LabelsMissing)));
    }

    #[test]
    fn test_parse_word_labels_empty_list() {
        let result = parse_word_labels(r#"{"wordLabels": []}"#);
        assert!(matches!(result, Err(EarshotError::LabelsMissing)));
    }

    #[test]
    fn test_parse_word_labels_invalid_json() {
        assert!(matches!(
            parse_word_labels("not json"),
            Err(EarshotError::ModelParse { .. })
        ));
    }

    #[test]
    fn test_parse_input_len() {
        // 43 × 232 × 1 — the spectrogram shape behind the default frame size.
        assert_eq!(parse_input_len(MODEL_FIXTURE).unwrap(), 9976);
    }

    #[test]
    fn test_parse_input_len_matches_default_frame() {
        let payload_floats =
            defaults::FRAME_BYTES / size_of::<f32>() - defaults::FRAME_METADATA_FLOATS;
        assert_eq!(parse_input_len(MODEL_FIXTURE).unwrap(), payload_floats);
    }

    #[test]
    fn test_parse_input_len_missing_shape() {
        let result = parse_input_len(r#"{"modelTopology": {}}"#);
        assert!(matches!(result, Err(EarshotError::ModelParse { .. })));
    }

    #[test]
    fn test_parse_input_len_non_numeric_dimension() {
        let doc = r#"{
            "modelTopology": {"config": {"layers": [
                {"config": {"batch_input_shape": [null, "wide"]}}
            ]}}
        }"#;
        assert!(matches!(
            parse_input_len(doc),
            Err(EarshotError::ModelParse { .. })
        ));
    }

    #[test]
    fn test_parse_input_len_batch_only_shape() {
        let doc = r#"{
            "modelTopology": {"config": {"layers": [
                {"config": {"batch_input_shape": [null]}}
            ]}}
        }"#;
        assert!(matches!(
            parse_input_len(doc),
            Err(EarshotError::ModelParse { .. })
        ));
    }

    #[test]
    fn test_document_urls_concatenate() {
        let base = "https://teachablemachine.withgoogle.com/models/abc123/";
        assert_eq!(
            format!("{base}{}", defaults::MODEL_DOCUMENT),
            "https://teachablemachine.withgoogle.com/models/abc123/model.json"
        );
        assert_eq!(
            format!("{base}{}", defaults::METADATA_DOCUMENT),
            "https://teachablemachine.withgoogle.com/models/abc123/metadata.json"
        );
    }
}
