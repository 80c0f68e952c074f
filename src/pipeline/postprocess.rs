//! Postprocessing: rank raw model scores and shape them for output.
//!
//! Scores are ranked exactly as the model returned them — no softmax or
//! other normalization is applied before sorting.

use crate::config::{OutputConfig, OutputMode};
use crate::error::{EarshotError, Result};
use crate::pipeline::types::Prediction;

/// The shaped output for one frame: the predictions to emit plus the
/// human-readable summary for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Shaped {
    pub predictions: Vec<Prediction>,
    pub summary: String,
}

/// Pairs each score with its label and sorts descending by score.
///
/// Ties break toward the lower original index, so the ordering is
/// deterministic regardless of the sort algorithm underneath.
pub fn rank(scores: &[f32], labels: &[String]) -> Result<Vec<Prediction>> {
    if scores.len() != labels.len() {
        return Err(EarshotError::ScoreLabelMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }
    if scores.is_empty() {
        return Err(EarshotError::EmptyScores);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    Ok(order
        .into_iter()
        .map(|i| Prediction {
            class: labels[i].clone(),
            score: scores[i],
        })
        .collect())
}

/// Applies the configured output mode to a ranked prediction list.
///
/// The summary always names the top-ranked prediction before any filtering;
/// with threshold filtering it may describe a prediction that the emitted
/// `all` set no longer contains. When filtering leaves nothing, the summary
/// reports the threshold instead and the prediction list is empty — the
/// caller treats that as "no qualifying prediction", not an error.
pub fn shape(mut ranked: Vec<Prediction>, output: &OutputConfig) -> Shaped {
    let summary = match ranked.first() {
        Some(best) => format!("{:.0}% - {}", best.score * 100.0, best.class),
        None => {
            return Shaped {
                predictions: ranked,
                summary: String::new(),
            };
        }
    };

    match output.mode {
        OutputMode::Best => {
            ranked.truncate(1);
            Shaped {
                predictions: ranked,
                summary,
            }
        }
        OutputMode::All => {
            if output.active_threshold {
                let cutoff = f32::from(output.threshold) / 100.0;
                ranked.retain(|p| p.score > cutoff);
            }
            if output.active_max_results {
                ranked.truncate(output.max_results);
            }
            if ranked.is_empty() {
                return Shaped {
                    predictions: ranked,
                    summary: format!("score < {}%", output.threshold),
                };
            }
            Shaped {
                predictions: ranked,
                summary,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ranked_fixture() -> Vec<Prediction> {
        rank(&[0.1, 0.9, 0.4], &labels(&["a", "b", "c"])).unwrap()
    }

    fn all_mode(
        active_threshold: bool,
        threshold: u8,
        active_max_results: bool,
        max_results: usize,
    ) -> OutputConfig {
        OutputConfig {
            mode: OutputMode::All,
            active_threshold,
            threshold,
            active_max_results,
            max_results,
        }
    }

    // ── rank ─────────────────────────────────────────────────────────────

    #[test]
    fn test_rank_orders_descending() {
        let ranked = ranked_fixture();
        assert_eq!(
            ranked,
            vec![
                Prediction {
                    class: "b".to_string(),
                    score: 0.9
                },
                Prediction {
                    class: "c".to_string(),
                    score: 0.4
                },
                Prediction {
                    class: "a".to_string(),
                    score: 0.1
                },
            ]
        );
    }

    #[test]
    fn test_rank_tie_breaks_by_original_index() {
        let ranked = rank(&[0.5, 0.5, 0.5], &labels(&["x", "y", "z"])).unwrap();
        let classes: Vec<&str> = ranked.iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_rank_single_class() {
        let ranked = rank(&[0.7], &labels(&["only"])).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].class, "only");
    }

    #[test]
    fn test_rank_length_mismatch_is_error() {
        let result = rank(&[0.1, 0.2], &labels(&["a", "b", "c"]));
        assert!(matches!(
            result,
            Err(EarshotError::ScoreLabelMismatch {
                scores: 2,
                labels: 3
            })
        ));
    }

    #[test]
    fn test_rank_empty_is_error() {
        assert!(matches!(rank(&[], &[]), Err(EarshotError::EmptyScores)));
    }

    #[test]
    fn test_rank_handles_nan_without_panic() {
        let ranked = rank(&[f32::NAN, 0.5], &labels(&["bad", "good"])).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    // ── shape: best mode ─────────────────────────────────────────────────

    #[test]
    fn test_best_mode_returns_top_prediction() {
        let output = OutputConfig::default();
        let shaped = shape(ranked_fixture(), &output);
        assert_eq!(shaped.predictions.len(), 1);
        assert_eq!(shaped.predictions[0].class, "b");
        assert_eq!(shaped.summary, "90% - b");
    }

    #[test]
    fn test_best_mode_ignores_threshold_and_max_results() {
        let mut output = all_mode(true, 99, true, 0);
        output.mode = OutputMode::Best;
        let shaped = shape(ranked_fixture(), &output);
        assert_eq!(shaped.predictions.len(), 1);
        assert_eq!(shaped.predictions[0].class, "b");
    }

    // ── shape: all mode ──────────────────────────────────────────────────

    #[test]
    fn test_all_mode_unfiltered_keeps_everything() {
        let shaped = shape(ranked_fixture(), &all_mode(false, 50, false, 1));
        assert_eq!(shaped.predictions.len(), 3);
        assert_eq!(shaped.summary, "90% - b");
    }

    #[test]
    fn test_all_mode_threshold_filters() {
        let shaped = shape(ranked_fixture(), &all_mode(true, 50, false, 0));
        assert_eq!(shaped.predictions.len(), 1);
        assert_eq!(shaped.predictions[0].class, "b");
        assert_eq!(shaped.summary, "90% - b");
    }

    #[test]
    fn test_all_mode_threshold_is_strict() {
        // A score exactly at the cutoff is dropped (filter keeps score > cutoff).
        let ranked = rank(&[0.5, 0.8], &labels(&["edge", "top"])).unwrap();
        let shaped = shape(ranked, &all_mode(true, 50, false, 0));
        let classes: Vec<&str> = shaped.predictions.iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["top"]);
    }

    #[test]
    fn test_all_mode_max_results_truncates() {
        let shaped = shape(ranked_fixture(), &all_mode(false, 50, true, 1));
        assert_eq!(shaped.predictions.len(), 1);
        assert_eq!(shaped.predictions[0].class, "b");
    }

    #[test]
    fn test_all_mode_threshold_then_max_results() {
        let shaped = shape(ranked_fixture(), &all_mode(true, 85, true, 5));
        assert_eq!(shaped.predictions.len(), 1);
        assert_eq!(shaped.predictions[0].class, "b");
    }

    #[test]
    fn test_all_mode_threshold_above_top_yields_empty() {
        let shaped = shape(ranked_fixture(), &all_mode(true, 95, false, 0));
        assert!(shaped.predictions.is_empty());
        assert_eq!(shaped.summary, "score < 95%");
    }

    #[test]
    fn test_summary_percentage_rounds() {
        let ranked = rank(&[0.874], &labels(&["snap"])).unwrap();
        let shaped = shape(ranked, &OutputConfig::default());
        assert_eq!(shaped.summary, "87% - snap");
    }

    #[test]
    fn test_shape_empty_input_is_empty() {
        let shaped = shape(Vec::new(), &OutputConfig::default());
        assert!(shaped.predictions.is_empty());
        assert!(shaped.summary.is_empty());
    }

    #[test]
    fn test_all_mode_max_results_zero() {
        let shaped = shape(ranked_fixture(), &all_mode(false, 50, true, 0));
        assert!(shaped.predictions.is_empty());
        assert_eq!(shaped.summary, "score < 50%");
    }
}
