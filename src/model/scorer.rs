use crate::error::{EarshotError, Result};
use crate::pipeline::types::ScoreVector;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Trait for scoring a feature payload against a classification model.
///
/// This is the seam between the pipeline and the model runtime; swapping
/// implementations (real engine vs mock) happens here.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score one frame payload.
    ///
    /// Returns one value per class, index-aligned with the model's label
    /// list. `Ok(None)` means the model has no result for this frame (for
    /// example, it is still warming up); the pipeline skips the frame
    /// without raising an error.
    ///
    /// The payload length must match the model's expected input size; the
    /// pipeline does not reshape or pad.
    async fn recognize(&self, payload: &[f32]) -> Result<Option<ScoreVector>>;

    /// Name of the backing model, for diagnostics.
    fn name(&self) -> &str;
}

/// Implement Scorer for Arc<T> to allow sharing across tasks.
#[async_trait]
impl<T: Scorer + ?Sized> Scorer for Arc<T> {
    async fn recognize(&self, payload: &[f32]) -> Result<Option<ScoreVector>> {
        (**self).recognize(payload).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock scorer for testing
#[derive(Debug)]
pub struct MockScorer {
    name: String,
    scores: Vec<f32>,
    yield_none: bool,
    should_fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockScorer {
    /// Create a new mock scorer with default settings
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scores: vec![1.0],
            yield_none: false,
            should_fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return specific scores
    pub fn with_scores(mut self, scores: &[f32]) -> Self {
        self.scores = scores.to_vec();
        self
    }

    /// Configure the mock to yield no result (model not ready)
    pub fn with_no_result(mut self) -> Self {
        self.yield_none = true;
        self
    }

    /// Configure the mock to fail on recognize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of recognize calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scorer for MockScorer {
    async fn recognize(&self, _payload: &[f32]) -> Result<Option<ScoreVector>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(EarshotError::Inference {
                message: "mock scoring failure".to_string(),
            });
        }
        if self.yield_none {
            return Ok(None);
        }
        Ok(Some(self.scores.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
