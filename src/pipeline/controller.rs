//! Pipeline controller: ties framing, dispatch, scoring, and shaping
//! together over the feed's event stream.
//!
//! One loop consumes feed events in arrival order. Completed frames pass
//! the dispatch gate and run their inference + postprocess cycle in a
//! spawned task, so chunk arrival keeps draining while a classification is
//! in flight — frames that complete during that window are dropped.

use crate::config::{Config, OutputConfig};
use crate::defaults;
use crate::error::{EarshotError, Result};
use crate::feed::FeedEvent;
use crate::model::scorer::Scorer;
use crate::model::{ModelHandle, ModelManager};
use crate::pipeline::assembler::{FrameAssembler, FrameProgress};
use crate::pipeline::dispatch::DispatchGate;
use crate::pipeline::postprocess::{rank, shape};
use crate::pipeline::types::{Classification, FeatureFrame};
use crate::status::{StatusEvent, StatusSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc;

/// Lifecycle state of the pipeline, owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Loading,
    Ready,
    Inferencing,
    Error,
    Closed,
}

impl PipelineState {
    fn as_raw(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Loading => 1,
            Self::Ready => 2,
            Self::Inferencing => 3,
            Self::Error => 4,
            Self::Closed => 5,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialized,
            1 => Self::Loading,
            2 => Self::Ready,
            3 => Self::Inferencing,
            4 => Self::Error,
            _ => Self::Closed,
        }
    }
}

/// State cell shared with the in-flight classification task.
///
/// Only controller code writes to it; the atomic is for visibility across
/// the spawned per-frame cycle, not for contended mutation.
#[derive(Clone)]
struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new(state: PipelineState) -> Self {
        Self(Arc::new(AtomicU8::new(state.as_raw())))
    }

    fn set(&self, state: PipelineState) {
        self.0.store(state.as_raw(), Ordering::SeqCst);
    }

    fn get(&self) -> PipelineState {
        PipelineState::from_raw(self.0.load(Ordering::SeqCst))
    }
}

/// The classification pipeline.
pub struct Pipeline {
    assembler: FrameAssembler,
    gate: DispatchGate,
    manager: ModelManager,
    model: Option<Arc<ModelHandle>>,
    output: OutputConfig,
    state: StateCell,
    status: Arc<dyn StatusSink>,
    sink: mpsc::Sender<Classification>,
}

impl Pipeline {
    /// Build a pipeline from configuration.
    ///
    /// Returns the pipeline and the receiver for emitted classifications.
    pub fn new(
        config: &Config,
        status: Arc<dyn StatusSink>,
    ) -> Result<(Self, mpsc::Receiver<Classification>)> {
        config.validate()?;
        let assembler = FrameAssembler::new(config.feed.frame_bytes)?;
        let (sink, rx) = mpsc::channel(defaults::CHANNEL_CAPACITY);
        Ok((
            Self {
                assembler,
                gate: DispatchGate::new(),
                manager: ModelManager::from_mode(config.model.mode),
                model: None,
                output: config.output.clone(),
                state: StateCell::new(PipelineState::Uninitialized),
                status,
                sink,
            },
            rx,
        ))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// Number of input values a frame payload carries.
    pub fn frame_payload_len(&self) -> usize {
        self.assembler.target_byte_count() / size_of::<f32>() - defaults::FRAME_METADATA_FLOATS
    }

    /// Load (or reload) the model from `base_url`, pairing it with `scorer`.
    ///
    /// On failure the pipeline reports an ERROR status and stays non-ready
    /// until a later load succeeds; the error is also returned.
    pub async fn load_model(&mut self, base_url: &str, scorer: Arc<dyn Scorer>) -> Result<()> {
        let reloading = self.model.is_some();
        self.state.set(PipelineState::Loading);
        self.status.status(if reloading {
            StatusEvent::Reloading
        } else {
            StatusEvent::Loading
        });

        match self.manager.load(base_url, scorer).await {
            Ok(handle) => self.install_model(handle),
            Err(err) => {
                self.state.set(PipelineState::Error);
                self.status.status(StatusEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Install an already-built model handle, skipping the manager fetch.
    ///
    /// Validates the model's declared input length against the configured
    /// frame size before accepting it.
    pub fn install_model(&mut self, handle: ModelHandle) -> Result<()> {
        let expected = self.frame_payload_len();
        if handle.input_len() != expected {
            let err = EarshotError::InputShapeMismatch {
                model: handle.input_len(),
                frame: expected,
            };
            self.state.set(PipelineState::Error);
            self.status.status(StatusEvent::Error(err.to_string()));
            return Err(err);
        }
        self.model = Some(Arc::new(handle));
        self.state.set(PipelineState::Ready);
        self.status.status(StatusEvent::Ready);
        Ok(())
    }

    /// Consume feed events until the feed closes.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<FeedEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                FeedEvent::Chunk(chunk) => self.on_chunk(&chunk),
                FeedEvent::Stderr(line) => self.status.warn(&format!("extractor: {line}")),
                FeedEvent::Closed => self.status.warn("feature feed closed"),
            }
        }
    }

    /// Feed one chunk of raw bytes into the assembler.
    pub fn on_chunk(&mut self, chunk: &[u8]) {
        match self.assembler.consume(chunk) {
            FrameProgress::Pending => {}
            FrameProgress::Overflow => self.status.warn("frame buffer overfull, resetting"),
            FrameProgress::Complete(frame) => self.dispatch(frame),
        }
    }

    /// Admit a completed frame into the inference path, or drop it.
    ///
    /// Deliberately a drop policy, not a queue: classification latency may
    /// exceed the frame rate, and a stale classification has no value.
    fn dispatch(&mut self, frame: FeatureFrame) {
        if !matches!(
            self.state.get(),
            PipelineState::Ready | PipelineState::Inferencing
        ) {
            self.status.warn("model not ready, skipping frame");
            return;
        }
        let Some(model) = self.model.clone() else {
            self.status.warn("model not ready, skipping frame");
            return;
        };
        let Some(permit) = self.gate.try_acquire() else {
            self.status.warn("classification in flight, dropping frame");
            return;
        };

        let state = self.state.clone();
        let status = Arc::clone(&self.status);
        let sink = self.sink.clone();
        let output = self.output.clone();
        tokio::spawn(async move {
            classify_frame(frame, model, &output, &state, status.as_ref(), &sink).await;
            drop(permit);
        });
    }

    /// Mark the pipeline closed. Terminal; the caller shuts down the feed.
    pub fn close(&mut self) {
        self.state.set(PipelineState::Closed);
        self.status.status(StatusEvent::Closed);
    }
}

/// One inference + postprocess cycle for an admitted frame.
///
/// Every failure here is absorbed locally — warn and return to ready,
/// never propagate. An in-flight cycle is never cancelled; shutdown only
/// stops new admissions.
async fn classify_frame(
    frame: FeatureFrame,
    model: Arc<ModelHandle>,
    output: &OutputConfig,
    state: &StateCell,
    status: &dyn StatusSink,
    sink: &mpsc::Sender<Classification>,
) {
    state.set(PipelineState::Inferencing);
    status.status(StatusEvent::Inferencing);

    match model.recognize(&frame.payload).await {
        Ok(Some(scores)) => match rank(&scores, model.labels()) {
            Ok(ranked) => {
                let shaped = shape(ranked, output);
                status.status(StatusEvent::Result(shaped.summary.clone()));
                if !shaped.predictions.is_empty() {
                    let message = Classification {
                        direction_of_arrival: frame.direction_of_arrival,
                        rms: frame.rms,
                        payload: shaped.predictions,
                        classes: model.labels().to_vec(),
                    };
                    sink.send(message).await.ok();
                }
            }
            Err(err) => status.warn(&format!("discarding scores: {err}")),
        },
        Ok(None) => status.status(StatusEvent::Ready),
        Err(err) => status.warn(&format!("classification failed: {err}")),
    }

    // Shutdown may have happened mid-cycle; only restore Ready over our own
    // Inferencing marker.
    if state.get() == PipelineState::Inferencing {
        state.set(PipelineState::Ready);
    }
}
