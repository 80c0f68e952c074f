//! Streaming classification pipeline.
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌──────────┐    ┌────────┐    ┌─────────────┐
//! │  Feature  │───▶│   Frame   │───▶│ Dispatch │───▶│ Scorer │───▶│ Postprocess │───▶ emit
//! │   Feed    │    │ Assembler │    │   Gate   │    │(async) │    │ rank/shape  │
//! └───────────┘    └───────────┘    └──────────┘    └────────┘    └─────────────┘
//!                        │                │
//!                        ▼                ▼
//!                  overflow reset    drop while busy
//! ```

pub mod assembler;
pub mod controller;
pub mod dispatch;
pub mod postprocess;
pub mod types;

pub use assembler::{FrameAssembler, FrameProgress};
pub use controller::{Pipeline, PipelineState};
pub use dispatch::{DispatchGate, DispatchPermit};
pub use postprocess::{Shaped, rank, shape};
pub use types::{Classification, FeatureFrame, Prediction, ScoreVector};
