//! Default configuration constants for earshot.
//!
//! Shared constants used across configuration types and the pipeline, kept
//! in one place so the framing contract with the extractor process is not
//! duplicated.

/// Number of bytes in one complete feature frame.
///
/// This is the byte-count contract with the extractor process: a 43×232
/// spectrogram plus the two metadata floats, as little-endian f32s
/// ((43·232 + 2) · 4). There are no delimiters on the stream; framing is
/// purely by byte count.
pub const FRAME_BYTES: usize = 39912;

/// Leading f32 values in each frame that carry metadata (direction of
/// arrival and RMS) rather than model input.
pub const FRAME_METADATA_FLOATS: usize = 2;

/// Default score threshold percentage for "all" output filtering.
pub const THRESHOLD: u8 = 50;

/// Default result-count cap for "all" output.
pub const MAX_RESULTS: usize = 3;

/// Read buffer size for the extractor's stdout.
pub const FEED_READ_BYTES: usize = 8192;

/// Capacity of the channels between feed, controller, and sink.
pub const CHANNEL_CAPACITY: usize = 100;

/// Name of the topology document fetched from the model base URL.
pub const MODEL_DOCUMENT: &str = "model.json";

/// Name of the metadata document fetched from the model base URL.
pub const METADATA_DOCUMENT: &str = "metadata.json";
