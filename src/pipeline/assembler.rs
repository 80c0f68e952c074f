//! Frame assembler: turns the extractor's raw byte stream into frames.
//!
//! The stream has no delimiters; a frame is exactly `target_byte_count`
//! bytes of little-endian f32s, `[direction_of_arrival, rms, payload…]`.
//! The assembler is the sole framing boundary: partial data never leaves it.

use crate::defaults;
use crate::error::{EarshotError, Result};
use crate::pipeline::types::FeatureFrame;

/// Outcome of feeding one chunk into the assembler.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameProgress {
    /// The buffer filled to exactly the target size; a frame was decoded.
    Complete(FeatureFrame),
    /// More data is needed.
    Pending,
    /// The chunk would overshoot the frame boundary. The buffer was
    /// discarded; accumulation restarts from empty. Indicates the producer
    /// is not chunk-aligned with the frame size.
    Overflow,
}

/// Accumulates byte chunks into fixed-size feature frames.
#[derive(Debug)]
pub struct FrameAssembler {
    target: usize,
    buffer: Vec<u8>,
    filled: usize,
}

impl FrameAssembler {
    /// Creates an assembler for frames of `target_byte_count` bytes.
    ///
    /// The target must be a whole number of f32s and leave room for payload
    /// beyond the two metadata floats.
    pub fn new(target_byte_count: usize) -> Result<Self> {
        let float_bytes = size_of::<f32>();
        if target_byte_count % float_bytes != 0 {
            return Err(EarshotError::ConfigInvalidValue {
                key: "feed.frame_bytes".to_string(),
                message: format!("must be a multiple of {float_bytes}"),
            });
        }
        if target_byte_count <= defaults::FRAME_METADATA_FLOATS * float_bytes {
            return Err(EarshotError::ConfigInvalidValue {
                key: "feed.frame_bytes".to_string(),
                message: "must leave room for payload after the metadata floats".to_string(),
            });
        }
        Ok(Self {
            target: target_byte_count,
            buffer: vec![0; target_byte_count],
            filled: 0,
        })
    }

    /// Number of bytes accumulated toward the current frame.
    pub fn fill_level(&self) -> usize {
        self.filled
    }

    /// Frame size this assembler was configured for.
    pub fn target_byte_count(&self) -> usize {
        self.target
    }

    /// Appends `chunk` to the accumulation buffer.
    ///
    /// Returns `Complete` exactly when the buffer reaches the target size,
    /// `Overflow` when the chunk would push past it (the partial frame is
    /// discarded), and `Pending` otherwise.
    pub fn consume(&mut self, chunk: &[u8]) -> FrameProgress {
        if self.filled + chunk.len() > self.target {
            self.filled = 0;
            return FrameProgress::Overflow;
        }

        self.buffer[self.filled..self.filled + chunk.len()].copy_from_slice(chunk);
        self.filled += chunk.len();

        if self.filled < self.target {
            return FrameProgress::Pending;
        }

        self.filled = 0;
        FrameProgress::Complete(self.decode_frame())
    }

    /// Reinterprets the full buffer as little-endian f32s.
    fn decode_frame(&self) -> FeatureFrame {
        let mut floats = Vec::with_capacity(self.target / size_of::<f32>());
        for word in self.buffer.chunks_exact(size_of::<f32>()) {
            floats.push(f32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }
        let payload = floats.split_off(defaults::FRAME_METADATA_FLOATS);
        FeatureFrame {
            direction_of_arrival: floats[0],
            rms: floats[1],
            payload,
        }
    }
}
