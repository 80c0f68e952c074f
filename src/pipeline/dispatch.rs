//! Dispatch gate: at most one classification in flight.
//!
//! Frames that complete while a classification is running are dropped, not
//! queued — stale audio classifications have no value, so backpressure is
//! resolved by shedding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot admission gate for the inference path.
///
/// `try_acquire` is an atomic check-and-set, so the at-most-one invariant
/// holds even with the per-frame cycle running on another worker thread.
#[derive(Debug, Clone, Default)]
pub struct DispatchGate {
    busy: Arc<AtomicBool>,
}

/// Exclusive admission to the inference path.
///
/// Dropping the permit reopens the gate; holders keep it alive for the full
/// inference + postprocess cycle, success or failure.
#[derive(Debug)]
pub struct DispatchPermit {
    busy: Arc<AtomicBool>,
}

impl DispatchGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to admit one frame. Returns `None` while a permit is live.
    pub fn try_acquire(&self) -> Option<DispatchPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DispatchPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether a permit is currently live.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for DispatchPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
