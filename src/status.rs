//! Lifecycle status reporting for the classification pipeline.
//!
//! The pipeline never logs directly; it hands `StatusEvent`s and warnings to
//! a `StatusSink` so the embedding application decides how to surface them.

use std::sync::Mutex;

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Pipeline lifecycle events delivered to a status sink.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// The model is being loaded for the first time.
    Loading,
    /// A model was already loaded and is being replaced.
    Reloading,
    /// The model is loaded and frames will be classified.
    Ready,
    /// A frame is being scored.
    Inferencing,
    /// A frame was classified; carries the best-prediction summary.
    Result(String),
    /// Model loading failed; carries the error text.
    Error(String),
    /// The pipeline was shut down.
    Closed,
}

/// Trait for receiving pipeline lifecycle events and warnings.
pub trait StatusSink: Send + Sync {
    /// Report a lifecycle transition.
    fn status(&self, event: StatusEvent);

    /// Report a non-fatal condition (buffer overflow, dropped frame,
    /// extractor stderr output).
    fn warn(&self, message: &str);
}

/// Status sink that renders events to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn status(&self, event: StatusEvent) {
        match event {
            StatusEvent::Loading => eprintln!("{YELLOW}model: loading...{RESET}"),
            StatusEvent::Reloading => eprintln!("{YELLOW}model: reloading...{RESET}"),
            StatusEvent::Ready => eprintln!("{GREEN}model: ready{RESET}"),
            StatusEvent::Inferencing => eprintln!("{DIM}inferencing...{RESET}"),
            StatusEvent::Result(text) => eprintln!("{GREEN}{text}{RESET}"),
            StatusEvent::Error(text) => eprintln!("{RED}error: {text}{RESET}"),
            StatusEvent::Closed => eprintln!("{DIM}pipeline closed{RESET}"),
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("{DIM}[warn] {message}{RESET}");
    }
}

/// Status sink that discards everything (quiet mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn status(&self, _event: StatusEvent) {}

    fn warn(&self, _message: &str) {}
}

/// Status sink that records events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingStatus {
    events: Mutex<Vec<StatusEvent>>,
    warnings: Mutex<Vec<String>>,
}

impl CollectingStatus {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded lifecycle events.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Returns a snapshot of the recorded warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl StatusSink for CollectingStatus {
    fn status(&self, event: StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn warn(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_status_records_events() {
        let sink = CollectingStatus::new();
        sink.status(StatusEvent::Loading);
        sink.status(StatusEvent::Ready);
        sink.status(StatusEvent::Result("90% - snap".to_string()));

        assert_eq!(
            sink.events(),
            vec![
                StatusEvent::Loading,
                StatusEvent::Ready,
                StatusEvent::Result("90% - snap".to_string()),
            ]
        );
    }

    #[test]
    fn test_collecting_status_records_warnings() {
        let sink = CollectingStatus::new();
        sink.warn("frame buffer overfull, resetting");
        assert_eq!(sink.warnings(), vec!["frame buffer overfull, resetting"]);
    }

    #[test]
    fn test_stderr_status_renders_all_variants() {
        // Smoke test: writes to stderr, must not panic.
        let sink = StderrStatus;
        sink.status(StatusEvent::Loading);
        sink.status(StatusEvent::Reloading);
        sink.status(StatusEvent::Ready);
        sink.status(StatusEvent::Inferencing);
        sink.status(StatusEvent::Result("72% - clap".to_string()));
        sink.status(StatusEvent::Error("fetch failed".to_string()));
        sink.status(StatusEvent::Closed);
        sink.warn("extractor: restarted stream");
    }

    #[test]
    fn test_null_status_discards() {
        let sink = NullStatus;
        sink.status(StatusEvent::Ready);
        sink.warn("dropped");
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn StatusSink>> = vec![
            Box::new(StderrStatus),
            Box::new(NullStatus),
            Box::new(CollectingStatus::new()),
        ];
        for sink in &sinks {
            sink.status(StatusEvent::Inferencing);
        }
    }
}
