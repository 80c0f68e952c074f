//! Feature feed: the external extractor process and its byte stream.
//!
//! The extractor is spawned once at pipeline start. Its stdout carries the
//! raw frame bytes; its stderr carries diagnostic text. Both are forwarded
//! into one ordered event channel, and the process is killed on close.

use crate::defaults;
use crate::error::{EarshotError, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Events produced by the feature feed, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A chunk of raw frame bytes from the extractor's stdout.
    Chunk(Vec<u8>),
    /// A line from the extractor's stderr.
    Stderr(String),
    /// The extractor's stdout reached end of file.
    Closed,
}

/// Handle to a running feature extractor process.
pub struct FeatureFeed {
    child: Child,
}

impl FeatureFeed {
    /// Spawn the extractor and start forwarding its output.
    ///
    /// Returns the feed handle and the receiver for its events. The
    /// receiver drains when both output streams have ended.
    pub fn spawn(command: &str, args: &[String]) -> Result<(Self, mpsc::Receiver<FeedEvent>)> {
        if command.is_empty() {
            return Err(EarshotError::ConfigInvalidValue {
                key: "feed.command".to_string(),
                message: "no extractor command configured".to_string(),
            });
        }

        let mut child = Command::new(command)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EarshotError::FeedSpawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let (tx, rx) = mpsc::channel(defaults::CHANNEL_CAPACITY);

        if let Some(mut stdout) = child.stdout.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; defaults::FEED_READ_BYTES];
                loop {
                    match stdout.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if tx.send(FeedEvent::Chunk(buf[..n].to_vec())).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                tx.send(FeedEvent::Closed).await.ok();
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send(FeedEvent::Stderr(line)).await.is_err() {
                        return;
                    }
                }
            });
        }

        Ok((Self { child }, rx))
    }

    /// Process id of the extractor, if it is still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the extractor process and reap it. Called on pipeline close.
    pub async fn shutdown(&mut self) {
        self.child.start_kill().ok();
        self.child.wait().await.ok();
    }
}
