//! Clipboard writes.
//!
//! `arboard` clipboards must outlive the data they offer (on X11/Wayland the
//! owning process serves paste requests), so `SystemClipboard` keeps one
//! instance alive on a dedicated thread and feeds it requests over a channel.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened (headless session, missing display).
    Unavailable(String),
    /// The clipboard rejected the write.
    Write(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(e) => write!(f, "clipboard unavailable: {e}"),
            ClipboardError::Write(e) => write!(f, "clipboard write failed: {e}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError>;
}

type WriteRequest = (String, oneshot::Sender<Result<(), ClipboardError>>);

/// The desktop clipboard, owned by a background thread.
pub struct SystemClipboard {
    requests: mpsc::Sender<WriteRequest>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<WriteRequest>();
        std::thread::spawn(move || {
            // Opened lazily so a missing display only fails the first write.
            let mut clipboard: Option<arboard::Clipboard> = None;
            for (text, reply) in rx {
                let result = match clipboard.as_mut() {
                    Some(cb) => cb.set_text(text).map_err(|e| ClipboardError::Write(e.to_string())),
                    None => match arboard::Clipboard::new() {
                        Ok(mut cb) => {
                            let result = cb
                                .set_text(text)
                                .map_err(|e| ClipboardError::Write(e.to_string()));
                            clipboard = Some(cb);
                            result
                        }
                        Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
                    },
                };
                let _ = reply.send(result);
            }
            debug!("Clipboard thread exiting");
        });
        Self { requests: tx }
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send((text, reply_tx))
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| ClipboardError::Unavailable("clipboard thread stopped".into()))?
    }
}

/// Write `text` to the clipboard without waiting for the result.
///
/// The returned handle is only useful to tests; the UI drops it.
pub fn copy_in_background(clipboard: Arc<dyn Clipboard>, text: String) -> tokio::task::JoinHandle<()> {
    let len = text.chars().count();
    tokio::spawn(async move {
        match clipboard.write_text(text).await {
            Ok(()) => debug!("Copied {} chars to clipboard", len),
            Err(e) => warn!("{}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingClipboard, RecordingClipboard};

    #[tokio::test]
    async fn copy_in_background_writes_exact_text() {
        let clipboard = Arc::new(RecordingClipboard::default());
        copy_in_background(clipboard.clone(), "fn main() {}".into())
            .await
            .unwrap();
        assert_eq!(clipboard.writes(), vec!["fn main() {}".to_string()]);
    }

    #[tokio::test]
    async fn repeated_copies_write_the_same_value() {
        let clipboard = Arc::new(RecordingClipboard::default());
        for _ in 0..3 {
            copy_in_background(clipboard.clone(), "same".into())
                .await
                .unwrap();
        }
        assert_eq!(clipboard.writes(), vec!["same"; 3]);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let clipboard: Arc<dyn Clipboard> = Arc::new(FailingClipboard);
        // The task itself must complete normally; the error only hits the log.
        let outcome = copy_in_background(clipboard, "lost".into()).await;
        assert!(outcome.is_ok());
    }

    #[test]
    fn error_display_names_the_failure() {
        let err = ClipboardError::Unavailable("no display".into());
        assert_eq!(err.to_string(), "clipboard unavailable: no display");
        let err = ClipboardError::Write("denied".into());
        assert_eq!(err.to_string(), "clipboard write failed: denied");
    }
}
