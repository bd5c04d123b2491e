//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::Theme;
use crate::core::conversation::{Message, Source};
use crate::platform::{Clipboard, ClipboardError, LinkOpener};

/// Records every clipboard write in order.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: String) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(text);
        Ok(())
    }
}

/// A clipboard that rejects every write.
pub struct FailingClipboard;

#[async_trait]
impl Clipboard for FailingClipboard {
    async fn write_text(&self, _text: String) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable("no display".into()))
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkOpener for RecordingOpener {
    async fn open(&self, url: String) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url);
        Ok(())
    }
}

pub struct FailingOpener;

#[async_trait]
impl LinkOpener for FailingOpener {
    async fn open(&self, _url: String) -> std::io::Result<()> {
        Err(std::io::Error::other("no browser"))
    }
}

/// Creates a test App with the default theme and no transcript.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Theme::default())
}

pub fn doc_source() -> Source {
    Source {
        title: "Doc".into(),
        url: "https://x".into(),
    }
}

/// A short user/assistant exchange with one cited source.
pub fn sample_messages() -> Vec<Message> {
    vec![
        Message::user("How do I upload a file?"),
        Message::assistant("Use `storacha up`:\n\n```sh\nstoracha up ./photo.png\n```")
            .with_sources(vec![doc_source()]),
    ]
}
