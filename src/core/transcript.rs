//! # Transcript Loading
//!
//! Stand-in for the external conversation store: a JSON file holding a
//! snapshot of the conversation. With `--watch`, a background task re-reads
//! the file whenever its mtime changes and hands the new snapshot to the
//! event loop.
//!
//! Two shapes are accepted:
//!
//! ```text
//! { "messages": [ {...}, ... ], "is_loading": true }
//! [ {...}, ... ]                                  // not loading
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::action::Action;
use crate::core::conversation::{Conversation, Message};

#[derive(Debug)]
pub enum TranscriptError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::Io(e) => write!(f, "transcript I/O error: {e}"),
            TranscriptError::Parse(e) => write!(f, "transcript parse error: {e}"),
        }
    }
}

impl std::error::Error for TranscriptError {}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Snapshot {
        #[serde(default)]
        messages: Vec<Message>,
        #[serde(default, alias = "isLoading")]
        is_loading: bool,
    },
    Bare(Vec<Message>),
}

pub fn parse_transcript(json: &str) -> Result<Conversation, TranscriptError> {
    let file: TranscriptFile = serde_json::from_str(json).map_err(TranscriptError::Parse)?;
    Ok(match file {
        TranscriptFile::Snapshot {
            messages,
            is_loading,
        } => Conversation::new(messages, is_loading),
        TranscriptFile::Bare(messages) => Conversation::new(messages, false),
    })
}

pub fn load_transcript(path: &Path) -> Result<Conversation, TranscriptError> {
    let contents = std::fs::read_to_string(path).map_err(TranscriptError::Io)?;
    let conversation = parse_transcript(&contents)?;
    info!(
        "Loaded transcript {} ({} messages, loading={})",
        path.display(),
        conversation.messages().len(),
        conversation.is_loading()
    );
    Ok(conversation)
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .ok()
}

/// Poll `path` every `interval` and send a fresh snapshot when it changes.
///
/// The task ends when the receiving side of `tx` is dropped.
pub fn spawn_watcher(
    path: PathBuf,
    interval: Duration,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    info!(
        "Watching transcript {} every {}ms",
        path.display(),
        interval.as_millis()
    );
    tokio::spawn(async move {
        let mut last_seen = modified_at(&path).await;
        loop {
            tokio::time::sleep(interval).await;

            let current = modified_at(&path).await;
            if current == last_seen {
                continue;
            }
            last_seen = current;

            let action = if current.is_none() {
                warn!("Transcript {} disappeared", path.display());
                let gone = io::Error::new(io::ErrorKind::NotFound, "transcript file was removed");
                Action::TranscriptFailed(TranscriptError::Io(gone).to_string())
            } else {
                debug!("Transcript {} changed on disk", path.display());
                reload(&path).await
            };

            if tx.send(action).is_err() {
                debug!("Transcript watcher stopping: receiver dropped");
                return;
            }
        }
    })
}

/// Read and parse the transcript after a change on disk.
async fn reload(path: &Path) -> Action {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => match parse_transcript(&contents) {
            Ok(conversation) => Action::ConversationLoaded(conversation),
            Err(e) => {
                warn!("Failed to reload {}: {}", path.display(), e);
                Action::TranscriptFailed(e.to_string())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            Action::TranscriptFailed(TranscriptError::Io(e).to_string())
        }
    }
}
