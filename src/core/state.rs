//! # Application State
//!
//! Core state for Racha. Presentation state (scroll offsets, hover, layout
//! caches) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── conversation: Conversation     // current snapshot from the store
//! ├── theme: Theme                   // active style preset
//! ├── status_message: String         // title bar text
//! ├── error: Option<String>          // fatal load error, replaces the list
//! └── transcript_path: Option<PathBuf>
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;

use crate::Theme;
use crate::core::config::ResolvedConfig;
use crate::core::conversation::Conversation;

pub struct App {
    pub conversation: Conversation,
    pub theme: Theme,
    pub status_message: String,
    pub error: Option<String>,
    pub transcript_path: Option<PathBuf>,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            conversation: Conversation::default(),
            theme,
            status_message: String::from("Welcome to Racha!"),
            error: None,
            transcript_path: None,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut app = Self::new(config.theme);
        app.transcript_path = config.transcript.clone();
        app
    }

    /// File name shown in the title bar.
    pub fn transcript_label(&self) -> String {
        self.transcript_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("no transcript"))
    }
}
