//! # TitleBar Component
//!
//! Top status bar: app name, active theme, transcript, status message, and a
//! "↓ New" indicator when there's content below the viewport.
//!
//! TitleBar is purely presentational. It receives all data as props (struct
//! fields) and has no internal state. The props come from different places:
//! `theme`, `transcript` and `status_message` from the core `App`,
//! `has_unseen_content` from the message list's scroll position.
//!
//! ## Conditional Formatting
//!
//! 1. **Unseen content**: `"Racha · dark · chat.json | 4 messages | ↓ New"`
//! 2. **Status message**: `"Racha · dark · chat.json | 4 messages"`
//! 3. **Default**: `"Racha · dark · chat.json"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::theme::Preset;

pub struct TitleBar<'a> {
    pub theme_label: &'a str,
    pub transcript_label: &'a str,
    pub status_message: &'a str,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
    pub preset: &'a Preset,
}

impl<'a> TitleBar<'a> {
    pub fn new(
        theme_label: &'a str,
        transcript_label: &'a str,
        status_message: &'a str,
        has_unseen_content: bool,
        preset: &'a Preset,
    ) -> Self {
        Self {
            theme_label,
            transcript_label,
            status_message,
            has_unseen_content,
            preset,
        }
    }

    pub fn title_text(&self) -> String {
        let head = format!("Racha · {} · {}", self.theme_label, self.transcript_label);
        if self.has_unseen_content {
            format!("{head} | {} | ↓ New", self.status_message)
        } else if self.status_message.is_empty() {
            head
        } else {
            format!("{head} | {}", self.status_message)
        }
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = Style::default()
            .fg(self.preset.primary)
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Line::from(Span::styled(self.title_text(), style)), area);
    }
}
