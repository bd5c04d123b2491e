//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core `Action`s or
//! `MessageAction`s.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (reply pending): draws every ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events, watcher updates,
//!   or terminal resize.
//!
//! `MessageListState::observe` runs right before every draw, so a new
//! conversation snapshot is scrolled into view on the frame that first
//! shows it.

pub mod component;
pub mod components;
pub mod event;
pub mod markdown;
pub mod theme;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::transcript::{load_transcript, spawn_watcher};
use crate::platform::{
    Clipboard, LinkOpener, SystemBrowser, SystemClipboard, copy_in_background, open_in_background,
};
use crate::tui::component::EventHandler;
use crate::tui::components::{MessageAction, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    /// Whether there's content below the viewport (title bar indicator)
    pub has_unseen_content: bool,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            has_unseen_content: false,
        }
    }
}

/// Host services a `MessageAction` may need.
#[derive(Clone)]
pub struct Platform {
    pub clipboard: Arc<dyn Clipboard>,
    pub opener: Arc<dyn LinkOpener>,
}

impl Platform {
    pub fn system() -> Self {
        Self {
            clipboard: Arc::new(SystemClipboard::new()),
            opener: Arc::new(SystemBrowser),
        }
    }
}

/// Carry out a message affordance. Copy and open run in the background;
/// the returned handle is only useful to tests.
pub fn perform(action: MessageAction, platform: &Platform) -> Option<tokio::task::JoinHandle<()>> {
    match action {
        MessageAction::Copy(text) => {
            info!("Copy requested ({} bytes)", text.len());
            Some(copy_in_background(platform.clipboard.clone(), text))
        }
        MessageAction::OpenSource(url) => {
            info!("Opening source {}", url);
            Some(open_in_background(platform.opener.clone(), url))
        }
        MessageAction::Edit(id) => {
            info!("Edit requested for message {}", id);
            None
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse capture)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new();
    let platform = Platform::system();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    if let Some(path) = app.transcript_path.clone() {
        match load_transcript(&path) {
            Ok(conversation) => {
                update(&mut app, Action::ConversationLoaded(conversation));
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                app.error = Some(format!("{}: {}", path.display(), e));
            }
        }
        if config.watch {
            spawn_watcher(path, config.watch_interval, tx.clone());
        }
    } else if config.watch {
        warn!("--watch given without a transcript; nothing to watch");
    }

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Animation timer
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.conversation.is_loading();
        if animating {
            needs_redraw = true;
        }

        // Only draw when something changed
        if needs_redraw {
            tui.message_list.observe(&app.conversation);
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                // Resize just needs a redraw (already flagged above)
                TuiEvent::Resize => {}
                TuiEvent::Quit => {
                    if update(&mut app, Action::Quit) == Effect::Quit {
                        should_quit = true;
                    }
                }
                TuiEvent::CycleTheme => {
                    update(&mut app, Action::CycleTheme);
                }
                other => {
                    if let Some(action) = tui.message_list.handle_event(&other) {
                        perform(action, &platform);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions (transcript reloads)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if update(&mut app, action) == Effect::Quit {
                should_quit = true;
            }
        }

        if should_quit {
            break;
        }
    }

    info!("Racha shutting down");
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingClipboard, RecordingClipboard, RecordingOpener};

    fn platform(clipboard: Arc<dyn Clipboard>, opener: Arc<dyn LinkOpener>) -> Platform {
        Platform { clipboard, opener }
    }

    #[tokio::test]
    async fn copy_action_writes_exact_text() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let opener = Arc::new(RecordingOpener::default());
        let p = platform(clipboard.clone(), opener.clone());

        for _ in 0..2 {
            perform(MessageAction::Copy("fn main() {}".into()), &p)
                .unwrap()
                .await
                .unwrap();
        }
        assert_eq!(clipboard.writes(), vec!["fn main() {}", "fn main() {}"]);
        assert!(opener.opened().is_empty());
    }

    #[tokio::test]
    async fn open_action_goes_through_link_opener() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let opener = Arc::new(RecordingOpener::default());
        let p = platform(clipboard.clone(), opener.clone());

        perform(MessageAction::OpenSource("https://x".into()), &p)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(opener.opened(), vec!["https://x"]);
        assert!(clipboard.writes().is_empty());
    }

    #[tokio::test]
    async fn edit_action_is_logged_only() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let opener = Arc::new(RecordingOpener::default());
        let p = platform(clipboard.clone(), opener.clone());

        assert!(perform(MessageAction::Edit("42".into()), &p).is_none());
        assert!(clipboard.writes().is_empty());
        assert!(opener.opened().is_empty());
    }

    #[tokio::test]
    async fn clipboard_failure_does_not_surface() {
        let p = platform(Arc::new(FailingClipboard), Arc::new(RecordingOpener::default()));
        let handle = perform(MessageAction::Copy("text".into()), &p).unwrap();
        assert!(handle.await.is_ok());
    }
}
