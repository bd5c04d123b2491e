//! # Actions
//!
//! Everything that can happen to Racha's core state becomes an `Action`.
//! The transcript watcher found a new snapshot? That's
//! `Action::ConversationLoaded(conversation)`. User pressed `t`? That's
//! `Action::CycleTheme`.
//!
//! `update()` applies an action to the state and returns an `Effect` the
//! event loop should carry out. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State (+ Effect)
//! ```

use log::{debug, info, warn};

use crate::core::conversation::Conversation;
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    /// A new conversation snapshot replaces the current one.
    ConversationLoaded(Conversation),
    /// Reloading the transcript failed; the last good snapshot stays.
    TranscriptFailed(String),
    CycleTheme,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::ConversationLoaded(conversation) => {
            debug!(
                "Conversation replaced: {} -> {} messages (revision {})",
                app.conversation.messages().len(),
                conversation.messages().len(),
                conversation.revision()
            );
            app.conversation = conversation;
            app.error = None;
            app.status_message = format!("{} messages", app.conversation.messages().len());
            Effect::None
        }
        Action::TranscriptFailed(reason) => {
            warn!("Keeping previous conversation: {}", reason);
            app.status_message = format!("Reload failed: {reason}");
            Effect::None
        }
        Action::CycleTheme => {
            app.theme = app.theme.next();
            info!("Theme switched to {}", app.theme.label());
            app.status_message = format!("Theme: {}", app.theme.label());
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Theme;
    use crate::core::conversation::Message;
    use crate::test_support::test_app;

    #[test]
    fn conversation_loaded_replaces_snapshot_and_clears_error() {
        let mut app = test_app();
        app.error = Some("boom".into());
        let convo = Conversation::new(vec![Message::user("hi"), Message::assistant("hello")], false);
        let revision = convo.revision();

        assert_eq!(update(&mut app, Action::ConversationLoaded(convo)), Effect::None);
        assert_eq!(app.conversation.revision(), revision);
        assert_eq!(app.conversation.messages().len(), 2);
        assert!(app.error.is_none());
        assert_eq!(app.status_message, "2 messages");
    }

    #[test]
    fn transcript_failure_keeps_previous_messages() {
        let mut app = test_app();
        app.conversation = Conversation::new(vec![Message::user("keep me")], false);
        update(&mut app, Action::TranscriptFailed("bad json".into()));
        assert_eq!(app.conversation.messages().len(), 1);
        assert!(app.status_message.contains("bad json"));
    }

    #[test]
    fn cycle_theme_walks_all_variants() {
        let mut app = test_app();
        app.theme = Theme::Storacha;
        update(&mut app, Action::CycleTheme);
        assert_eq!(app.theme, Theme::Dark);
        update(&mut app, Action::CycleTheme);
        assert_eq!(app.theme, Theme::Light);
        update(&mut app, Action::CycleTheme);
        assert_eq!(app.theme, Theme::Storacha);
    }

    #[test]
    fn quit_yields_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
