//! # Conversation Data Model
//!
//! The read-only snapshot the view renders. An external store owns it; the
//! TUI only borrows it per frame.
//!
//! ```text
//! Conversation
//! ├── messages: Vec<Message>   // display order, oldest first
//! ├── is_loading: bool         // waiting for an assistant reply
//! └── revision: u64            // changes whenever `messages` changes
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

/// Process-wide revision counter so two snapshots never share a revision.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Who authored a message. Anything that isn't `"user"` renders on the
/// assistant side.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(from = "String")]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// A citation attached to a message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Empty when the transcript omits it; `Conversation` then keys the
    /// message by its position.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            sources: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Sources, with `None` and `Some([])` both meaning "no sources".
    pub fn sources(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Transcripts written by web clients often use numeric ids (`Date.now()`).
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// One conversation snapshot: the messages plus the loading flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    is_loading: bool,
    revision: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(Vec::new(), false)
    }
}

/// Stable across reloads of the same transcript, unlike a generated uuid.
fn positional_id(index: usize) -> String {
    format!("message-{index}")
}

impl Conversation {
    pub fn new(mut messages: Vec<Message>, is_loading: bool) -> Self {
        for (index, message) in messages.iter_mut().enumerate() {
            if message.id.is_empty() {
                message.id = positional_id(index);
            }
        }
        Self {
            messages,
            is_loading,
            revision: next_revision(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Identifies the current message sequence. Bumped on every append.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn push(&mut self, mut message: Message) {
        if message.id.is_empty() {
            message.id = positional_id(self.messages.len());
        }
        self.messages.push(message);
        self.revision = next_revision();
    }

    /// Toggling the loading flag leaves the revision alone: only the
    /// message sequence drives auto-scroll.
    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_deserializes_unknown_as_assistant() {
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn message_parses_web_shape() {
        let json = r#"{
            "id": 1718000000000,
            "type": "assistant",
            "content": "See the docs.",
            "sources": [{"title": "Doc", "url": "https://x"}]
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "1718000000000");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.sources().len(), 1);
        assert_eq!(msg.sources()[0].title, "Doc");
    }

    #[test]
    fn missing_id_is_keyed_by_position() {
        let parse = || -> Message {
            serde_json::from_str(r#"{"type":"user","content":"hi"}"#).unwrap()
        };
        let first = Conversation::new(vec![parse(), parse()], false);
        let again = Conversation::new(vec![parse(), parse()], false);

        assert_eq!(first.messages()[0].id, "message-0");
        assert_eq!(first.messages()[1].id, "message-1");
        assert_eq!(first.messages(), again.messages());
    }

    #[test]
    fn explicit_ids_are_kept() {
        let msg: Message =
            serde_json::from_str(r#"{"id":"abc","type":"user","content":"hi"}"#).unwrap();
        let convo = Conversation::new(vec![msg, Message::assistant("generated")], false);
        assert_eq!(convo.messages()[0].id, "abc");
        assert_ne!(convo.messages()[1].id, "message-1");
    }

    #[test]
    fn absent_and_empty_sources_are_equivalent() {
        let absent = Message::assistant("x");
        let empty = Message::assistant("x").with_sources(vec![]);
        assert!(absent.sources().is_empty());
        assert!(empty.sources().is_empty());
    }

    #[test]
    fn push_changes_revision_but_loading_does_not() {
        let mut convo = Conversation::default();
        let r0 = convo.revision();
        convo.set_loading(true);
        assert_eq!(convo.revision(), r0);
        convo.push(Message::user("hello"));
        assert_ne!(convo.revision(), r0);
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn distinct_snapshots_have_distinct_revisions() {
        let a = Conversation::new(vec![Message::user("a")], false);
        let b = Conversation::new(vec![Message::user("a")], false);
        assert_ne!(a.revision(), b.revision());
    }
}
