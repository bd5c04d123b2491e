//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as parameters:
//! - `TitleBar`: Top status bar showing theme, transcript and status
//! - `MessageBubble`: One conversation message as a bordered bubble
//! - `LoadingIndicator`: "Thinking..." placeholder while a reply is pending
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `MessageList`: Scrollable conversation view with layout caching, hover
//!   and selection. Its persistent half, `MessageListState`, handles events
//!   and emits `MessageAction`s for the event loop to carry out.
//!
//! Components receive external data as props, not by reaching into global
//! state:
//!
//! ```rust,ignore
//! // Dependencies are explicit
//! MessageList::new(&mut tui.message_list, &app.conversation, app.theme, frame_no)
//!     .render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message.rs       (Single message renderer)
//! ├── loading.rs       (Loading indicator)
//! └── message_list.rs  (Scrollable message container)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod loading;
pub mod message;
pub mod message_list;
pub use loading::LoadingIndicator;
pub use message::{HitTarget, MessageAction, MessageBubble};
pub use message_list::{ListEntry, MessageList, MessageListState};
