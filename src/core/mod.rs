//! # Core Application Logic
//!
//! The conversation data model, configuration, and the reducer that applies
//! incoming snapshots. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Conversation (data)  │
//!                    │  • State (app data)     │
//!                    │  • Action + update()    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │ Transcript │      │  Platform  │
//!     │  Adapter   │      │  (store)   │      │ clipboard, │
//!     │ (ratatui)  │      │            │      │  browser   │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`conversation`]: `Message`, `Source`, `Conversation`
//! - [`state`]: The `App` struct
//! - [`action`]: The `Action` enum and `update()`
//! - [`config`]: Layered settings
//! - [`transcript`]: Snapshot loading and file watching

pub mod action;
pub mod config;
pub mod conversation;
pub mod state;
pub mod transcript;
