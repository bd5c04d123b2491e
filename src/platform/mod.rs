//! # Platform Seams
//!
//! The host primitives the view calls into: the system clipboard and the
//! default browser. Both are traits so tests can record calls instead of
//! touching the desktop, and both are fire-and-forget from the UI's side:
//! failures are logged, never returned to the render loop.

pub mod browser;
pub mod clipboard;

pub use browser::{LinkOpener, SystemBrowser, open_in_background};
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard, copy_in_background};
