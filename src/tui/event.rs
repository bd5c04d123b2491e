use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Core actions (passed to core::update)
    Quit,
    CycleTheme,

    // TUI-local events (handled directly in TUI)
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToBottom, // End key - also re-enables stick-to-bottom
    MouseMove(u16, u16),
    Click(u16, u16),
    SelectNext,
    SelectPrevious,
    ClearSelection,
    CopySelected,
    EditSelected,
    CopySelectedCode,
    /// Zero-based source index on the selected message (key `1` → 0).
    OpenSource(usize),
    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(ev) => map_event(ev),
        Err(e) => {
            log::warn!("Event read failed: {}", e);
            None
        }
    }
}

pub fn map_event(ev: Event) -> Option<TuiEvent> {
    match ev {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
    if key.kind != event::KeyEventKind::Press {
        return None;
    }
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::Quit),
        (_, KeyCode::Char('q')) => Some(TuiEvent::Quit),
        (_, KeyCode::Char('t')) => Some(TuiEvent::CycleTheme),
        (_, KeyCode::Char('j')) => Some(TuiEvent::SelectNext),
        (_, KeyCode::Char('k')) => Some(TuiEvent::SelectPrevious),
        (_, KeyCode::Char('c')) => Some(TuiEvent::CopySelected),
        (_, KeyCode::Char('e')) => Some(TuiEvent::EditSelected),
        (_, KeyCode::Char('y')) => Some(TuiEvent::CopySelectedCode),
        (_, KeyCode::Char(c @ '1'..='9')) => {
            Some(TuiEvent::OpenSource((c as u8 - b'1') as usize))
        }
        (_, KeyCode::Esc) => Some(TuiEvent::ClearSelection),
        (_, KeyCode::Up) => Some(TuiEvent::ScrollUp),
        (_, KeyCode::Down) => Some(TuiEvent::ScrollDown),
        (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
        (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
        (_, KeyCode::End) => Some(TuiEvent::ScrollToBottom),
        _ => None,
    }
}

fn map_mouse(mouse: MouseEvent) -> Option<TuiEvent> {
    match mouse.kind {
        MouseEventKind::Moved => Some(TuiEvent::MouseMove(mouse.column, mouse.row)),
        MouseEventKind::Down(MouseButton::Left) => Some(TuiEvent::Click(mouse.column, mouse.row)),
        MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
        MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
        _ => None,
    }
}
