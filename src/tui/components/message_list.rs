//! # MessageList Component
//!
//! Scrollable view of a conversation snapshot.
//!
//! ## Responsibilities
//!
//! - One bubble per message in sequence order, then one loading block while
//!   a reply is pending
//! - Scroll-to-bottom when the message sequence changes, performed on the
//!   next frame
//! - Hit testing for hover and click affordances
//! - Layout caching (bubble measurements per width and theme)
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `Conversation`
//! (props). `observe` only records that a scroll is wanted; the render pass
//! is the single place that moves the viewport, so any number of updates
//! between two frames produce one scroll.

use std::ops::Range;

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::Theme;
use crate::core::conversation::{Conversation, Message};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::loading::LoadingIndicator;
use crate::tui::components::message::{BubbleLayout, HitTarget, MessageAction, MessageBubble};
use crate::tui::event::TuiEvent;
use crate::tui::theme::preset;

/// Blank rows between consecutive blocks.
const GAP: u16 = 1;

/// One block in the list, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEntry {
    Message(usize),
    Loading,
}

/// The message and affordance currently under the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hover {
    pub index: usize,
    pub target: HitTarget,
}

/// A deferred scroll-to-bottom. Scheduling is idempotent until taken.
#[derive(Debug, Default)]
pub struct ScrollRequest {
    pending: bool,
    coalesced: u32,
}

impl ScrollRequest {
    pub fn schedule(&mut self) {
        if self.pending {
            self.coalesced += 1;
        }
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the request; true at most once per batch of schedules.
    pub fn take(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        if self.coalesced > 0 {
            debug!(
                "Collapsed {} scroll requests into one",
                self.coalesced + 1
            );
        }
        self.pending = false;
        self.coalesced = 0;
        true
    }
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, new frames keep the viewport at the bottom
    pub stick_to_bottom: bool,
    /// Furthest scroll position reached (for "new content" indicator)
    pub max_scroll_reached: u16,
    /// Message selected with the keyboard
    pub selected_index: Option<usize>,
    /// Message and target under the mouse
    pub hovered: Option<Hover>,
    /// Last mouse position, so hover follows the content when it scrolls
    pointer: Option<(u16, u16)>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Screen area of the last render, for hit testing
    pub area: Rect,
    pub scroll_request: ScrollRequest,
    last_revision: Option<u64>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            max_scroll_reached: 0,
            selected_index: None,
            hovered: None,
            pointer: None,
            viewport_height: 0,
            area: Rect::default(),
            scroll_request: ScrollRequest::default(),
            last_revision: None,
        }
    }

    /// Note the conversation about to be drawn. A new revision (including the
    /// first one seen) schedules a scroll to the bottom for the next frame.
    pub fn observe(&mut self, conversation: &Conversation) {
        let revision = conversation.revision();
        if self.last_revision == Some(revision) {
            return;
        }
        self.last_revision = Some(revision);
        debug!(
            "Conversation revision {} ({} messages), scheduling scroll to bottom",
            revision,
            conversation.messages().len()
        );
        self.scroll_request.schedule();
    }

    fn max_offset(&self) -> u16 {
        self.layout
            .total_height()
            .saturating_sub(self.viewport_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        let max_y = self.max_offset();
        self.scroll_state.set_offset(Position { x: 0, y: max_y });
        self.stick_to_bottom = true;
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    /// Prevents overscrolling past the last message.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    /// If the message is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.layout.prefix_heights.len() {
            return;
        }

        let item_top = self.layout.top_of(idx);
        let item_bottom = self.layout.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            // Re-pin if we've landed at the absolute bottom
            self.stick_to_bottom = new_y >= self.max_offset();
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    /// Called on scroll-down events so that scrolling past the end re-pins to bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    pub fn select_next(&mut self) {
        let count = self.layout.message_count();
        if count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => (i + 1).min(count - 1),
            None => count - 1,
        });
        self.scroll_to_selected();
    }

    pub fn select_previous(&mut self) {
        let count = self.layout.message_count();
        if count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => i.saturating_sub(1).min(count - 1),
            None => count - 1,
        });
        self.scroll_to_selected();
    }

    /// Message index and target at a screen cell.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Hover> {
        if !self.area.contains(Position { x: column, y: row }) {
            return None;
        }
        let content_y = row - self.area.y + self.scroll_state.offset().y;
        let index = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        let cached = self.layout.bubbles.get(index)?;
        let target = MessageBubble::hit(
            &cached.message,
            &cached.layout,
            self.layout.width,
            column - self.area.x,
            content_y - self.layout.top_of(index),
        )?;
        Some(Hover { index, target })
    }

    pub fn update_hover(&mut self, column: u16, row: u16) {
        self.pointer = Some((column, row));
        self.hovered = self.hit_test(column, row);
    }

    /// Re-resolve the hover after the offset moved under a still pointer.
    fn refresh_hover(&mut self) {
        if let Some((column, row)) = self.pointer {
            self.hovered = self.hit_test(column, row);
        }
    }

    /// Activate whatever is under the cursor.
    pub fn click(&mut self, column: u16, row: u16) -> Option<MessageAction> {
        self.pointer = Some((column, row));
        let hover = self.hit_test(column, row)?;
        self.hovered = Some(hover);
        self.action_for(hover.index, hover.target)
    }

    fn action_for(&self, index: usize, target: HitTarget) -> Option<MessageAction> {
        let cached = self.layout.bubbles.get(index)?;
        MessageBubble::action_for(&cached.message, &cached.layout, target)
    }

    fn selected_action(&self, target: impl FnOnce(&BubbleLayout) -> Option<HitTarget>) -> Option<MessageAction> {
        let index = self.selected_index?;
        let cached = self.layout.bubbles.get(index)?;
        self.action_for(index, target(&cached.layout)?)
    }

    fn clamp_selection(&mut self) {
        let count = self.layout.message_count();
        if self.selected_index.is_some_and(|i| i >= count) {
            self.selected_index = count.checked_sub(1);
        }
        if self.hovered.is_some_and(|h| h.index >= count) {
            self.hovered = None;
        }
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList` because:
/// 1. Event handling requires persistent state (scroll position, stick_to_bottom flag)
/// 2. `MessageList` is recreated each frame with fresh props, so it can't hold state
/// 3. The state object lives in `TuiState` and persists across the event loop
impl EventHandler for MessageListState {
    type Event = MessageAction;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                self.refresh_hover();
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                self.refresh_hover();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                self.refresh_hover();
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                self.refresh_hover();
                None
            }
            TuiEvent::ScrollToBottom => {
                self.scroll_to_bottom();
                self.refresh_hover();
                None
            }
            TuiEvent::MouseMove(x, y) => {
                self.update_hover(*x, *y);
                None
            }
            TuiEvent::Click(x, y) => self.click(*x, *y),
            TuiEvent::SelectNext => {
                self.select_next();
                None
            }
            TuiEvent::SelectPrevious => {
                self.select_previous();
                None
            }
            TuiEvent::ClearSelection => {
                self.selected_index = None;
                None
            }
            TuiEvent::CopySelected => self.selected_action(|_| Some(HitTarget::CopyMessage)),
            TuiEvent::EditSelected => self.selected_action(|_| Some(HitTarget::EditMessage)),
            TuiEvent::CopySelectedCode => self.selected_action(|layout| {
                layout
                    .code_blocks
                    .len()
                    .checked_sub(1)
                    .map(HitTarget::CodeBlockCopy)
            }),
            TuiEvent::OpenSource(n) => self.selected_action(|_| Some(HitTarget::Source(*n))),
            _ => None,
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    // Mutable reference to persistent state
    pub state: &'a mut MessageListState,
    pub conversation: &'a Conversation,
    pub theme: Theme,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        conversation: &'a Conversation,
        theme: Theme,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            conversation,
            theme,
            spinner_frame,
        }
    }

    /// Block plan for a conversation: every message in order, then one
    /// loading block if a reply is pending.
    pub fn entries(conversation: &Conversation) -> Vec<ListEntry> {
        let mut entries: Vec<ListEntry> = (0..conversation.messages().len())
            .map(ListEntry::Message)
            .collect();
        if conversation.is_loading() {
            entries.push(ListEntry::Loading);
        }
        entries
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Update layout cache
        self.state.area = area;
        self.state.viewport_height = area.height;
        self.state
            .layout
            .sync(self.conversation, self.theme, content_width);
        self.state.clamp_selection();

        // 2. Apply the pending scroll, if any, then keep the offset in bounds
        if self.state.scroll_request.take() {
            self.state.stick_to_bottom = true;
        }
        if self.state.stick_to_bottom {
            self.state.scroll_to_bottom();
        } else {
            self.state.clamp_scroll();
        }

        if self.state.layout.entries.is_empty() {
            return;
        }

        // 3. Render visible entries into a ScrollView
        let p = preset(self.theme);
        let state = &*self.state;
        let layout = &state.layout;
        let scroll_offset = state.scroll_state.offset().y;
        let visible_range = layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, layout.total_height()))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let height = layout.heights[i].saturating_sub(GAP);
            let rect = Rect::new(0, layout.top_of(i), content_width, height);

            match layout.entries[i] {
                ListEntry::Message(idx) => {
                    let cached = &layout.bubbles[idx];
                    let hovered = state.hovered.filter(|h| h.index == idx);
                    let is_hovered = hovered.is_some() || state.selected_index == Some(idx);
                    let code = hovered.and_then(|h| h.target.code_block());
                    let bubble =
                        MessageBubble::new(&cached.message, &cached.layout, &p, is_hovered, code);
                    scroll_view.render_widget(bubble, rect);
                }
                ListEntry::Loading => {
                    scroll_view.render_widget(LoadingIndicator::new(&p, self.spinner_frame), rect);
                }
            }
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        // Update auxiliary state
        let current_offset = self.state.scroll_state.offset().y;
        self.state.max_scroll_reached = self.state.max_scroll_reached.max(current_offset);
    }
}

/// A message together with its measured layout.
pub struct CachedBubble {
    pub message: Message,
    pub layout: BubbleLayout,
}

/// Cached layout measurements
pub struct LayoutCache {
    pub bubbles: Vec<CachedBubble>,
    pub entries: Vec<ListEntry>,
    /// Entry heights, gap included.
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    width: u16,
    theme: Option<Theme>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::new(),
            entries: Vec::new(),
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            width: 0,
            theme: None,
        }
    }

    /// Leading cached bubbles still valid for `messages` at this width and theme.
    pub fn reusable_count(&self, messages: &[Message], width: u16, theme: Theme) -> usize {
        if self.width != width || self.theme != Some(theme) {
            return 0;
        }
        self.bubbles
            .iter()
            .zip(messages)
            .take_while(|(cached, message)| cached.message == **message)
            .count()
    }

    pub fn sync(&mut self, conversation: &Conversation, theme: Theme, width: u16) {
        let messages = conversation.messages();
        let reusable = self.reusable_count(messages, width, theme);
        self.bubbles.truncate(reusable);

        let p = preset(theme);
        for message in &messages[reusable..] {
            self.bubbles.push(CachedBubble {
                layout: MessageBubble::layout(message, &p, width),
                message: message.clone(),
            });
        }
        self.width = width;
        self.theme = Some(theme);

        self.entries = MessageList::entries(conversation);
        self.heights = self
            .entries
            .iter()
            .map(|entry| match entry {
                ListEntry::Message(i) => self.bubbles[*i].layout.height() + GAP,
                ListEntry::Loading => LoadingIndicator::HEIGHT + GAP,
            })
            .collect();
        self.rebuild_prefix_heights();
    }

    pub fn message_count(&self) -> usize {
        self.bubbles.len()
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// First content row of entry `index`.
    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        }
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
