use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::conversation::{Message, Source};
use crate::tui::markdown::{self, CodeBlock};
use crate::tui::theme::Preset;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles never get narrower than this (unless the list itself is).
const MIN_BUBBLE_WIDTH: u16 = 16;
/// Bubbles take at most this share of the list width, in percent.
const MAX_BUBBLE_PERCENT: u16 = 80;

const USER_AVATAR: &str = " ◉ you ";
const ASSISTANT_AVATAR: &str = " ◆ assistant ";
const COPY_LABEL: &str = "[copy]";
const EDIT_LABEL: &str = "[edit]";
const CODE_COPY_LABEL: &str = " [Copy] ";

/// Something a reader can activate on a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAction {
    /// Copy text to the clipboard (raw message or code block contents).
    Copy(String),
    /// Edit hook on user messages. Carries the message id; nothing is wired
    /// to it beyond logging.
    Edit(String),
    /// Open a source URL in the browser.
    OpenSource(String),
}

/// What sits under a given cell of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The `[copy]` affordance on a user message.
    CopyMessage,
    /// The `[edit]` affordance on a user message.
    EditMessage,
    /// Anywhere inside a code block; reveals its copy control.
    CodeBlock(usize),
    /// The top border of a code block, where its copy control sits.
    CodeBlockCopy(usize),
    /// A source entry (title or URL line).
    Source(usize),
    /// Other message text or border.
    Body,
}

impl HitTarget {
    pub fn code_block(self) -> Option<usize> {
        match self {
            HitTarget::CodeBlock(i) | HitTarget::CodeBlockCopy(i) => Some(i),
            _ => None,
        }
    }
}

/// Everything needed to draw one message at one list width.
///
/// Built once per (message, width, theme) and cached by `MessageList`.
#[derive(Debug, Clone)]
pub struct BubbleLayout {
    /// Outer bubble width, borders included.
    pub width: u16,
    /// Body (markdown) followed by the sources section.
    pub text: Text<'static>,
    /// First wrapped row of each logical line, relative to the content area.
    pub line_rows: Vec<u16>,
    /// Total wrapped rows of content.
    pub content_rows: u16,
    pub code_blocks: Vec<CodeBlock>,
    /// Line ranges belonging to each source entry, in source order.
    pub source_lines: Vec<Range<usize>>,
}

impl BubbleLayout {
    /// Outer height including borders.
    pub fn height(&self) -> u16 {
        self.content_rows.max(1) + VERTICAL_OVERHEAD
    }

    /// Logical line shown at a content row.
    pub fn line_at_row(&self, row: u16) -> Option<usize> {
        if row >= self.content_rows {
            return None;
        }
        Some(
            self.line_rows
                .partition_point(|&start| start <= row)
                .saturating_sub(1),
        )
    }

    pub fn code_block_at_line(&self, line: usize) -> Option<usize> {
        self.code_blocks.iter().position(|b| b.lines.contains(&line))
    }

    pub fn source_at_line(&self, line: usize) -> Option<usize> {
        self.source_lines.iter().position(|r| r.contains(&line))
    }
}

/// A stateless component that renders a single chat message as a bubble.
///
/// # Design
///
/// `MessageBubble` is a **transient component**: it's created fresh each frame
/// from a cached [`BubbleLayout`] plus the hover flags. The parent
/// `MessageList` owns hover state and the layout cache.
///
/// # Styling
///
/// - **User**: right-aligned, `primary` border, avatar `◉ you`
/// - **Assistant** (any other role): left-aligned, `border` color, avatar `◆`
///
/// A hovered user message shows `[copy] [edit]` in its top border. A hovered
/// code block shows `[Copy]` on its top border line.
pub struct MessageBubble<'a> {
    pub message: &'a Message,
    pub layout: &'a BubbleLayout,
    pub preset: &'a Preset,
    pub is_hovered: bool,
    pub hovered_code_block: Option<usize>,
}

impl<'a> MessageBubble<'a> {
    pub fn new(
        message: &'a Message,
        layout: &'a BubbleLayout,
        preset: &'a Preset,
        is_hovered: bool,
        hovered_code_block: Option<usize>,
    ) -> Self {
        Self {
            message,
            layout,
            preset,
            is_hovered,
            hovered_code_block,
        }
    }

    /// Render markdown and sources for `list_width` and measure the result.
    ///
    /// Heights come from `Paragraph::line_count` with the same wrap settings
    /// the widget uses, so layout and drawing agree row for row.
    pub fn layout(message: &Message, preset: &Preset, list_width: u16) -> BubbleLayout {
        let max_width = max_bubble_width(list_width);
        let max_inner = max_width.saturating_sub(HORIZONTAL_OVERHEAD);

        let base_fg = if message.is_user() {
            preset.user_text
        } else {
            preset.text
        };
        let rendered = markdown::render(message.content.trim(), base_fg, preset);
        let mut text = rendered.text;
        let source_lines = append_sources(&mut text, message.sources(), preset, max_inner);

        let avatar = if message.is_user() {
            USER_AVATAR.width() + COPY_LABEL.width() + EDIT_LABEL.width() + 1
        } else {
            ASSISTANT_AVATAR.width()
        };
        // Room for the hover-only copy control so revealing it never rewraps.
        let code_tops = rendered
            .code_blocks
            .iter()
            .filter_map(|b| text.lines.get(b.lines.start))
            .map(|line| line.width() + CODE_COPY_LABEL.width())
            .max()
            .unwrap_or(0);
        let natural = text.width().max(avatar).max(code_tops) as u16 + HORIZONTAL_OVERHEAD;
        let width = natural.clamp(MIN_BUBBLE_WIDTH.min(max_width), max_width);
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);

        let mut line_rows = Vec::with_capacity(text.lines.len());
        let mut row: u16 = 0;
        for line in &text.lines {
            line_rows.push(row);
            row = row.saturating_add(wrapped_rows(line, inner));
        }

        BubbleLayout {
            width,
            text,
            line_rows,
            content_rows: row,
            code_blocks: rendered.code_blocks,
            source_lines,
        }
    }

    /// Exact outer height at `list_width`, without drawing.
    pub fn calculate_height(message: &Message, preset: &Preset, list_width: u16) -> u16 {
        Self::layout(message, preset, list_width).height()
    }

    /// Where the bubble sits inside the row band given to this message.
    pub fn bubble_area(area: Rect, width: u16, is_user: bool) -> Rect {
        let width = width.min(area.width);
        let x = if is_user {
            area.x + area.width - width
        } else {
            area.x
        };
        Rect::new(x, area.y, width, area.height)
    }

    /// Resolve a cell (relative to the message's row band) to a target.
    pub fn hit(
        message: &Message,
        layout: &BubbleLayout,
        band_width: u16,
        col: u16,
        row: u16,
    ) -> Option<HitTarget> {
        let band = Rect::new(0, 0, band_width, layout.height());
        let bubble = Self::bubble_area(band, layout.width, message.is_user());
        if col < bubble.x || col >= bubble.right() || row >= bubble.height {
            return None;
        }

        if row == 0 {
            if message.is_user() {
                let (copy, edit) = affordance_columns(bubble);
                if copy.contains(&col) {
                    return Some(HitTarget::CopyMessage);
                }
                if edit.contains(&col) {
                    return Some(HitTarget::EditMessage);
                }
            }
            return Some(HitTarget::Body);
        }

        let content_row = row - 1;
        let Some(line) = layout.line_at_row(content_row) else {
            return Some(HitTarget::Body);
        };
        if let Some(idx) = layout.code_block_at_line(line) {
            return Some(if line == layout.code_blocks[idx].lines.start {
                HitTarget::CodeBlockCopy(idx)
            } else {
                HitTarget::CodeBlock(idx)
            });
        }
        if let Some(idx) = layout.source_at_line(line) {
            return Some(HitTarget::Source(idx));
        }
        Some(HitTarget::Body)
    }

    /// The action a click on `target` performs, if any.
    pub fn action_for(
        message: &Message,
        layout: &BubbleLayout,
        target: HitTarget,
    ) -> Option<MessageAction> {
        match target {
            HitTarget::CopyMessage if message.is_user() => {
                Some(MessageAction::Copy(message.content.clone()))
            }
            HitTarget::EditMessage if message.is_user() => {
                Some(MessageAction::Edit(message.id.clone()))
            }
            HitTarget::CodeBlockCopy(idx) => layout
                .code_blocks
                .get(idx)
                .map(|b| MessageAction::Copy(b.copy_text.clone())),
            HitTarget::Source(idx) => message
                .sources()
                .get(idx)
                .map(|s| MessageAction::OpenSource(s.url.clone())),
            _ => None,
        }
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let is_user = self.message.is_user();
        let accent = if is_user {
            self.preset.primary
        } else {
            self.preset.border
        };

        let border_style = if self.is_hovered {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(accent)
        };

        let bubble = Self::bubble_area(area, self.layout.width, is_user);
        let avatar = if is_user { USER_AVATAR } else { ASSISTANT_AVATAR };

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(Span::styled(avatar, border_style)))
            .padding(Padding::horizontal(CONTENT_PAD_H));

        if is_user && self.is_hovered {
            let hint = Style::default().fg(self.preset.muted);
            block = block.title_top(
                Line::from(vec![
                    Span::styled(COPY_LABEL, hint),
                    Span::raw(" "),
                    Span::styled(EDIT_LABEL, hint),
                ])
                .right_aligned(),
            );
        }

        let inner_area = block.inner(bubble);
        block.render(bubble, buf);

        let mut text = self.layout.text.clone();
        if let Some(idx) = self.hovered_code_block
            && let Some(code) = self.layout.code_blocks.get(idx)
            && let Some(top) = text.lines.get_mut(code.lines.start)
        {
            top.push_span(Span::styled(
                CODE_COPY_LABEL,
                Style::default()
                    .fg(self.preset.link)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .render(inner_area, buf);
    }
}

fn max_bubble_width(list_width: u16) -> u16 {
    let share = (list_width as u32 * MAX_BUBBLE_PERCENT as u32 / 100) as u16;
    share.max(MIN_BUBBLE_WIDTH).min(list_width)
}

fn wrapped_rows(line: &Line<'static>, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let rows = Paragraph::new(line.clone())
        .wrap(Wrap { trim: false })
        .line_count(width);
    (rows as u16).max(1)
}

/// Column ranges of `[copy]` and `[edit]` in a right-aligned top title.
fn affordance_columns(bubble: Rect) -> (Range<u16>, Range<u16>) {
    // Titles sit between the corners, so the right-aligned one ends one cell
    // before the right border.
    let end = bubble.right().saturating_sub(1);
    let edit_start = end.saturating_sub(EDIT_LABEL.width() as u16);
    let copy_end = edit_start.saturating_sub(1);
    let copy_start = copy_end.saturating_sub(COPY_LABEL.width() as u16);
    (copy_start..copy_end, edit_start..end)
}

/// Append the "Sources:" section; returns each source's line range.
fn append_sources(
    text: &mut Text<'static>,
    sources: &[Source],
    preset: &Preset,
    max_inner: u16,
) -> Vec<Range<usize>> {
    if sources.is_empty() {
        return Vec::new();
    }

    let muted = preset.muted_style();
    text.lines.push(Line::default());
    text.lines.push(Line::from(Span::styled(
        "─".repeat(max_inner.clamp(1, 40) as usize),
        muted,
    )));
    text.lines.push(Line::from(Span::styled(
        "↗ Sources:",
        muted.add_modifier(Modifier::BOLD),
    )));

    let mut ranges = Vec::with_capacity(sources.len());
    for source in sources {
        let start = text.lines.len();
        text.lines.push(Line::from(Span::styled(
            source.title.clone(),
            preset.link_style().add_modifier(Modifier::BOLD),
        )));
        text.lines.push(Line::from(Span::styled(
            truncate_to_width(&source.url, max_inner as usize),
            muted,
        )));
        ranges.push(start..text.lines.len());
    }
    ranges
}

/// Truncate to a display width, marking the cut with `…`.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Theme;
    use crate::test_support::doc_source;
    use crate::tui::theme::preset;

    fn buffer_lines(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn draw(message: &Message, width: u16, hovered: bool, code: Option<usize>) -> Vec<String> {
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(message, &p, width);
        let area = Rect::new(0, 0, width, layout.height());
        let mut buf = Buffer::empty(area);
        MessageBubble::new(message, &layout, &p, hovered, code).render(area, &mut buf);
        buffer_lines(&buf)
    }

    // ==========================================================================
    // Alignment
    // ==========================================================================

    #[test]
    fn user_bubble_is_right_aligned() {
        let area = Rect::new(0, 0, 100, 5);
        let bubble = MessageBubble::bubble_area(area, 30, true);
        assert_eq!(bubble.right(), area.right());
        assert_eq!(bubble.x, 70);
    }

    #[test]
    fn assistant_bubble_is_left_aligned() {
        let area = Rect::new(0, 0, 100, 5);
        let bubble = MessageBubble::bubble_area(area, 30, false);
        assert_eq!(bubble.x, 0);
    }

    #[test]
    fn rendered_user_bubble_hugs_the_right_edge() {
        let lines = draw(&Message::user("hi"), 60, false, None);
        assert!(lines[0].trim_end().ends_with('╮'), "{:?}", lines[0]);
        assert!(lines[0].starts_with(' '), "{:?}", lines[0]);
    }

    #[test]
    fn rendered_assistant_bubble_starts_at_the_left_edge() {
        let lines = draw(&Message::assistant("hello"), 60, false, None);
        assert!(lines[0].starts_with('╭'), "{:?}", lines[0]);
        assert!(lines[0].contains("assistant"));
    }

    // ==========================================================================
    // Layout
    // ==========================================================================

    #[test]
    fn bubble_width_is_capped_at_eighty_percent() {
        let p = preset(Theme::Light);
        let long = Message::assistant("word ".repeat(100));
        let layout = MessageBubble::layout(&long, &p, 100);
        assert_eq!(layout.width, 80);
        assert!(layout.content_rows > 1);
    }

    #[test]
    fn short_messages_shrink_to_fit() {
        let p = preset(Theme::Light);
        let layout = MessageBubble::layout(&Message::assistant("ok"), &p, 100);
        assert!(layout.width < 80);
        assert!(layout.width >= MIN_BUBBLE_WIDTH);
        assert_eq!(layout.height(), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn empty_content_still_occupies_one_row() {
        let p = preset(Theme::Light);
        let layout = MessageBubble::layout(&Message::assistant("   "), &p, 40);
        assert_eq!(layout.height(), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn layout_height_matches_drawn_rows() {
        let msg = Message::assistant("alpha beta gamma delta epsilon zeta eta theta iota kappa");
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 30);
        let lines = draw(&msg, 30, false, None);
        assert_eq!(lines.len() as u16, layout.height());
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn line_at_row_follows_wrapping() {
        let layout = BubbleLayout {
            width: 20,
            text: Text::from(vec![Line::from("a"), Line::from("b"), Line::from("c")]),
            line_rows: vec![0, 3, 4],
            content_rows: 6,
            code_blocks: vec![],
            source_lines: vec![],
        };
        assert_eq!(layout.line_at_row(0), Some(0));
        assert_eq!(layout.line_at_row(2), Some(0));
        assert_eq!(layout.line_at_row(3), Some(1));
        assert_eq!(layout.line_at_row(5), Some(2));
        assert_eq!(layout.line_at_row(6), None);
    }

    // ==========================================================================
    // Sources
    // ==========================================================================

    #[test]
    fn one_source_renders_one_link() {
        let msg = Message::assistant("Answer.").with_sources(vec![doc_source()]);
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 60);
        assert_eq!(layout.source_lines.len(), 1);
        let title_line = &layout.text.lines[layout.source_lines[0].start];
        assert_eq!(title_line.spans[0].content, "Doc");

        let lines = draw(&msg, 60, false, None);
        assert!(lines.iter().any(|l| l.contains("Sources:")));
        assert!(lines.iter().any(|l| l.contains("https://x")));

        let row = layout.line_rows[layout.source_lines[0].start] + 1;
        let target = MessageBubble::hit(&msg, &layout, 60, 3, row).unwrap();
        assert_eq!(target, HitTarget::Source(0));
        assert_eq!(
            MessageBubble::action_for(&msg, &layout, target),
            Some(MessageAction::OpenSource("https://x".into()))
        );
    }

    #[test]
    fn no_sources_section_when_empty_or_absent() {
        for msg in [
            Message::assistant("Answer."),
            Message::assistant("Answer.").with_sources(vec![]),
        ] {
            let lines = draw(&msg, 60, false, None);
            assert!(!lines.iter().any(|l| l.contains("Sources:")));
        }
    }

    #[test]
    fn long_urls_are_truncated_to_the_bubble() {
        let source = Source {
            title: "Guide".into(),
            url: format!("https://docs.storacha.network/{}", "a".repeat(200)),
        };
        let msg = Message::assistant("See guide.").with_sources(vec![source]);
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 50);
        let url_line = &layout.text.lines[layout.source_lines[0].end - 1];
        let shown: String = url_line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(shown.ends_with('…'));
        assert!(shown.width() <= (layout.width - HORIZONTAL_OVERHEAD) as usize);
    }

    #[test]
    fn truncate_to_width_handles_wide_chars() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    // ==========================================================================
    // Affordances
    // ==========================================================================

    #[test]
    fn hovered_user_message_shows_copy_and_edit() {
        let msg = Message::user("please help");
        let idle = draw(&msg, 60, false, None);
        assert!(!idle[0].contains("[copy]"));

        let hovered = draw(&msg, 60, true, None);
        assert!(hovered[0].contains("[copy]"), "{:?}", hovered[0]);
        assert!(hovered[0].contains("[edit]"), "{:?}", hovered[0]);
    }

    #[test]
    fn assistant_messages_have_no_copy_or_edit() {
        let hovered = draw(&Message::assistant("answer"), 60, true, None);
        assert!(!hovered[0].contains("[copy]"));
        assert!(!hovered[0].contains("[edit]"));
    }

    #[test]
    fn affordance_hit_columns_match_drawn_labels() {
        let msg = Message::user("please help");
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 60);
        let top = &draw(&msg, 60, true, None)[0];

        let copy_idx = top.find("[copy]").unwrap();
        let copy_col_idx = top[..copy_idx].chars().count() as u16;
        let edit_idx = top.find("[edit]").unwrap();
        let edit_col_idx = top[..edit_idx].chars().count() as u16;

        assert_eq!(
            MessageBubble::hit(&msg, &layout, 60, copy_col_idx + 1, 0),
            Some(HitTarget::CopyMessage)
        );
        assert_eq!(
            MessageBubble::hit(&msg, &layout, 60, edit_col_idx + 1, 0),
            Some(HitTarget::EditMessage)
        );
    }

    #[test]
    fn copy_affordance_copies_raw_markdown() {
        let msg = Message::user("use **bold**");
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 60);
        assert_eq!(
            MessageBubble::action_for(&msg, &layout, HitTarget::CopyMessage),
            Some(MessageAction::Copy("use **bold**".into()))
        );
        assert_eq!(
            MessageBubble::action_for(&msg, &layout, HitTarget::EditMessage),
            Some(MessageAction::Edit(msg.id.clone()))
        );
    }

    #[test]
    fn clicks_outside_the_bubble_miss() {
        let msg = Message::user("hi");
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 60);
        assert_eq!(MessageBubble::hit(&msg, &layout, 60, 0, 1), None);
    }

    // ==========================================================================
    // Code blocks
    // ==========================================================================

    #[test]
    fn code_block_copy_control_appears_on_hover_and_copies_exact_text() {
        let msg = Message::assistant("```rust\nfn main() {}\n```");
        let p = preset(Theme::Dark);
        let layout = MessageBubble::layout(&msg, &p, 60);

        let idle = draw(&msg, 60, false, None);
        assert!(!idle.iter().any(|l| l.contains("[Copy]")));
        let hovered = draw(&msg, 60, false, Some(0));
        assert!(hovered.iter().any(|l| l.contains("[Copy]")));

        let top_row = layout.line_rows[layout.code_blocks[0].lines.start] + 1;
        let target = MessageBubble::hit(&msg, &layout, 60, 3, top_row).unwrap();
        assert_eq!(target, HitTarget::CodeBlockCopy(0));
        for _ in 0..2 {
            assert_eq!(
                MessageBubble::action_for(&msg, &layout, target),
                Some(MessageAction::Copy("fn main() {}".into()))
            );
        }

        let body = MessageBubble::hit(&msg, &layout, 60, 3, top_row + 1).unwrap();
        assert_eq!(body, HitTarget::CodeBlock(0));
        assert_eq!(MessageBubble::action_for(&msg, &layout, body), None);
    }
}
