use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::tui::theme::Preset;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LABEL: &str = "Thinking...";

/// "Thinking..." placeholder shown after the last message while a reply is
/// pending. Left-aligned like an assistant bubble; only the spinner glyph moves.
pub struct LoadingIndicator<'a> {
    pub preset: &'a Preset,
    pub spinner_frame: usize,
}

impl<'a> LoadingIndicator<'a> {
    /// Border + one content row.
    pub const HEIGHT: u16 = 3;
    const WIDTH: u16 = 19;

    pub fn new(preset: &'a Preset, spinner_frame: usize) -> Self {
        Self {
            preset,
            spinner_frame,
        }
    }

    pub fn glyph(frame: usize) -> &'static str {
        SPINNER[frame % SPINNER.len()]
    }
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = Self::WIDTH.min(area.width);
        let bubble = Rect::new(area.x, area.y, width, area.height.min(Self::HEIGHT));
        let border = Style::default().fg(self.preset.border);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Line::from(Span::styled(" ◆ ", border)))
            .padding(Padding::horizontal(1));
        let inner = block.inner(bubble);
        block.render(bubble, buf);

        Paragraph::new(Line::from(vec![
            Span::styled(
                Self::glyph(self.spinner_frame),
                Style::default().fg(self.preset.primary),
            ),
            Span::raw(" "),
            Span::styled(
                LABEL,
                Style::default()
                    .fg(self.preset.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]))
        .render(inner, buf);
    }
}
