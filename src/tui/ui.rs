use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, TitleBar};
use crate::tui::theme::{Preset, preset};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

const HINTS: &str =
    "q quit · ↑↓ scroll · j/k select · c copy · e edit · y copy code · 1-9 open source · t theme";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, main_area, footer_area] = layout.areas(frame.area());
    let p = preset(app.theme);

    // Main area - show error OR conversation
    if let Some(error_msg) = &app.error {
        draw_error_view(frame, main_area, error_msg);
        tui.has_unseen_content = false;
    } else {
        // Always render the list so its layout and selection follow the
        // snapshot, even when there is nothing to show.
        MessageList::new(
            &mut tui.message_list,
            &app.conversation,
            app.theme,
            spinner_frame,
        )
        .render(frame, main_area);

        if app.conversation.is_empty() && !app.conversation.is_loading() {
            draw_empty_view(frame, main_area, &p);
        }

        let list = &tui.message_list;
        let max_scroll = list.layout.total_height().saturating_sub(main_area.height);
        tui.has_unseen_content = list.scroll_state.offset().y < max_scroll;
    }

    let transcript = app.transcript_label();
    TitleBar::new(
        app.theme.label(),
        &transcript,
        &app.status_message,
        tui.has_unseen_content,
        &p,
    )
    .render(frame, title_area);

    frame.render_widget(
        Line::from(Span::styled(HINTS, p.muted_style())),
        footer_area,
    );
}

fn draw_error_view(frame: &mut Frame, area: Rect, error_msg: &str) {
    let error_paragraph = Paragraph::new(error_msg)
        .block(Block::bordered().title("ERROR"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(error_paragraph, area);
}

fn draw_empty_view(frame: &mut Frame, area: Rect, p: &Preset) {
    let hint = Paragraph::new(Line::from(Span::styled(
        "No messages yet. Open a transcript with `racha <file.json>`.",
        p.muted_style(),
    )))
    .alignment(Alignment::Center);
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(hint, middle);
}
