//! Markdown → ratatui `Text` renderer.
//!
//! Thin wrapper around `pulldown_cmark` with the GitHub extensions (tables,
//! strikethrough, task lists, bare-URL autolinks). Every node kind goes
//! through one `match`; anything without a dedicated presentation falls
//! through to plain inherited text.
//!
//! Alongside the styled text, the renderer records each code block's line
//! range and its raw text so the view can offer a copy control.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::tui::theme::Preset;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://|www\.)[^\s<>]+").expect("bare URL pattern is valid")
});

/// A fenced or indented code block inside rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Rendered lines covered by the block, borders included.
    pub lines: Range<usize>,
    pub language: Option<String>,
    /// Text written to the clipboard by the block's copy control.
    pub copy_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub text: Text<'static>,
    pub code_blocks: Vec<CodeBlock>,
}

impl Rendered {
    pub fn code_block_at_line(&self, line: usize) -> Option<usize> {
        self.code_blocks
            .iter()
            .position(|block| block.lines.contains(&line))
    }
}

/// Parse markdown content into styled `Text` using the given preset.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color, preset: &Preset) -> Rendered {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut w = Writer::new(base_fg, preset);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    Rendered {
        text: w.text,
        code_blocks: w.code_blocks,
    }
}

/// Joins text fragments collected under a code block into the copy payload.
///
/// The final newline pulldown emits for the closing fence is not part of
/// what the reader sees, so it is dropped.
pub fn collect_code_text<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out: String = fragments.into_iter().collect();
    if out.ends_with('\n') {
        out.pop();
        if out.ends_with('\r') {
            out.pop();
        }
    }
    out
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct OpenCodeBlock {
    start_line: usize,
    language: Option<String>,
    fragments: Vec<String>,
}

struct Writer<'p> {
    text: Text<'static>,
    base_fg: Color,
    preset: &'p Preset,
    /// Inline style stack (bold, italic, heading text, etc.). Styles compose
    /// via `patch` so nested bold+italic works.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote `│`, code block `│`).
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    highlighter: Option<HighlightLines<'static>>,
    /// Set while inside any code block.
    code: Option<OpenCodeBlock>,
    code_blocks: Vec<CodeBlock>,
    /// Stored link URL, appended after the link text closes.
    link_url: Option<String>,
    /// Text seen inside the current link, to avoid repeating autolinks.
    link_text: String,
    /// True until the first cell of the current table row is written.
    row_start: bool,
    /// A list marker line was just opened; a loose item's paragraph continues it.
    pending_item: bool,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl<'p> Writer<'p> {
    fn new(base_fg: Color, preset: &'p Preset) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            preset,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            highlighter: None,
            code: None,
            code_blocks: vec![],
            link_url: None,
            link_text: String::new(),
            row_start: false,
            pending_item: false,
            needs_newline: false,
        }
    }

    // ── Style helpers ───────────────────────────────────────────────────

    /// Current effective style: top of stack, or base foreground color.
    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    /// Push a style that composes with the current one (inherits parent modifiers).
    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    // ── Line/span helpers ───────────────────────────────────────────────

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    // ── Event dispatch ──────────────────────────────────────────────────

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled(
                    "─".repeat(40),
                    self.preset.muted_style(),
                )));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_span(Span::styled(marker, self.preset.muted_style()));
            }
            _ => {} // HTML, footnotes, math: not rendered
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            // ── Block elements ──────────────────────────────────────────
            Tag::Paragraph => {
                if self.pending_item {
                    self.pending_item = false;
                    self.needs_newline = false;
                } else {
                    self.blank_line_if_needed();
                    self.push_line(Line::default());
                }
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                let depth = heading_depth(level) as usize;
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(depth)),
                    hs,
                )));
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes
                    .push(Span::styled("│ ", self.preset.muted_style()));
                self.push_style(
                    Style::default()
                        .fg(self.base_fg)
                        .add_modifier(Modifier::DIM | Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(kind) => {
                if !self.text.lines.is_empty() {
                    self.push_line(Line::default());
                }
                let lang = match &kind {
                    CodeBlockKind::Fenced(l) => l.split_whitespace().next().unwrap_or(""),
                    CodeBlockKind::Indented => "",
                };

                // Top border: ╭── lang  or just ╭──
                let bs = self.preset.muted_style();
                let top = if lang.is_empty() {
                    Line::from(Span::styled("╭──", bs))
                } else {
                    Line::from(vec![
                        Span::styled("╭── ", bs),
                        Span::styled(lang.to_owned(), bs.add_modifier(Modifier::BOLD)),
                        Span::styled(" ──", bs),
                    ])
                };
                self.code = Some(OpenCodeBlock {
                    start_line: self.text.lines.len(),
                    language: (!lang.is_empty()).then(|| lang.to_owned()),
                    fragments: vec![],
                });
                self.push_line(top);

                self.line_prefixes.push(Span::styled("│ ", bs));

                if !lang.is_empty()
                    && let Some(syn) = SYNTAX_SET.find_syntax_by_token(lang)
                    && let Some(theme) = THEME_SET.themes.get(self.preset.syntax_theme)
                {
                    self.highlighter = Some(HighlightLines::new(syn, theme));
                }
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let depth = self.list_indices.len().saturating_sub(1);
                let indent = "  ".repeat(depth + 1);
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}• "),
                        Some(n) => {
                            let s = format!("{indent}{n}. ");
                            *n += 1;
                            s
                        }
                    };
                    let ms = self.preset.muted_style();
                    self.push_span(Span::styled(marker, ms));
                }
                self.pending_item = true;
            }
            Tag::Table(_) => {
                self.blank_line_if_needed();
            }
            Tag::TableHead => {
                self.push_line(Line::default());
                self.row_start = true;
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => {
                self.push_line(Line::default());
                self.row_start = true;
            }
            Tag::TableCell => {
                if !self.row_start {
                    self.push_span(Span::styled(" │ ", self.preset.muted_style()));
                }
                self.row_start = false;
            }

            // ── Inline elements ─────────────────────────────────────────
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.link_text.clear();
                self.push_style(self.preset.link_style());
            }
            _ => {} // Images, definitions, footnotes: children render as plain text
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.line_prefixes.pop(); // remove │ prefix before bottom border
                self.push_line(Line::from(Span::styled("╰──", self.preset.muted_style())));
                if let Some(open) = self.code.take() {
                    self.code_blocks.push(CodeBlock {
                        lines: open.start_line..self.text.lines.len(),
                        language: open.language,
                        copy_text: collect_code_text(open.fragments.iter().map(String::as_str)),
                    });
                }
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                if self.list_indices.is_empty() {
                    self.needs_newline = true;
                }
            }
            TagEnd::Item => self.pending_item = false,
            TagEnd::Table => self.needs_newline = true,
            TagEnd::TableHead => self.pop_style(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take()
                    && url != self.link_text
                {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, self.preset.link_style()));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    // ── Content handlers ────────────────────────────────────────────────

    fn text(&mut self, cow: CowStr<'_>) {
        if let Some(open) = self.code.as_mut() {
            open.fragments.push(cow.to_string());
            self.code_text(&cow);
            return;
        }

        // Expand tabs → 4 spaces (ratatui renders \t as zero-width)
        let text = cow.replace('\t', "    ");

        if self.link_url.is_some() {
            self.link_text.push_str(&text);
            let style = self.style();
            self.push_span(Span::styled(text, style));
            return;
        }

        // Normal text, with bare URLs picked out as links
        let style = self.style();
        let mut last = 0;
        for m in BARE_URL.find_iter(&text) {
            let url = trim_url_punctuation(m.as_str());
            let end = m.start() + url.len();
            if m.start() > last {
                self.push_span(Span::styled(text[last..m.start()].to_owned(), style));
            }
            self.push_span(Span::styled(url.to_owned(), style.patch(self.preset.link_style())));
            last = end;
        }
        if last < text.len() {
            self.push_span(Span::styled(text[last..].to_owned(), style));
        }
    }

    fn code_text(&mut self, raw: &str) {
        let text = raw.replace('\t', "    ");

        // Take the highlighter out to avoid a double mutable borrow
        // (highlight_line borrows it, push_line borrows self).
        if let Some(mut hl) = self.highlighter.take() {
            for line in LinesWithEndings::from(text.as_str()) {
                match hl.highlight_line(line, &SYNTAX_SET) {
                    Ok(ranges) => {
                        let spans: Vec<Span<'static>> = ranges
                            .into_iter()
                            .filter_map(|(hl_style, frag)| {
                                let content = frag.trim_end_matches(['\n', '\r']);
                                if content.is_empty() {
                                    return None;
                                }
                                let fg = Color::Rgb(
                                    hl_style.foreground.r,
                                    hl_style.foreground.g,
                                    hl_style.foreground.b,
                                );
                                Some(Span::styled(content.to_owned(), Style::default().fg(fg)))
                            })
                            .collect();
                        self.push_line(Line::from(spans));
                    }
                    Err(_) => self.push_line(Line::from(Span::styled(
                        line.trim_end_matches(['\n', '\r']).to_owned(),
                        Style::default().fg(self.preset.code_fg),
                    ))),
                }
            }
            self.highlighter = Some(hl);
            return;
        }

        let code_style = Style::default().fg(self.preset.code_fg);
        for line in text.lines() {
            self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
        }
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        let style = self.preset.inline_code_style();
        self.push_span(Span::styled(format!(" {} ", &*cow), style));
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// GFM excludes trailing punctuation and unbalanced `)` from autolinks.
fn trim_url_punctuation(url: &str) -> &str {
    let mut end = url.len();
    loop {
        let candidate = &url[..end];
        match candidate.chars().last() {
            Some('.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~') => {
                end -= 1;
            }
            Some(')') if candidate.matches('(').count() < candidate.matches(')').count() => {
                end -= 1;
            }
            _ => return candidate,
        }
    }
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().fg(base_fg).add_modifier(Modifier::BOLD),
        HeadingLevel::H3 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        _ => Style::default().fg(base_fg).add_modifier(Modifier::BOLD),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
