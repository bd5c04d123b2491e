//! Style presets, one per [`Theme`].
//!
//! A preset is pure data. Components look colors up here and never match on
//! the theme themselves.

use ratatui::style::{Color, Modifier, Style};

use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Body text of assistant messages.
    pub text: Color,
    /// Body text of user messages.
    pub user_text: Color,
    /// User bubble border and avatar.
    pub primary: Color,
    /// Assistant bubble border.
    pub border: Color,
    /// Secondary text: list markers, code borders, truncated URLs.
    pub muted: Color,
    pub link: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    /// syntect theme for fenced code blocks.
    pub syntax_theme: &'static str,
}

const STORACHA_RED: Color = Color::Rgb(0xE9, 0x13, 0x15);

pub fn preset(theme: Theme) -> Preset {
    match theme {
        Theme::Storacha => Preset {
            text: Color::White,
            user_text: Color::White,
            primary: STORACHA_RED,
            border: Color::Rgb(0xFF, 0xC8, 0x3F),
            muted: Color::Gray,
            link: Color::Rgb(0x0B, 0xA5, 0xEC),
            code_fg: Color::White,
            code_bg: Color::Rgb(0x3A, 0x1A, 0x1A),
            syntax_theme: "base16-eighties.dark",
        },
        Theme::Dark => Preset {
            text: Color::Gray,
            user_text: Color::White,
            primary: Color::Blue,
            border: Color::DarkGray,
            muted: Color::DarkGray,
            link: Color::Cyan,
            code_fg: Color::White,
            code_bg: Color::DarkGray,
            syntax_theme: "base16-ocean.dark",
        },
        Theme::Light => Preset {
            text: Color::Black,
            user_text: Color::Blue,
            primary: Color::Blue,
            border: Color::Gray,
            muted: Color::DarkGray,
            link: Color::Blue,
            code_fg: Color::Black,
            code_bg: Color::Gray,
            syntax_theme: "InspiredGitHub",
        },
    }
}

impl Preset {
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn inline_code_style(&self) -> Style {
        Style::default().fg(self.code_fg).bg(self.code_bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syntect::highlighting::ThemeSet;

    #[test]
    fn every_theme_has_a_distinct_preset() {
        let presets = [
            preset(Theme::Storacha),
            preset(Theme::Dark),
            preset(Theme::Light),
        ];
        assert_ne!(presets[0], presets[1]);
        assert_ne!(presets[1], presets[2]);
        assert_ne!(presets[0], presets[2]);
    }

    #[test]
    fn syntax_themes_exist_in_default_set() {
        let themes = ThemeSet::load_defaults();
        for theme in [Theme::Storacha, Theme::Dark, Theme::Light] {
            let name = preset(theme).syntax_theme;
            assert!(themes.themes.contains_key(name), "missing syntect theme {name}");
        }
    }
}
