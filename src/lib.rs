//! Racha library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod platform;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Visual theme. Only selects a style preset; nothing else branches on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Branded red/white preset.
    Storacha,
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Storacha => Theme::Dark,
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Storacha,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Storacha => "storacha",
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "storacha" => Some(Theme::Storacha),
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}
