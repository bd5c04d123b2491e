//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.racha/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Theme;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RachaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub theme: Option<Theme>,
    pub transcript: Option<String>,
    pub watch_interval_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 500;
/// Polling faster than this just burns CPU on `stat`.
const MIN_WATCH_INTERVAL_MS: u64 = 50;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: Theme,
    pub transcript: Option<PathBuf>,
    pub watch: bool,
    pub watch_interval: Duration,
}

/// Values that came from CLI flags (None / false = not specified).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub theme: Option<Theme>,
    pub transcript: Option<PathBuf>,
    pub watch: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.racha/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".racha").join("config.toml"))
}

/// Load config from `~/.racha/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RachaConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RachaConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RachaConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RachaConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: RachaConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Racha Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# theme = "light"                    # "storacha", "dark", or "light"
# transcript = "~/chats/latest.json" # Or set RACHA_TRANSCRIPT env var
# watch_interval_ms = 500            # Poll interval for --watch
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RachaConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &RachaConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Theme: CLI → env → config → default
    let theme = cli
        .theme
        .or_else(|| {
            env("RACHA_THEME").and_then(|raw| {
                let parsed = Theme::parse(&raw);
                if parsed.is_none() {
                    warn!("Ignoring unknown RACHA_THEME value {:?}", raw);
                }
                parsed
            })
        })
        .or(config.general.theme)
        .unwrap_or_default();

    // Transcript: CLI → env → config
    let transcript = cli
        .transcript
        .clone()
        .or_else(|| env("RACHA_TRANSCRIPT").map(PathBuf::from))
        .or_else(|| config.general.transcript.as_deref().map(expand_home));

    let interval_ms = config
        .general
        .watch_interval_ms
        .unwrap_or(DEFAULT_WATCH_INTERVAL_MS)
        .max(MIN_WATCH_INTERVAL_MS);

    ResolvedConfig {
        theme,
        transcript,
        watch: cli.watch,
        watch_interval: Duration::from_millis(interval_ms),
    }
}

/// Expands a leading `~/` against the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = RachaConfig::default();
        assert!(config.general.theme.is_none());
        assert!(config.general.transcript.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&RachaConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.theme, Theme::Light);
        assert!(resolved.transcript.is_none());
        assert!(!resolved.watch);
        assert_eq!(
            resolved.watch_interval,
            Duration::from_millis(DEFAULT_WATCH_INTERVAL_MS)
        );
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = RachaConfig {
            general: GeneralConfig {
                theme: Some(Theme::Dark),
                transcript: Some("/tmp/chat.json".to_string()),
                watch_interval_ms: Some(1000),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.theme, Theme::Dark);
        assert_eq!(resolved.transcript, Some(PathBuf::from("/tmp/chat.json")));
        assert_eq!(resolved.watch_interval, Duration::from_millis(1000));
    }

    #[test]
    fn test_env_overrides_config() {
        let config = RachaConfig {
            general: GeneralConfig {
                theme: Some(Theme::Dark),
                ..Default::default()
            },
        };
        let env = |key: &str| match key {
            "RACHA_THEME" => Some("storacha".to_string()),
            "RACHA_TRANSCRIPT" => Some("/env/chat.json".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.theme, Theme::Storacha);
        assert_eq!(resolved.transcript, Some(PathBuf::from("/env/chat.json")));
    }

    #[test]
    fn test_unknown_env_theme_falls_through() {
        let config = RachaConfig {
            general: GeneralConfig {
                theme: Some(Theme::Dark),
                ..Default::default()
            },
        };
        let env = |key: &str| (key == "RACHA_THEME").then(|| "neon".to_string());
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.theme, Theme::Dark);
    }

    #[test]
    fn test_resolve_cli_wins() {
        let cli = CliOverrides {
            theme: Some(Theme::Storacha),
            transcript: Some(PathBuf::from("cli.json")),
            watch: true,
        };
        let env = |key: &str| (key == "RACHA_THEME").then(|| "dark".to_string());
        let resolved = resolve_with_env(&RachaConfig::default(), &cli, env);
        assert_eq!(resolved.theme, Theme::Storacha);
        assert_eq!(resolved.transcript, Some(PathBuf::from("cli.json")));
        assert!(resolved.watch);
    }

    #[test]
    fn test_watch_interval_has_floor() {
        let config = RachaConfig {
            general: GeneralConfig {
                watch_interval_ms: Some(1),
                ..Default::default()
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(
            resolved.watch_interval,
            Duration::from_millis(MIN_WATCH_INTERVAL_MS)
        );
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[general]
theme = "storacha"
"#;
        let config: RachaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.theme, Some(Theme::Storacha));
        assert!(config.general.transcript.is_none());
        assert!(config.general.watch_interval_ms.is_none());
    }

    #[test]
    fn test_unknown_theme_in_toml_is_parse_error() {
        let result: Result<RachaConfig, _> = toml::from_str("[general]\ntheme = \"neon\"\n");
        assert!(result.is_err());
    }
}
