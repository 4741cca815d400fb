//! TOML-based settings for fac.
//!
//! Settings are loaded once at startup from `~/.config/fac/config.toml`
//! (or the path in `FAC_CONFIG`). A missing file means defaults. The
//! loaded [`Settings`] are immutable for the rest of the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "FAC_CONFIG";

// ---------------------------------------------------------------------------
// Top-level settings
// ---------------------------------------------------------------------------

/// Top-level settings loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Single-character command bindings.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Resolution applied when the user keeps issuing unknown commands.
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Initial pane orientation.
    #[serde(default)]
    pub orientation: Orientation,

    /// Evaluate every keystroke immediately instead of waiting for Enter.
    #[serde(default)]
    pub continuous_evaluation: bool,

    /// Editor command; falls back to `$VISUAL`, `$EDITOR`, then `vi`.
    #[serde(default)]
    pub editor: Option<String>,

    /// Resolved bindings (populated by `resolve_bindings`).
    #[serde(skip)]
    pub binding: Binding,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Default resolution forced on a conflict after repeated unknown input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Keep the local ("ours") side.
    #[default]
    Local,
    /// Keep the incoming ("theirs") side.
    Incoming,
    /// Keep local followed by incoming.
    Both,
}

/// How the local and incoming panes are arranged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Side by side.
    #[default]
    Vertical,
    /// Stacked.
    Horizontal,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Raw key bindings as written in the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub select_local: String,
    pub select_incoming: String,
    pub select_both: String,
    pub edit: String,
    pub next: String,
    pub previous: String,
    pub scroll_up: String,
    pub scroll_down: String,
    pub show_up: String,
    pub show_down: String,
    pub toggle_view: String,
    pub help: String,
    pub quit: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        let b = Binding::default();
        Self {
            select_local: b.select_local.to_string(),
            select_incoming: b.select_incoming.to_string(),
            select_both: b.select_both.to_string(),
            edit: b.edit.to_string(),
            next: b.next.to_string(),
            previous: b.previous.to_string(),
            scroll_up: b.scroll_up.to_string(),
            scroll_down: b.scroll_down.to_string(),
            show_up: b.show_up.to_string(),
            show_down: b.show_down.to_string(),
            toggle_view: b.toggle_view.to_string(),
            help: b.help.to_string(),
            quit: b.quit.to_string(),
        }
    }
}

impl KeyConfig {
    fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("keys.select_local", &self.select_local),
            ("keys.select_incoming", &self.select_incoming),
            ("keys.select_both", &self.select_both),
            ("keys.edit", &self.edit),
            ("keys.next", &self.next),
            ("keys.previous", &self.previous),
            ("keys.scroll_up", &self.scroll_up),
            ("keys.scroll_down", &self.scroll_down),
            ("keys.show_up", &self.show_up),
            ("keys.show_down", &self.show_down),
            ("keys.toggle_view", &self.toggle_view),
            ("keys.help", &self.help),
            ("keys.quit", &self.quit),
        ]
    }
}

/// Validated single-character bindings used by the evaluator and prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub select_local: char,
    pub select_incoming: char,
    pub select_both: char,
    pub edit: char,
    pub next: char,
    pub previous: char,
    pub scroll_up: char,
    pub scroll_down: char,
    pub show_up: char,
    pub show_down: char,
    pub toggle_view: char,
    pub help: char,
    pub quit: char,
}

impl Default for Binding {
    fn default() -> Self {
        Self {
            select_local: 'a',
            select_incoming: 'd',
            select_both: 'b',
            edit: 'e',
            next: 'n',
            previous: 'p',
            scroll_up: 'j',
            scroll_down: 'k',
            show_up: 'w',
            show_down: 's',
            toggle_view: 'v',
            help: 'h',
            quit: 'q',
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Settings {
    /// Default settings file location, honoring `FAC_CONFIG`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(p));
        }
        dirs::config_dir().map(|d| d.join("fac").join("config.toml"))
    }

    /// Load settings from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("no config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load, validate and resolve settings from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        info!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path)?;
        let mut settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::ParseError { detail, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                detail,
            },
            other => other,
        })?;
        settings.resolve_bindings()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string without resolving bindings.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: "<string>".into(),
            detail: parse_detail(contents, &e),
        })
    }

    /// Check that every binding is one distinct, non-whitespace character.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<char, &str> = HashMap::new();
        for (field, value) in self.keys.entries() {
            let mut chars = value.chars();
            let key = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: field.into(),
                        detail: format!("'{value}' must be exactly one character"),
                    })
                }
            };
            if key.is_whitespace() || key == '?' {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    detail: format!("'{value}' is reserved"),
                });
            }
            if let Some(other) = seen.insert(key, field) {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    detail: format!("'{key}' is already bound to {other}"),
                });
            }
        }
        if matches!(&self.editor, Some(e) if e.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "editor".into(),
                detail: "editor command must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Validate the raw keys and populate [`Settings::binding`].
    pub fn resolve_bindings(&mut self) -> Result<(), ConfigError> {
        self.validate()?;
        let first = |s: &str| s.chars().next().unwrap_or_default();
        let k = &self.keys;
        self.binding = Binding {
            select_local: first(&k.select_local),
            select_incoming: first(&k.select_incoming),
            select_both: first(&k.select_both),
            edit: first(&k.edit),
            next: first(&k.next),
            previous: first(&k.previous),
            scroll_up: first(&k.scroll_up),
            scroll_down: first(&k.scroll_down),
            show_up: first(&k.show_up),
            show_down: first(&k.show_down),
            toggle_view: first(&k.toggle_view),
            help: first(&k.help),
            quit: first(&k.quit),
        };
        debug!(binding = ?self.binding, "key bindings resolved");
        Ok(())
    }

    /// A commented settings template with every default spelled out.
    pub fn default_template() -> &'static str {
        r#"# fac settings
# fallback: resolution forced after repeated unknown commands (local, incoming, both)
fallback = "local"
# orientation: vertical (side by side) or horizontal (stacked)
orientation = "vertical"
# evaluate each keystroke without waiting for Enter
continuous_evaluation = false
# editor = "nvim"

[keys]
select_local = "a"
select_incoming = "d"
select_both = "b"
edit = "e"
next = "n"
previous = "p"
scroll_up = "j"
scroll_down = "k"
show_up = "w"
show_down = "s"
toggle_view = "v"
help = "h"
quit = "q"
"#
    }
}

/// A one-line description of a TOML error: message plus position.
fn parse_detail(contents: &str, error: &toml::de::Error) -> String {
    let message = error
        .message()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let Some(span) = error.span() else {
        return message;
    };
    let before = contents.get(..span.start).unwrap_or(contents);
    let line = before.matches('\n').count() + 1;
    let column = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
    format!("{message} (line {line}, column {column})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let mut settings = Settings::from_toml(Settings::default_template()).unwrap();
        settings.resolve_bindings().unwrap();
        assert_eq!(settings.binding, Binding::default());
        assert_eq!(settings.fallback, FallbackPolicy::Local);
        assert_eq!(settings.orientation, Orientation::Vertical);
        assert!(!settings.continuous_evaluation);
    }

    #[test]
    fn test_partial_keys_keep_defaults() {
        let mut settings = Settings::from_toml("fallback = \"incoming\"\n[keys]\nquit = \"x\"\n").unwrap();
        settings.resolve_bindings().unwrap();
        assert_eq!(settings.binding.quit, 'x');
        assert_eq!(settings.binding.select_local, 'a');
        assert_eq!(settings.fallback, FallbackPolicy::Incoming);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from_file(dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.binding, Binding::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "orientation = \"horizontal\"\n[keys]\nedit = \"E\"\n").unwrap();

        let settings = Settings::load_from_file(&path).unwrap();
        assert_eq!(settings.orientation, Orientation::Horizontal);
        assert_eq!(settings.binding.edit, 'E');
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fallback = [").unwrap();

        let result = Settings::load_from_file(&path);
        assert!(matches!(
            result,
            Err(ConfigError::ParseError { ref path, .. }) if path.ends_with("config.toml")
        ));
    }

    #[test]
    fn test_validate_rejects_long_binding() {
        let mut settings = Settings::default();
        settings.keys.quit = "qq".into();
        let result = settings.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "keys.quit"
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_binding() {
        let mut settings = Settings::default();
        settings.keys.next = "a".into();
        let result = settings.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "keys.next"
        ));
    }

    #[test]
    fn test_validate_rejects_reserved_help_key() {
        let mut settings = Settings::default();
        settings.keys.help = "?".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_fallback_is_parse_error() {
        let result = Settings::from_toml("fallback = \"random\"");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_parse_error_is_one_line() {
        let err = Settings::from_toml("fallback = [").unwrap_err();
        let text = err.to_string();
        assert!(!text.contains('\n'), "multi-line error: {text:?}");
        assert!(text.contains("line 1, column 1"), "{text}");
    }
}
