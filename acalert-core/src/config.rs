//! Configuration file management for ac-alert.
//!
//! Reads/writes `~/.ac-alert/config.yaml` with the data source, poll
//! interval, alert target, and per-channel notifier settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::matcher::AlertTarget;
use crate::types::{AlertError, Result};

/// Full configuration structure. Built once at startup, then read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub console: ConsoleConfig,
    pub email: EmailConfig,
    pub sound: SoundConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Filesystem path or `http(s)://` URL of the aircraft list.
    pub location: String,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    pub hex: Option<String>,
    pub flight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub alerts: bool,
    /// Master switch for all console output.
    pub output: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub enabled: bool,
    pub server: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundConfig {
    pub enabled: bool,
    pub mp3: Option<String>,
    pub wav: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
}

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceConfig {
                location: "aircraft.json".into(),
                interval_secs: 60,
            },
            target: TargetConfig {
                hex: None,
                flight: Some("N712JM".into()),
            },
            console: ConsoleConfig {
                alerts: true,
                output: true,
            },
            email: EmailConfig {
                enabled: false,
                server: None,
                port: 587,
                username: None,
                password: None,
                sender: None,
                recipient: None,
            },
            sound: SoundConfig {
                enabled: true,
                mp3: None,
                wav: Some("alert.wav".into()),
            },
            telegram: TelegramConfig {
                enabled: false,
                bot_token: None,
                chat_id: None,
                api_base: DEFAULT_TELEGRAM_API.into(),
            },
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.source.interval_secs)
    }

    /// Normalized alert target built from the `target` section.
    pub fn alert_target(&self) -> Result<AlertTarget> {
        AlertTarget::new(self.target.hex.as_deref(), self.target.flight.as_deref())
    }

    /// Reject configurations the watch loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.alert_target()?;

        if self.source.location.trim().is_empty() {
            return Err(AlertError::Config("source.location is empty".into()));
        }
        if self.source.interval_secs == 0 {
            return Err(AlertError::Config(
                "source.interval_secs must be at least 1".into(),
            ));
        }

        if self.email.enabled {
            let missing: Vec<&str> = [
                ("server", &self.email.server),
                ("username", &self.email.username),
                ("password", &self.email.password),
                ("sender", &self.email.sender),
                ("recipient", &self.email.recipient),
            ]
            .into_iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k)
            .collect();
            if !missing.is_empty() {
                return Err(AlertError::Config(format!(
                    "email enabled but missing: {}",
                    missing.join(", ")
                )));
            }
        }

        if self.telegram.enabled
            && (self.telegram.bot_token.is_none() || self.telegram.chat_id.is_none())
        {
            return Err(AlertError::Config(
                "telegram enabled but bot_token or chat_id missing".into(),
            ));
        }

        Ok(())
    }
}

/// Get the config directory path (`~/.ac-alert/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".ac-alert")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `path`.
///
/// Returns default config if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_config(&text))
}

/// Save config to `path`, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| AlertError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config))
        .map_err(|e| AlertError::Config(e.to_string()))?;
    Ok(())
}

/// Parse simple YAML-like config text. Unknown keys are ignored.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }
        let Some(section) = current_section.as_deref() else {
            continue;
        };

        match (section, key) {
            ("source", "location") => {
                if let Some(v) = parse_string_value(val) {
                    config.source.location = v;
                }
            }
            ("source", "interval_secs") => {
                if let Ok(v) = val.parse() {
                    config.source.interval_secs = v;
                }
            }
            ("target", "hex") => config.target.hex = parse_string_value(val),
            ("target", "flight") => config.target.flight = parse_string_value(val),
            ("console", "alerts") => set_bool(&mut config.console.alerts, val),
            ("console", "output") => set_bool(&mut config.console.output, val),
            ("email", "enabled") => set_bool(&mut config.email.enabled, val),
            ("email", "server") => config.email.server = parse_string_value(val),
            ("email", "port") => {
                if let Ok(v) = val.parse() {
                    config.email.port = v;
                }
            }
            ("email", "username") => config.email.username = parse_string_value(val),
            ("email", "password") => config.email.password = parse_string_value(val),
            ("email", "sender") => config.email.sender = parse_string_value(val),
            ("email", "recipient") => config.email.recipient = parse_string_value(val),
            ("sound", "enabled") => set_bool(&mut config.sound.enabled, val),
            ("sound", "mp3") => config.sound.mp3 = parse_string_value(val),
            ("sound", "wav") => config.sound.wav = parse_string_value(val),
            ("telegram", "enabled") => set_bool(&mut config.telegram.enabled, val),
            ("telegram", "bot_token") => config.telegram.bot_token = parse_string_value(val),
            ("telegram", "chat_id") => config.telegram.chat_id = parse_string_value(val),
            ("telegram", "api_base") => {
                if let Some(v) = parse_string_value(val) {
                    config.telegram.api_base = v;
                }
            }
            _ => {}
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string()).filter(|s| !s.is_empty());
    }
    Some(val.to_string())
}

fn parse_bool_value(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn set_bool(slot: &mut bool, val: &str) {
    if let Some(v) = parse_bool_value(val) {
        *slot = v;
    }
}

fn opt_line(key: &str, value: &Option<String>) -> String {
    match value {
        Some(v) => format!("  {key}: \"{v}\""),
        None => format!("  {key}: null"),
    }
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# ac-alert configuration".to_string(), String::new()];

    lines.push("source:".into());
    lines.push(format!("  location: \"{}\"", config.source.location));
    lines.push(format!("  interval_secs: {}", config.source.interval_secs));
    lines.push(String::new());

    lines.push("target:".into());
    lines.push(opt_line("hex", &config.target.hex));
    lines.push(opt_line("flight", &config.target.flight));
    lines.push(String::new());

    lines.push("console:".into());
    lines.push(format!("  alerts: {}", config.console.alerts));
    lines.push(format!("  output: {}", config.console.output));
    lines.push(String::new());

    lines.push("email:".into());
    lines.push(format!("  enabled: {}", config.email.enabled));
    lines.push(opt_line("server", &config.email.server));
    lines.push(format!("  port: {}", config.email.port));
    lines.push(opt_line("username", &config.email.username));
    lines.push(opt_line("password", &config.email.password));
    lines.push(opt_line("sender", &config.email.sender));
    lines.push(opt_line("recipient", &config.email.recipient));
    lines.push(String::new());

    lines.push("sound:".into());
    lines.push(format!("  enabled: {}", config.sound.enabled));
    lines.push(opt_line("mp3", &config.sound.mp3));
    lines.push(opt_line("wav", &config.sound.wav));
    lines.push(String::new());

    lines.push("telegram:".into());
    lines.push(format!("  enabled: {}", config.telegram.enabled));
    lines.push(opt_line("bot_token", &config.telegram.bot_token));
    lines.push(opt_line("chat_id", &config.telegram.chat_id));
    lines.push(format!("  api_base: \"{}\"", config.telegram.api_base));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.interval_secs, 60);
        assert_eq!(config.target.flight.as_deref(), Some("N712JM"));
        assert!(config.target.hex.is_none());
        assert!(config.sound.enabled);
        assert!(!config.email.enabled);
        assert!(!config.telegram.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
# watch the local receiver
source:
  location: "http://127.0.0.1:8080/data/aircraft.json"
  interval_secs: 15

target:
  hex: 'a240dc'
  flight: null

console:
  alerts: yes
  output: true

email:
  enabled: true
  server: smtp.example.com
  port: 2525
  username: "me@example.com"
  password: "hunter2"
  sender: "me@example.com"
  recipient: "you@example.com"

sound:
  enabled: off
  mp3: "chime.mp3"

telegram:
  enabled: true
  bot_token: "123:abc"
  chat_id: "-1001"
"#;
        let config = parse_config(text);
        assert_eq!(
            config.source.location,
            "http://127.0.0.1:8080/data/aircraft.json"
        );
        assert_eq!(config.interval(), Duration::from_secs(15));
        assert_eq!(config.target.hex.as_deref(), Some("a240dc"));
        assert!(config.target.flight.is_none());
        assert!(config.console.alerts);
        assert!(config.email.enabled);
        assert_eq!(config.email.server.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.email.port, 2525);
        assert_eq!(config.email.password.as_deref(), Some("hunter2"));
        assert!(!config.sound.enabled);
        assert_eq!(config.sound.mp3.as_deref(), Some("chime.mp3"));
        assert_eq!(config.sound.wav.as_deref(), Some("alert.wav"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-1001"));
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_and_malformed_lines_ignored() {
        let text = "source:\n  interval_secs: soon\n  colour: blue\nnot a key\n";
        let config = parse_config(text);
        assert_eq!(config.source.interval_secs, 60);
    }

    #[test]
    fn test_validate_rejects_no_target() {
        let mut config = Config::default();
        config.target.flight = None;
        assert!(matches!(config.validate(), Err(AlertError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.source.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_email_fields() {
        let mut config = Config::default();
        config.email.enabled = true;
        config.email.server = Some("smtp.example.com".into());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sender"));
        assert!(err.contains("recipient"));
        assert!(!err.contains("server"));
    }

    #[test]
    fn test_validate_email_requires_login() {
        let mut config = Config::default();
        config.email.enabled = true;
        config.email.server = Some("smtp.example.com".into());
        config.email.sender = Some("me@example.com".into());
        config.email.recipient = Some("you@example.com".into());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("username"));
        assert!(err.contains("password"));

        config.email.username = Some("me@example.com".into());
        let err = config.validate().unwrap_err().to_string();
        assert!(!err.contains("username"));
        assert!(err.contains("password"));

        config.email.password = Some("hunter2".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_telegram_fields() {
        let mut config = Config::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = Some("123:abc".into());
        assert!(config.validate().is_err());
        config.telegram.chat_id = Some("42".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.target.hex = Some("a240dc".into());
        config.telegram.enabled = true;
        config.telegram.bot_token = Some("123:abc".into());
        config.telegram.chat_id = Some("42".into());
        config.sound.wav = None;

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
