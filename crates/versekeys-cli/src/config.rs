//! Configuration file support for versekeys
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/versekeys/config.toml`
//! - macOS: `~/Library/Application Support/versekeys/config.toml`
//! - Windows: `%APPDATA%\versekeys\config.toml`

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Speech engine configuration
    pub speech: SpeechSettings,
    /// MIDI configuration
    pub midi: MidiSettings,
}

/// Speech engine parameters supplied per request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Speaking rate as a multiplier of the engine's normal rate.
    /// Slow by default so pitch differences stay audible.
    pub rate: f32,
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Preferred voice, matched by name substring (engine-dependent)
    pub voice: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 0.6,
            volume: 1.0,
            voice: None,
        }
    }
}

/// MIDI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Client name reported to the MIDI backend
    pub client_name: String,
    /// Preferred device, matched by name substring; skips the selection
    /// prompt when it matches exactly one port
    pub device: Option<String>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            client_name: "versekeys".to_string(),
            device: None,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("config file not found at {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "versekeys") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(anyhow!("could not determine config directory"))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r#"# versekeys configuration file

[speech]
# Speaking rate relative to the engine's normal rate.
# Slower rates make per-note pitch differences much easier to hear.
rate = 0.6

# Volume (0.0 - 1.0)
volume = 1.0

# Preferred voice, matched by name substring (optional)
# voice = "Samantha"

[midi]
# Client name reported to the MIDI backend
client_name = "versekeys"

# Preferred MIDI input device, matched by name substring (optional).
# Skips the selection prompt when it matches exactly one port.
# device = "Keystation"
"#;

        fs::write(&path, content)?;
        Ok(path)
    }
}
