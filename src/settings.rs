//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::board::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_SIDE, MIN_SIDE};
use crate::game::GameConfig;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Board dimensions
    pub board: BoardSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [single] = keys {
        serializer.serialize_str(single)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Board dimensions in cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub width: usize,
    pub height: usize,
}

/// Gameplay settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Give each shape a fixed color instead of a random one
    pub color_by_shape: bool,
    /// Fixed seed for a reproducible piece sequence
    pub seed: Option<u64>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate: vec!["Up".to_string(), "x".to_string()],
            pause: vec!["p".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Where loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    /// No settings file yet; defaults are in use
    Missing,
    /// Read and parsed from disk
    File,
    /// A file exists but could not be read or parsed; defaults are in use
    Invalid,
}

impl SettingsSource {
    /// Only write when there is no user file that could be clobbered
    pub fn should_save(self) -> bool {
        self == SettingsSource::Missing
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the platform config directory
    pub fn load() -> (Self, SettingsSource) {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => (Self::default(), SettingsSource::Missing),
        }
    }

    /// Load settings from `path`, falling back to defaults when it is absent or broken
    pub fn load_from(path: &Path) -> (Self, SettingsSource) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return (Self::default(), SettingsSource::Missing);
            }
            Err(e) => {
                tracing::warn!("Could not read {}, using defaults: {}", path.display(), e);
                return (Self::default(), SettingsSource::Invalid);
            }
        };

        match Self::parse(&contents) {
            Ok(settings) => (settings, SettingsSource::File),
            Err(e) => {
                tracing::warn!("Invalid settings in {}, using defaults: {}", path.display(), e);
                (Self::default(), SettingsSource::Invalid)
            }
        }
    }

    /// Parse TOML; missing keys take their defaults
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Save settings to the platform config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create directory if needed
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        // Serialize and write
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Engine options derived from these settings
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.board.width.clamp(MIN_SIDE, MAX_SIDE),
            height: self.board.height.clamp(MIN_SIDE, MAX_SIDE),
            color_by_shape: self.gameplay.color_by_shape,
        }
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::parse(
            r#"
            [board]
            width = 10

            [keys]
            rotate = "w"
            "#,
        )
        .unwrap();
        assert_eq!(settings.board.width, 10);
        assert_eq!(settings.board.height, DEFAULT_HEIGHT);
        assert_eq!(settings.keys.rotate, vec!["w".to_string()]);
        assert_eq!(settings.keys.move_left, vec!["Left".to_string()]);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_key_list_roundtrip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        // One key is written as a plain string, several as an array
        assert!(text.contains("move_left = \"Left\""));
        assert!(text.contains("rotate = ["));
        assert_eq!(Settings::parse(&text).unwrap(), settings);
    }

    /// A fresh directory under the system temp dir
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "blockfall-settings-{}-{}-{:08x}",
            name,
            std::process::id(),
            rand::random::<u32>()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_invalid_file_falls_back() {
        assert!(Settings::parse("board = 3").is_err());
    }

    #[test]
    fn test_missing_file_is_written_once() {
        let dir = scratch_dir("missing");
        let path = dir.join("config").join("settings.toml");

        let (settings, source) = Settings::load_from(&path);
        assert_eq!(source, SettingsSource::Missing);
        assert!(source.should_save());
        settings.save_to(&path).unwrap();

        let (reloaded, source) = Settings::load_from(&path);
        assert_eq!(source, SettingsSource::File);
        assert!(!source.should_save());
        assert_eq!(reloaded, settings);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_broken_file_is_left_alone() {
        let dir = scratch_dir("broken");
        let path = dir.join("settings.toml");
        let original = "[board]\nwidth = \"16\"\nheight = 30\n[keys]\nrotate = \"w\"\n";
        fs::write(&path, original).unwrap();

        let (settings, source) = Settings::load_from(&path);
        assert_eq!(source, SettingsSource::Invalid);
        assert_eq!(settings, Settings::default());
        assert!(!source.should_save());
        // The user's file survives for them to fix
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_game_config_clamps_board() {
        let mut settings = Settings::default();
        settings.board.width = 1000;
        settings.gameplay.color_by_shape = true;
        let config = settings.game_config();
        assert_eq!(config.width, MAX_SIDE);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(config.color_by_shape);
    }
}
