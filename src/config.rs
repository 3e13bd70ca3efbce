//! Configuration file parser for `tubefeed.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`,
//! and the API key can come from the `YOUTUBE_API_KEY` environment variable
//! alone. Unknown keys are accepted, though we log a warning when the file
//! contains potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::{FeedSettings, DEFAULT_OUTPUT_PATH, DEFAULT_TTL_MINUTES};
use crate::model::Collection;
use crate::pipeline::PipelineConfig;
use crate::youtube::DEFAULT_API_BASE;

/// Environment variable holding the API key. Takes precedence over the file.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "tubefeed.toml";

pub const DEFAULT_WINDOW_DAYS: u32 = 14;

const DEFAULT_DESCRIPTION: &str =
    "Auto-generated feed of recently published videos from YouTube playlist.";

const FALLBACK_LINK: &str = "https://www.youtube.com/";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("No API key: set YOUTUBE_API_KEY or `api_key` in the config file")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// SEC-015: Custom Debug impl masks `api_key` to prevent secret leakage
/// in logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API key (alternative to the YOUTUBE_API_KEY env var).
    pub api_key: Option<String>,

    /// Display name → playlist id. Names become item categories.
    pub playlists: BTreeMap<String, String>,

    /// Single-playlist shorthand, merged with `playlists`.
    pub playlist_id: Option<String>,

    /// Display name for `playlist_id`; defaults to the id itself.
    pub playlist_name: Option<String>,

    /// Length of the trailing publish window, in days.
    pub window_days: u32,

    /// Where the feed is written.
    pub output: PathBuf,

    pub title: Option<String>,
    pub description: String,
    pub link: Option<String>,

    /// Base URL of the YouTube Data API.
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            playlists: BTreeMap::new(),
            playlist_id: None,
            playlist_name: None,
            window_days: DEFAULT_WINDOW_DAYS,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            title: None,
            description: DEFAULT_DESCRIPTION.to_string(),
            link: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// SEC-015: Mask api_key in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("playlists", &self.playlists)
            .field("playlist_id", &self.playlist_id)
            .field("playlist_name", &self.playlist_name)
            .field("window_days", &self.window_days)
            .field("output", &self.output)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("link", &self.link)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "api_key",
        "playlists",
        "playlist_id",
        "playlist_name",
        "window_days",
        "output",
        "title",
        "description",
        "link",
        "api_base_url",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            playlists = config.playlists.len() + usize::from(config.playlist_id.is_some()),
            window_days = config.window_days,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Configured collections, in name order.
    ///
    /// The single-playlist shorthand is merged into the `playlists` table.
    /// A blank playlist id, or one name mapped to two different ids, is an
    /// error.
    pub fn collections(&self) -> Result<Vec<Collection>, ConfigError> {
        let mut merged = self.playlists.clone();

        if let Some(id) = &self.playlist_id {
            let name = self.playlist_name.clone().unwrap_or_else(|| id.clone());
            match merged.get(&name) {
                Some(existing) if existing != id => {
                    return Err(ConfigError::Invalid(format!(
                        "playlist '{name}' is configured twice with different ids"
                    )));
                }
                _ => {
                    merged.insert(name, id.clone());
                }
            }
        }

        merged
            .into_iter()
            .map(|(name, id)| {
                let id = id.trim();
                if id.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "playlist '{name}' has an empty id"
                    )));
                }
                Ok(Collection::new(name, id))
            })
            .collect()
    }

    /// Returns the API key, preferring the environment over the file.
    pub fn resolve_api_key(&self) -> Result<SecretString, ConfigError> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        Self::pick_api_key(from_env, self.api_key.clone())
    }

    fn pick_api_key(
        from_env: Option<String>,
        from_file: Option<String>,
    ) -> Result<SecretString, ConfigError> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| from_file.filter(|k| !k.trim().is_empty()))
            .map(|k| SecretString::from(k.trim().to_string()))
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Channel fields for the given collections.
    pub fn feed_settings(&self, collections: &[Collection]) -> FeedSettings {
        let title = self.title.clone().unwrap_or_else(|| {
            format!("Custom YouTube Playlist (last {} days)", self.window_days)
        });
        let link = match (&self.link, collections) {
            (Some(link), _) => link.clone(),
            (None, [only]) => only.playlist_url(),
            (None, _) => FALLBACK_LINK.to_string(),
        };

        FeedSettings {
            title,
            description: self.description.clone(),
            link: Some(link),
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }

    /// Everything the pipeline needs from this file.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let collections = self.collections()?;
        if collections.is_empty() {
            tracing::warn!("No playlists configured; the feed will have no items");
        }
        let feed = self.feed_settings(&collections);
        Ok(PipelineConfig {
            collections,
            window_days: self.window_days,
            feed,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
