use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Hourly balloon feed: `{base_url}/00.json` is the current hour
pub const DEFAULT_BASE_URL: &str = "https://a.windbornesystems.com/treasure";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub animation: AnimationSettings,
    pub view: ViewSettings,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub base_url: String,
    pub hours: usize,
    pub timeout_secs: u64,
    /// Multiplier taking feed altitudes to meters (the feed publishes km)
    pub altitude_unit_meters: f64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hours: 24,
            timeout_secs: 10,
            altitude_unit_meters: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Seconds for the full replay
    pub duration_secs: f64,
    /// Seconds per rendered frame
    pub frame_secs: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration_secs: crate::engine::playback::DEFAULT_DURATION_SECS,
            frame_secs: 1.0 / 30.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub color_scheme: u8,
    pub autoplay: bool,
}

impl Settings {
    /// Load the user config file, falling back to defaults when it is missing
    /// or unreadable
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| Error::Config {
            path: path.display().to_string(),
            source,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skytrail")
            .join("config.toml")
    }
}
