//! Configuration file handling.
//!
//! The config lives in `$XDG_CONFIG_HOME/spotify-tools/config.toml`
//! (`~/.config/spotify-tools/config.toml` when `XDG_CONFIG_HOME` is unset):
//!
//! ```toml
//! [spotify]
//! access_token = "BQD..."
//! market = "DE"
//!
//! [matching]
//! include_threshold = 0.2
//! good_match_threshold = 0.3
//! auto_accept_threshold = 0.4
//! poor_match_threshold = 0.4
//! ```
//!
//! Unknown keys (such as OAuth client credentials) are ignored.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::resolver::Thresholds;

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 100;
/// Environment variable that overrides `spotify.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpotifyConfig {
    pub access_token: Option<String>,
    pub api_base: Option<String>,
    pub market: Option<String>,
    pub request_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchingConfig {
    pub include_threshold: Option<f64>,
    pub good_match_threshold: Option<f64>,
    pub auto_accept_threshold: Option<f64>,
    pub poor_match_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spotify: SpotifyConfig,

    #[serde(default)]
    pub matching: MatchingConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$XDG_CONFIG_HOME/spotify-tools/config.toml`, else `$HOME/.config/spotify-tools/config.toml`.
    pub fn get_config_path() -> Result<PathBuf, io::Error> {
        let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var_os("HOME").ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set")
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("spotify-tools").join("config.toml"))
    }

    /// Load from the default location; a missing file gives an empty config.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            return Ok(Config::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Thresholds with unset values taken from the defaults.
    pub fn thresholds(&self) -> Thresholds {
        let d = Thresholds::default();
        Thresholds {
            include: self.matching.include_threshold.unwrap_or(d.include),
            good_match: self.matching.good_match_threshold.unwrap_or(d.good_match),
            auto_accept: self.matching.auto_accept_threshold.unwrap_or(d.auto_accept),
            poor_match: self.matching.poor_match_threshold.unwrap_or(d.poor_match),
        }
    }

    /// Access token from the environment, else from the file.
    pub fn access_token(&self) -> Option<String> {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.spotify.access_token.clone())
    }

    pub fn api_base(&self) -> &str {
        self.spotify.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn request_interval_ms(&self) -> u64 {
        self.spotify.request_interval_ms.unwrap_or(DEFAULT_REQUEST_INTERVAL_MS)
    }

    /// Print the config in a human-readable format.  The token is never shown.
    pub fn print(&self, title: &str) {
        println!("{}:", title);

        if self.spotify.access_token.is_some() {
            println!("  Access token:        (set)");
        }
        if let Some(api_base) = &self.spotify.api_base {
            println!("  API base:            {}", api_base);
        }
        if let Some(market) = &self.spotify.market {
            println!("  Market:              {}", market);
        }
        if let Some(interval) = self.spotify.request_interval_ms {
            println!("  Request interval:    {} ms", interval);
        }
        if let Some(v) = self.matching.include_threshold {
            println!("  Include threshold:   {:.2}", v);
        }
        if let Some(v) = self.matching.good_match_threshold {
            println!("  Good match:          {:.2}", v);
        }
        if let Some(v) = self.matching.auto_accept_threshold {
            println!("  Auto accept:         {:.2}", v);
        }
        if let Some(v) = self.matching.poor_match_threshold {
            println!("  Poor match:          {:.2}", v);
        }
    }
}
