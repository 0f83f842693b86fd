//! `bitbybit.toml` site configuration.
//!
//! ```toml
//! [thumbnails]
//! blogs_dir = "blogs"
//! request_delay_ms = 500
//!
//! [theme]
//! retention_days = 365
//! default = "dark"
//!
//! [preview]
//! base = "../"
//! ```
//!
//! Every field has a default, so a missing file or section is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "bitbybit.toml";

/// Error while reading or parsing the config file
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub path: PathBuf,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub thumbnails: ThumbnailConfig,
    pub theme: ThemeConfig,
    pub preview: PreviewConfig,
}

/// Paths and pacing for the resource thumbnail cache builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Directory scanned for `*.html` posts
    pub blogs_dir: PathBuf,
    /// Where downloaded images and `manifest.json` live
    pub cache_dir: PathBuf,
    /// Generated in-page mapping (`const RESOURCE_CACHE = ...`)
    pub script_path: PathBuf,
    /// Site-relative prefix written into each entry's `path`
    pub public_prefix: String,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            blogs_dir: PathBuf::from("blogs"),
            cache_dir: PathBuf::from("assets/images/resource-cache"),
            script_path: PathBuf::from("assets/js/resource-cache-data.js"),
            public_prefix: "assets/images/resource-cache".to_string(),
            request_delay_ms: 500,
            timeout_secs: 15,
            user_agent: "BitByBitBlog/1.0 (https://bitbybit.dev; contact@bitbybit.dev)".to_string(),
        }
    }
}

impl ThumbnailConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join("manifest.json")
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Theme cookie persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub cookie_name: String,
    pub retention_days: u32,
    /// Theme applied (and persisted) on a first visit
    pub default: Theme,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            cookie_name: "theme".to_string(),
            retention_days: 365,
            default: Theme::Dark,
        }
    }
}

/// How post pages reach cached thumbnails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Prefix joined to manifest paths (posts live one level below the root)
    pub base: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { base: "../".to_string() }
    }
}

impl SiteConfig {
    /// Load `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    message: format!("Failed to read: {}", e),
                    path: path.to_path_buf(),
                })
            }
        };

        Self::parse(&raw).map_err(|message| ConfigError {
            message,
            path: path.to_path_buf(),
        })
    }

    /// Load `bitbybit.toml` from the working directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(CONFIG_FILE))
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| format!("Invalid config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = SiteConfig::parse("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.thumbnails.request_delay(), Duration::from_millis(500));
        assert_eq!(config.theme.retention_days, 365);
        assert_eq!(config.theme.default, Theme::Dark);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = SiteConfig::parse(
            r#"
            [thumbnails]
            blogs_dir = "posts"
            request_delay_ms = 0

            [theme]
            default = "light"
            "#,
        )
        .unwrap();
        assert_eq!(config.thumbnails.blogs_dir, PathBuf::from("posts"));
        assert_eq!(config.thumbnails.timeout_secs, 15);
        assert_eq!(
            config.thumbnails.manifest_path(),
            PathBuf::from("assets/images/resource-cache/manifest.json")
        );
        assert_eq!(config.theme.default, Theme::Light);
        assert_eq!(config.theme.cookie_name, "theme");
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(SiteConfig::parse("[theme]\ndefault = \"sepia\"").is_err());
        assert!(SiteConfig::parse("thumbnails = 3").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
