//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::conversion::{TargetFormat, TargetQuality};
use crate::domain::recording::Duration;

/// Default conversion service address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default bitrate requested for WebM/Ogg recordings
pub const DEFAULT_BITRATE: u32 = 128_000;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub max_duration: Option<String>,
    pub timeslice_ms: Option<u64>,
    pub bitrate: Option<u32>,
    pub output_dir: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            format: Some(TargetFormat::default().to_string()),
            quality: Some(TargetQuality::default().to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            timeslice_ms: Some(Duration::default_timeslice().as_millis()),
            bitrate: Some(DEFAULT_BITRATE),
            output_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            server_url: other.server_url.or(self.server_url),
            format: other.format.or(self.format),
            quality: other.quality.or(self.quality),
            max_duration: other.max_duration.or(self.max_duration),
            timeslice_ms: other.timeslice_ms.or(self.timeslice_ms),
            bitrate: other.bitrate.or(self.bitrate),
            output_dir: other.output_dir.or(self.output_dir),
        }
    }

    pub fn server_url_or_default(&self) -> &str {
        self.server_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Fragment interval; zero falls back to the default
    pub fn timeslice_or_default(&self) -> Duration {
        self.timeslice_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(Duration::default_timeslice)
    }

    pub fn bitrate_or_default(&self) -> u32 {
        self.bitrate.filter(|b| *b > 0).unwrap_or(DEFAULT_BITRATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.server_url.as_deref(), Some(DEFAULT_SERVER_URL));
        assert_eq!(config.format.as_deref(), Some("mp3"));
        assert_eq!(config.quality.as_deref(), Some("192"));
        assert_eq!(config.max_duration.as_deref(), Some("10m"));
        assert_eq!(config.timeslice_ms, Some(500));
        assert_eq!(config.bitrate, Some(128_000));
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.server_url.is_none());
        assert!(config.format.is_none());
        assert!(config.quality.is_none());
        assert!(config.timeslice_ms.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            server_url: Some("http://base:5000".to_string()),
            format: Some("mp3".to_string()),
            quality: Some("128".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            server_url: Some("http://other:5000".to_string()),
            format: None,
            quality: Some("320".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.server_url.as_deref(), Some("http://other:5000"));
        assert_eq!(merged.format.as_deref(), Some("mp3"));
        assert_eq!(merged.quality.as_deref(), Some("320"));
    }

    #[test]
    fn typed_accessors_parse() {
        let config = AppConfig {
            timeslice_ms: Some(250),
            bitrate: Some(96_000),
            ..Default::default()
        };
        assert_eq!(config.timeslice_or_default().as_millis(), 250);
        assert_eq!(config.bitrate_or_default(), 96_000);
    }

    #[test]
    fn typed_accessors_fall_back_on_invalid() {
        let config = AppConfig {
            server_url: Some("  ".to_string()),
            timeslice_ms: Some(0),
            bitrate: Some(0),
            ..Default::default()
        };
        assert_eq!(config.server_url_or_default(), DEFAULT_SERVER_URL);
        assert_eq!(config.timeslice_or_default().as_millis(), 500);
        assert_eq!(config.bitrate_or_default(), DEFAULT_BITRATE);
    }
}
