use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading page config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing page config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timings and thresholds of the page shell. Every field is optional in the
/// JSON form; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Splash duration before the page mounts.
    pub loading_delay_ms: u64,
    /// Minimum interval between scroll-progress recomputes.
    pub scroll_throttle_ms: u64,
    /// Scroll offset (px) past which the nav bar shows its solid surface.
    pub nav_scrolled_threshold: f32,
    /// Anchor navigation pan duration.
    pub smooth_scroll_ms: u64,
    /// Entrance easing duration.
    pub reveal_duration_ms: u64,
    /// Simulated contact form round trip.
    pub submit_delay_ms: u64,
    /// How long the success message stays up.
    pub success_reset_ms: u64,
    /// Storage key of the persisted theme.
    pub theme_key: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: 2000,
            scroll_throttle_ms: 16,
            nav_scrolled_threshold: 10.0,
            smooth_scroll_ms: 600,
            reveal_duration_ms: 600,
            submit_delay_ms: 1500,
            success_reset_ms: 5000,
            theme_key: vitrine_core::DEFAULT_THEME_KEY.to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }

    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }

    pub fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.reveal_duration_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PageConfig::from_json_str(r#"{ "loading_delay_ms": 0, "theme_key": "vitrine.theme" }"#)
            .unwrap();
        assert_eq!(cfg.loading_delay(), Duration::ZERO);
        assert_eq!(cfg.theme_key, "vitrine.theme");
        assert_eq!(cfg.submit_delay(), Duration::from_millis(1500));
        assert_eq!(cfg.nav_scrolled_threshold, 10.0);
    }

    #[test]
    fn rejects_wrong_types() {
        let err = PageConfig::from_json_str(r#"{ "loading_delay_ms": "soon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("vitrine-page-no-such-config.json");
        let err = PageConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
