//! Harness configuration.
//!
//! Loaded from YAML, with working defaults for every field so a missing
//! config file is never fatal to unit-level use. The browser section only
//! matters to the `browser`-feature driver; the core consumes `base_url`,
//! the timeout budget, and the screenshot directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::locator::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::PilotarResult;

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Browser to drive (only `chromium` is supported by the CDP driver)
    pub name: String,
    /// Run without a visible window
    pub headless: bool,
    /// Start maximized
    pub maximize: bool,
    /// Window width when not maximized
    pub window_width: u32,
    /// Window height when not maximized
    pub window_height: u32,
    /// Explicit browser binary path (`None` = auto-detect)
    pub binary_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Page load timeout in seconds
    pub page_load_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            name: "chromium".to_string(),
            headless: true,
            maximize: false,
            window_width: 1920,
            window_height: 1080,
            binary_path: None,
            sandbox: true,
            page_load_timeout_secs: 30,
        }
    }
}

/// Polling and timeout budget for element lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Per-strategy element timeout in milliseconds
    pub element_ms: u64,
    /// Interval between presence probes in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            element_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TimeoutSettings {
    /// Per-strategy element timeout
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    /// Interval between presence probes
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL that page paths are joined onto
    pub base_url: String,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Element polling budget
    pub timeouts: TimeoutSettings,
    /// Directory failure screenshots are written to
    pub screenshot_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            browser: BrowserSettings::default(),
            timeouts: TimeoutSettings::default(),
            screenshot_dir: PathBuf::from("reports/screenshots"),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PilotarResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&raw)?)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Set the per-strategy element timeout
    #[must_use]
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.element_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.timeouts.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Join a page path onto the base URL.
    ///
    /// Absolute URLs pass through untouched; relative paths are joined onto
    /// `base_url` with exactly one separating slash.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert!(config.browser.headless);
        assert!(config.browser.sandbox);
        assert_eq!(config.timeouts.element_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(
            config.timeouts.poll_interval(),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
    }

    #[test]
    fn test_builders() {
        let config = HarnessConfig::default()
            .with_base_url("https://app.example.com")
            .with_headless(false)
            .with_element_timeout(Duration::from_secs(3))
            .with_poll_interval(Duration::from_millis(50));
        assert_eq!(config.base_url, "https://app.example.com");
        assert!(!config.browser.headless);
        assert_eq!(config.timeouts.element_timeout(), Duration::from_secs(3));
        assert_eq!(config.timeouts.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_page_url_joining() {
        let config = HarnessConfig::default().with_base_url("https://app.example.com/");
        assert_eq!(config.page_url("/login"), "https://app.example.com/login");
        assert_eq!(config.page_url("login"), "https://app.example.com/login");
        assert_eq!(
            config.page_url("https://other.example.com/login"),
            "https://other.example.com/login"
        );
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r"
base_url: https://staging.example.com
browser:
  headless: false
  window_width: 1280
timeouts:
  element_ms: 5000
"
        )
        .unwrap();

        let config = HarnessConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://staging.example.com");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_width, 1280);
        // unset fields keep their defaults
        assert_eq!(config.browser.window_height, 1080);
        assert_eq!(config.timeouts.element_ms, 5000);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = HarnessConfig::load("/nonexistent/config.yaml").unwrap_err();
        assert!(matches!(err, crate::PilotarError::Io(_)));
    }
}
