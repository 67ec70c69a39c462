//! Result and error types for Pilotar.

use thiserror::Error;

/// Result type for Pilotar operations
pub type PilotarResult<T> = Result<T, PilotarError>;

/// Errors that can occur in Pilotar
#[derive(Debug, Error)]
pub enum PilotarError {
    /// Locator descriptor is malformed (configuration bug, never retried)
    #[error("Invalid locator: {message}")]
    InvalidLocator {
        /// What was wrong with the descriptor
        message: String,
    },

    /// Every strategy in a fallback chain timed out
    #[error("Element not found after {timeout_ms}ms per strategy: {chain}")]
    ElementNotFound {
        /// Rendered descriptor chain, for diagnostics
        chain: String,
        /// Per-strategy timeout that was exhausted
        timeout_ms: u64,
    },

    /// Scenario step referenced a keyword that is not registered
    #[error("Unknown keyword: {name}")]
    UnknownKeyword {
        /// The unrecognized keyword name
        name: String,
    },

    /// Semantic verification failed (scenario-fatal unless the step continues)
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Step data is missing a required field
    #[error("Keyword '{keyword}' requires data field '{field}'")]
    MissingData {
        /// Keyword that was being executed
        keyword: String,
        /// Name of the missing field
        field: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element interaction (click, fill, read) failed
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Embedded script execution failed
    #[error("Script execution failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Browser could not be launched
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Harness configuration is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Test data lookup failed
    #[error("Data provider error: {message}")]
    Data {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PilotarError {
    /// Whether the error came from a verification keyword rather than a
    /// broken interaction. Useful for reporting layers that distinguish
    /// "the page was wrong" from "the harness could not drive the page".
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
