//! Credential/test-data providers.
//!
//! Scenarios are data-driven: a provider returns the ordered credential
//! records registered under a scenario key. The YAML-backed provider reads
//! fixture files shaped as `key: [{username, password}, …]`; the static
//! provider serves in-memory data for tests.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::result::{PilotarError, PilotarResult};

/// One username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
}

impl CredentialRecord {
    /// Create a credential record
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Source of scenario-keyed test data
pub trait DataProvider {
    /// The ordered credential records registered under `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::Data`] for an unknown key.
    fn credentials_for(&self, scenario: &str) -> PilotarResult<Vec<CredentialRecord>>;
}

/// Provider backed by a YAML fixture file
#[derive(Debug, Clone, Default)]
pub struct YamlDataProvider {
    datasets: HashMap<String, Vec<CredentialRecord>>,
}

impl YamlDataProvider {
    /// Parse a provider from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml_str(yaml: &str) -> PilotarResult<Self> {
        Ok(Self {
            datasets: serde_yaml_ng::from_str(yaml)?,
        })
    }

    /// Load a provider from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PilotarResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Registered scenario keys
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }
}

impl DataProvider for YamlDataProvider {
    fn credentials_for(&self, scenario: &str) -> PilotarResult<Vec<CredentialRecord>> {
        self.datasets
            .get(scenario)
            .cloned()
            .ok_or_else(|| PilotarError::Data {
                message: format!("no credentials registered for scenario '{scenario}'"),
            })
    }
}

/// In-memory provider for tests
#[derive(Debug, Clone, Default)]
pub struct StaticDataProvider {
    datasets: HashMap<String, Vec<CredentialRecord>>,
}

impl StaticDataProvider {
    /// Create an empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register records under a scenario key
    #[must_use]
    pub fn with_dataset(
        mut self,
        scenario: impl Into<String>,
        records: Vec<CredentialRecord>,
    ) -> Self {
        let _ = self.datasets.insert(scenario.into(), records);
        self
    }
}

impl DataProvider for StaticDataProvider {
    fn credentials_for(&self, scenario: &str) -> PilotarResult<Vec<CredentialRecord>> {
        self.datasets
            .get(scenario)
            .cloned()
            .ok_or_else(|| PilotarError::Data {
                message: format!("no credentials registered for scenario '{scenario}'"),
            })
    }
}
