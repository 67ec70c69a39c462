//! Scenario schema and per-step results.
//!
//! A scenario is an ordered list of keyword steps, loadable from YAML.
//! Execution produces one [`StepRecord`] per attempted step, collected into
//! a [`ScenarioReport`] for downstream reporting. Nothing here is persisted;
//! the report lives in memory and belongs to the caller.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keyword::{Keyword, StepData};
use crate::result::PilotarResult;

/// One keyword invocation in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordStep {
    /// The keyword to execute
    pub action: Keyword,
    /// Keyword-specific data payload
    #[serde(default)]
    pub data: StepData,
    /// Keep executing later steps even if this one fails
    #[serde(default)]
    pub continue_on_failure: bool,
}

impl KeywordStep {
    /// Create a step with an empty payload
    #[must_use]
    pub fn new(action: Keyword) -> Self {
        Self {
            action,
            data: StepData::new(),
            continue_on_failure: false,
        }
    }

    /// Attach a data field
    #[must_use]
    pub fn with_data(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let _ = self.data.insert(field.into(), value.into());
        self
    }

    /// Let the scenario continue past a failure of this step
    #[must_use]
    pub const fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = true;
        self
    }
}

/// An ordered, named sequence of keyword steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, used in logs and reports
    #[serde(default)]
    pub name: String,
    /// Steps in execution order
    pub steps: Vec<KeywordStep>,
}

impl Scenario {
    /// Create a scenario from its steps
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<KeywordStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Parse a scenario from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or names an unknown keyword.
    pub fn from_yaml_str(yaml: &str) -> PilotarResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PilotarResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the scenario has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    /// Step completed without error
    Pass,
    /// Step raised an error
    Fail,
}

/// Record of one attempted step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// The keyword that ran
    pub action: Keyword,
    /// Pass or fail
    pub status: StepStatus,
    /// Error message for failed steps
    pub error: Option<String>,
    /// Wall-clock duration of the step
    pub duration: Duration,
}

impl StepRecord {
    /// Record a passing step
    #[must_use]
    pub const fn pass(action: Keyword, duration: Duration) -> Self {
        Self {
            action,
            status: StepStatus::Pass,
            error: None,
            duration,
        }
    }

    /// Record a failing step with its error message
    #[must_use]
    pub fn fail(action: Keyword, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            action,
            status: StepStatus::Fail,
            error: Some(error.into()),
            duration,
        }
    }

    /// Whether the step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == StepStatus::Pass
    }
}

/// Scenario execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioState {
    /// Steps are still executing
    Running,
    /// A step failed without `continue_on_failure`; later steps never ran
    Halted,
    /// The last step finished (continued failures included)
    Completed,
}

/// Results of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Terminal state of the run
    pub state: ScenarioState,
    /// One record per attempted step, in order
    pub records: Vec<StepRecord>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl ScenarioReport {
    /// Whether every attempted step passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(StepRecord::passed)
    }

    /// Count of passing steps
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.passed()).count()
    }

    /// Count of failing steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.passed()).count()
    }

    /// Number of attempted steps
    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// The failing records, in order
    #[must_use]
    pub fn failures(&self) -> Vec<&StepRecord> {
        self.records.iter().filter(|r| !r.passed()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builders() {
        let step = KeywordStep::new(Keyword::FillUsername)
            .with_data("value", "a@b.com")
            .continue_on_failure();
        assert_eq!(step.action, Keyword::FillUsername);
        assert_eq!(step.data["value"], "a@b.com");
        assert!(step.continue_on_failure);
    }

    #[test]
    fn test_scenario_from_yaml() {
        let yaml = r#"
name: valid login
steps:
  - action: open_login_page
    data:
      url: /login
  - action: fill_username
    data:
      value: a@b.com
  - action: fill_password
    data:
      value: x
  - action: click_login
  - action: verify_login_success
    data:
      expected_text: Welcome
"#;
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(scenario.name, "valid login");
        assert_eq!(scenario.len(), 5);
        assert!(!scenario.is_empty());
        assert_eq!(scenario.steps[0].action, Keyword::OpenLoginPage);
        assert!(!scenario.steps[0].continue_on_failure);
        assert_eq!(scenario.steps[4].data["expected_text"], "Welcome");
    }

    #[test]
    fn test_scenario_with_unknown_action_fails() {
        let yaml = "steps:\n  - action: make_coffee\n";
        let err = Scenario::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("make_coffee"));
    }

    #[test]
    fn test_scenario_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name: smoke\nsteps:\n  - action: click_logout\n").unwrap();
        let scenario = Scenario::from_yaml_file(file.path()).unwrap();
        assert_eq!(scenario.name, "smoke");
        assert_eq!(scenario.steps[0].action, Keyword::ClickLogout);
    }

    #[test]
    fn test_report_counters() {
        let report = ScenarioReport {
            run_id: Uuid::new_v4(),
            scenario: "counters".to_string(),
            started_at: Utc::now(),
            state: ScenarioState::Completed,
            records: vec![
                StepRecord::pass(Keyword::OpenLoginPage, Duration::from_millis(3)),
                StepRecord::fail(Keyword::ClickLogin, "boom", Duration::from_millis(1)),
                StepRecord::pass(Keyword::ClickLogout, Duration::from_millis(2)),
            ],
            duration: Duration::from_millis(6),
        };
        assert!(!report.all_passed());
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.failures()[0].action, Keyword::ClickLogin);
    }

    #[test]
    fn test_step_record_serializes_status_uppercase() {
        let record = StepRecord::pass(Keyword::ClickLogin, Duration::ZERO);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"PASS\""));
        assert!(json.contains("click_login"));
    }
}
