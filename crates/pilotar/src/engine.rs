//! Keyword dispatch and scenario execution.
//!
//! Two layers. [`KeywordEngine::execute_keyword`] dispatches one keyword to
//! its page action and re-raises whatever the action raises (logged, never
//! swallowed). [`KeywordEngine::execute_scenario`] runs steps in order,
//! converting each error into a recorded failure and halting at the first
//! failure whose step does not opt into `continue_on_failure`.
//!
//! Verification keywords raise on semantic mismatch instead of returning
//! false, so every scenario failure is uniformly error-driven at this layer.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::keyword::{Keyword, StepData};
use crate::page::{DashboardPage, Interactor, LoginPage, Page};
use crate::result::{PilotarError, PilotarResult};
use crate::scenario::{KeywordStep, Scenario, ScenarioReport, ScenarioState, StepRecord};
use crate::session::PageSession;

/// Executes keywords and scenarios against one browser session
#[derive(Debug)]
pub struct KeywordEngine<S: PageSession> {
    config: HarnessConfig,
    login_page: LoginPage<S>,
    dashboard_page: DashboardPage<S>,
}

impl<S: PageSession> KeywordEngine<S> {
    /// Create an engine over a session, building both page objects on a
    /// shared interactor
    #[must_use]
    pub fn new(session: Arc<S>, config: HarnessConfig) -> Self {
        let interactor = Interactor::new(session, &config);
        Self {
            login_page: LoginPage::new(interactor.clone()),
            dashboard_page: DashboardPage::new(interactor),
            config,
        }
    }

    /// The login page object
    #[must_use]
    pub const fn login_page(&self) -> &LoginPage<S> {
        &self.login_page
    }

    /// The dashboard page object
    #[must_use]
    pub const fn dashboard_page(&self) -> &DashboardPage<S> {
        &self.dashboard_page
    }

    /// Execute a keyword named by its wire string.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::UnknownKeyword`] for an unregistered name,
    /// otherwise whatever the keyword itself raises.
    pub fn execute_named(&self, name: &str, data: &StepData) -> PilotarResult<()> {
        self.execute_keyword(name.parse()?, data)
    }

    /// Execute one keyword against its page action.
    ///
    /// # Errors
    ///
    /// Re-raises any error the bound action raises; verification keywords
    /// raise [`PilotarError::AssertionFailed`] on semantic mismatch.
    pub fn execute_keyword(&self, keyword: Keyword, data: &StepData) -> PilotarResult<()> {
        info!(keyword = %keyword, "executing keyword");
        let result = self.dispatch(keyword, data);
        match &result {
            Ok(()) => info!(keyword = %keyword, "keyword passed"),
            Err(e) => error!(keyword = %keyword, error = %e, "keyword failed"),
        }
        result
    }

    fn dispatch(&self, keyword: Keyword, data: &StepData) -> PilotarResult<()> {
        match keyword {
            Keyword::OpenLoginPage => {
                let path = optional_str(data, "url").unwrap_or("/login");
                self.login_page.open(&self.config.page_url(path))
            }
            Keyword::FillUsername => {
                let value = require_str(data, keyword, "value")?;
                self.login_page.enter_username(value)
            }
            Keyword::FillPassword => {
                let value = require_str(data, keyword, "value")?;
                self.login_page.enter_password(value)
            }
            Keyword::ClickLogin => self.login_page.click_login_button(),
            Keyword::VerifyLoginSuccess => {
                let expected = optional_str(data, "expected_text").unwrap_or("Welcome");
                self.verify_login_success(expected)
            }
            Keyword::ClickLogout => self.dashboard_page.click_logout(),
            Keyword::VerifyDashboardLoaded => {
                if self.dashboard_page.is_loaded() {
                    Ok(())
                } else {
                    Err(PilotarError::AssertionFailed {
                        message: "dashboard page did not load".to_string(),
                    })
                }
            }
        }
    }

    /// Verify the login landed on the dashboard and the greeting matches.
    ///
    /// `is_loaded` polls for the greeting within the configured element
    /// budget, so no fixed sleep is needed between clicking login and
    /// verifying.
    fn verify_login_success(&self, expected: &str) -> PilotarResult<()> {
        if !self.dashboard_page.is_loaded() {
            return Err(PilotarError::AssertionFailed {
                message: "login did not reach the dashboard".to_string(),
            });
        }

        match self.dashboard_page.welcome_message() {
            Some(message) if message.contains(expected) => Ok(()),
            Some(message) => Err(PilotarError::AssertionFailed {
                message: format!(
                    "expected welcome message containing '{expected}', got '{message}'"
                ),
            }),
            None => Err(PilotarError::AssertionFailed {
                message: format!("expected welcome message containing '{expected}', got none"),
            }),
        }
    }

    /// Run a named scenario.
    pub fn execute_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        self.run(&scenario.name, &scenario.steps)
    }

    /// Run a bare step sequence.
    pub fn execute_steps(&self, steps: &[KeywordStep]) -> ScenarioReport {
        self.run("", steps)
    }

    fn run(&self, name: &str, steps: &[KeywordStep]) -> ScenarioReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let mut records = Vec::with_capacity(steps.len());
        let mut state = ScenarioState::Running;

        info!(scenario = name, steps = steps.len(), run_id = %run_id, "scenario started");

        for step in steps {
            let step_start = Instant::now();
            match self.execute_keyword(step.action, &step.data) {
                Ok(()) => {
                    records.push(StepRecord::pass(step.action, step_start.elapsed()));
                }
                Err(e) => {
                    records.push(StepRecord::fail(
                        step.action,
                        e.to_string(),
                        step_start.elapsed(),
                    ));
                    if !step.continue_on_failure {
                        state = ScenarioState::Halted;
                        break;
                    }
                }
            }
        }

        if state != ScenarioState::Halted {
            state = ScenarioState::Completed;
        }

        let report = ScenarioReport {
            run_id,
            scenario: name.to_string(),
            started_at,
            state,
            records,
            duration: start.elapsed(),
        };
        info!(
            scenario = name,
            run_id = %run_id,
            state = ?report.state,
            passed = report.passed_count(),
            failed = report.failed_count(),
            "scenario finished"
        );
        report
    }
}

fn require_str<'a>(data: &'a StepData, keyword: Keyword, field: &str) -> PilotarResult<&'a str> {
    data.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| PilotarError::MissingData {
            keyword: keyword.to_string(),
            field: field.to_string(),
        })
}

fn optional_str<'a>(data: &'a StepData, field: &str) -> Option<&'a str> {
    data.get(field).and_then(serde_json::Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSession;
    use crate::scenario::StepStatus;
    use std::time::Duration;

    fn engine(session: Arc<MockSession>) -> KeywordEngine<MockSession> {
        let config = HarnessConfig::default()
            .with_base_url("https://app.example.com")
            .with_element_timeout(Duration::from_millis(10))
            .with_poll_interval(Duration::from_millis(1));
        KeywordEngine::new(session, config)
    }

    fn login_steps() -> Vec<KeywordStep> {
        vec![
            KeywordStep::new(Keyword::OpenLoginPage).with_data("url", "/login"),
            KeywordStep::new(Keyword::FillUsername).with_data("value", "a@b.com"),
            KeywordStep::new(Keyword::FillPassword).with_data("value", "x"),
            KeywordStep::new(Keyword::ClickLogin),
            KeywordStep::new(Keyword::VerifyLoginSuccess).with_data("expected_text", "Welcome"),
        ]
    }

    mod execute_keyword_tests {
        use super::*;

        #[test]
        fn test_unknown_name_fails_regardless_of_payload() {
            let engine = engine(Arc::new(MockSession::with_login_flow("Welcome, a")));
            let mut data = StepData::new();
            let _ = data.insert("value".to_string(), serde_json::json!("anything"));
            let err = engine.execute_named("warp_drive", &data).unwrap_err();
            assert!(matches!(err, PilotarError::UnknownKeyword { .. }));
        }

        #[test]
        fn test_fill_username_requires_value() {
            let engine = engine(Arc::new(MockSession::with_login_flow("Welcome, a")));
            let err = engine
                .execute_keyword(Keyword::FillUsername, &StepData::new())
                .unwrap_err();
            match err {
                PilotarError::MissingData { keyword, field } => {
                    assert_eq!(keyword, "fill_username");
                    assert_eq!(field, "value");
                }
                other => panic!("expected MissingData, got {other:?}"),
            }
        }

        #[test]
        fn test_open_login_page_joins_base_url() {
            let session = Arc::new(MockSession::with_login_flow("Welcome, a"));
            let engine = engine(Arc::clone(&session));
            engine
                .execute_keyword(Keyword::OpenLoginPage, &StepData::new())
                .unwrap();
            assert_eq!(
                session.navigations(),
                vec!["https://app.example.com/login".to_string()]
            );
        }

        #[test]
        fn test_verify_dashboard_loaded_raises_before_login() {
            let engine = engine(Arc::new(MockSession::with_login_flow("Welcome, a")));
            let err = engine
                .execute_keyword(Keyword::VerifyDashboardLoaded, &StepData::new())
                .unwrap_err();
            assert!(err.is_assertion());
        }

        #[test]
        fn test_verify_login_success_checks_greeting() {
            let session = Arc::new(MockSession::with_login_flow("Welcome, a"));
            let engine = engine(Arc::clone(&session));
            engine.login_page().login("a@b.com", "x").unwrap();
            engine
                .execute_keyword(Keyword::VerifyLoginSuccess, &StepData::new())
                .unwrap();
        }

        #[test]
        fn test_verify_login_success_reports_actual_text() {
            let session = Arc::new(MockSession::with_login_flow("Hello"));
            let engine = engine(Arc::clone(&session));
            engine.login_page().login("a@b.com", "x").unwrap();
            let err = engine
                .execute_keyword(Keyword::VerifyLoginSuccess, &StepData::new())
                .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("Hello"));
        }
    }

    mod execute_scenario_tests {
        use super::*;

        #[test]
        fn test_happy_path_yields_five_passes() {
            let engine = engine(Arc::new(MockSession::with_login_flow("Welcome, a")));
            let scenario = Scenario::new("valid login", login_steps());
            let report = engine.execute_scenario(&scenario);

            assert_eq!(report.state, ScenarioState::Completed);
            assert_eq!(report.total(), 5);
            assert!(report.all_passed());
            assert_eq!(report.scenario, "valid login");
        }

        #[test]
        fn test_wrong_greeting_halts_after_four_passes() {
            let engine = engine(Arc::new(MockSession::with_login_flow("Hello")));
            let report = engine.execute_steps(&login_steps());

            assert_eq!(report.state, ScenarioState::Halted);
            assert_eq!(report.total(), 5);
            assert_eq!(report.passed_count(), 4);
            assert_eq!(report.failed_count(), 1);
            let last = report.records.last().unwrap();
            assert_eq!(last.status, StepStatus::Fail);
            assert_eq!(last.action, Keyword::VerifyLoginSuccess);
            assert!(last.error.as_deref().unwrap().contains("Assertion failed"));
        }

        #[test]
        fn test_halt_record_count_equals_failing_index() {
            // Failure at 1-based step 2: exactly two records, nothing after
            let session = Arc::new(MockSession::new());
            let engine = engine(Arc::clone(&session));
            let steps = vec![
                KeywordStep::new(Keyword::OpenLoginPage),
                KeywordStep::new(Keyword::FillUsername).with_data("value", "a@b.com"),
                KeywordStep::new(Keyword::ClickLogin),
            ];
            let report = engine.execute_steps(&steps);

            assert_eq!(report.state, ScenarioState::Halted);
            assert_eq!(report.total(), 2);
            assert_eq!(report.records[1].status, StepStatus::Fail);
            // the click step never ran
            assert!(session.clicks().is_empty());
        }

        #[test]
        fn test_continue_on_failure_runs_all_steps() {
            let session = Arc::new(MockSession::new());
            let engine = engine(Arc::clone(&session));
            let steps = vec![
                KeywordStep::new(Keyword::OpenLoginPage),
                KeywordStep::new(Keyword::FillUsername)
                    .with_data("value", "a@b.com")
                    .continue_on_failure(),
                KeywordStep::new(Keyword::VerifyDashboardLoaded).continue_on_failure(),
                KeywordStep::new(Keyword::OpenLoginPage),
            ];
            let report = engine.execute_steps(&steps);

            assert_eq!(report.state, ScenarioState::Completed);
            assert_eq!(report.total(), 4);
            assert_eq!(report.failed_count(), 2);
            assert_eq!(session.navigations().len(), 2);
        }

        #[test]
        fn test_report_structure_is_deterministic() {
            let run = || {
                let engine = engine(Arc::new(MockSession::with_login_flow("Hello")));
                let report = engine.execute_steps(&login_steps());
                (
                    report.state,
                    report
                        .records
                        .iter()
                        .map(|r| (r.action, r.status))
                        .collect::<Vec<_>>(),
                )
            };
            assert_eq!(run(), run());
        }

        #[test]
        fn test_empty_scenario_completes() {
            let engine = engine(Arc::new(MockSession::new()));
            let report = engine.execute_steps(&[]);
            assert_eq!(report.state, ScenarioState::Completed);
            assert_eq!(report.total(), 0);
            assert!(report.all_passed());
        }
    }
}
