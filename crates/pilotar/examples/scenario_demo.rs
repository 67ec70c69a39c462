//! Run the standard login scenario against the scripted session.
//!
//! ```bash
//! cargo run --example scenario_demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use pilotar::{telemetry, HarnessConfig, KeywordEngine, LogConfig, MockSession, Scenario};

fn main() -> pilotar::PilotarResult<()> {
    telemetry::init(&LogConfig::default())?;

    let session = Arc::new(MockSession::with_login_flow("Welcome, a"));
    let config = HarnessConfig::default()
        .with_base_url("https://app.example.com")
        .with_element_timeout(Duration::from_millis(50))
        .with_poll_interval(Duration::from_millis(5));
    let engine = KeywordEngine::new(session, config);

    let scenario = Scenario::from_yaml_str(
        r#"
name: valid login
steps:
  - action: open_login_page
    data: { url: /login }
  - action: fill_username
    data: { value: a@b.com }
  - action: fill_password
    data: { value: x }
  - action: click_login
  - action: verify_login_success
    data: { expected_text: Welcome }
  - action: verify_dashboard_loaded
  - action: click_logout
"#,
    )?;

    let report = engine.execute_scenario(&scenario);
    for record in &report.records {
        println!("{:<24} {:?}", record.action.to_string(), record.status);
    }
    println!(
        "state: {:?}, passed {}/{}",
        report.state,
        report.passed_count(),
        report.total()
    );
    Ok(())
}
