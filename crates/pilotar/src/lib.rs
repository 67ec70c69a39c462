//! Pilotar: keyword-driven browser automation harness.
//!
//! Pilotar (Spanish: "to pilot") drives a web browser through a
//! login/dashboard workflow using three layers: declarative scenario steps
//! dispatched by a keyword engine, page objects that own fallback locator
//! chains, and a finder that polls each locator strategy in order until one
//! matches.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     PILOTAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────────┐  │
//! │  │ Scenario │──►│ Keyword  │──►│ Page     │──►│ Finder +     │  │
//! │  │ (YAML)   │   │ Engine   │   │ Objects  │   │ Resolver     │  │
//! │  └──────────┘   └──────────┘   └──────────┘   └──────┬───────┘  │
//! │                                                      ▼          │
//! │                                          ┌──────────────────┐   │
//! │                                          │ PageSession      │   │
//! │                                          │ (CDP or mock)    │   │
//! │                                          └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Execution is single-threaded, synchronous, and blocking: element lookup
//! blocks the calling thread for up to its timeout via bounded polling, and
//! scenario steps run strictly in order.
//!
//! # Example
//!
//! ```
//! use pilotar::{HarnessConfig, KeywordEngine, MockSession, Scenario};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let session = Arc::new(MockSession::with_login_flow("Welcome, a"));
//! let config = HarnessConfig::default()
//!     .with_base_url("https://app.example.com")
//!     .with_element_timeout(Duration::from_millis(20))
//!     .with_poll_interval(Duration::from_millis(1));
//! let engine = KeywordEngine::new(session, config);
//!
//! let scenario = Scenario::from_yaml_str(
//!     r#"
//! name: valid login
//! steps:
//!   - action: open_login_page
//!     data: { url: /login }
//!   - action: fill_username
//!     data: { value: a@b.com }
//!   - action: fill_password
//!     data: { value: x }
//!   - action: click_login
//!   - action: verify_login_success
//!     data: { expected_text: Welcome }
//! "#,
//! )
//! .unwrap();
//!
//! let report = engine.execute_scenario(&scenario);
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod config;
mod data;
mod engine;
mod finder;
mod keyword;
mod locator;
mod result;
mod scenario;
mod session;

/// Page objects for the login/dashboard workflow
pub mod page;

/// Scripted in-memory session for deterministic tests
pub mod mock;

/// Explicit logging initialization
pub mod telemetry;

/// CDP-backed driver manager (requires the `browser` feature)
#[cfg(feature = "browser")]
pub mod driver;

pub use config::{BrowserSettings, HarnessConfig, TimeoutSettings};
pub use data::{CredentialRecord, DataProvider, StaticDataProvider, YamlDataProvider};
pub use engine::KeywordEngine;
pub use finder::ElementFinder;
pub use keyword::{Keyword, StepData};
pub use locator::{
    LocatorChain, LocatorDescriptor, ResolvedQuery, Strategy, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use mock::MockSession;
pub use page::{DashboardPage, ElementMap, Interactor, LoginPage, Page};
pub use result::{PilotarError, PilotarResult};
pub use scenario::{
    KeywordStep, Scenario, ScenarioReport, ScenarioState, StepRecord, StepStatus,
};
pub use session::{ElementHandle, PageSession};
pub use telemetry::LogConfig;

#[cfg(feature = "browser")]
pub use driver::{CdpSession, DriverManager};
