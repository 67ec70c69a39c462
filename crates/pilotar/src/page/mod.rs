//! Page objects for the login/dashboard workflow.
//!
//! Pages are plain structs composed around a shared [`Interactor`]: the
//! finder plus the session handle plus the configured timeout budget. Each
//! page owns a fixed [`ElementMap`] from semantic element names to fallback
//! locator chains, declared at construction and never mutated.
//!
//! Action verbs (click, type, open) propagate failures. Verification reads
//! (`error_message`, `welcome_message`, `is_loaded`) are soft checks: they
//! swallow lookup failures and report `None`/`false` instead.

mod dashboard;
mod login;

pub use dashboard::DashboardPage;
pub use login::LoginPage;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::finder::ElementFinder;
use crate::locator::{LocatorChain, LocatorDescriptor};
use crate::result::{PilotarError, PilotarResult};
use crate::session::{ElementHandle, PageSession};

/// A page or component in the UI
pub trait Page {
    /// URL path pattern that identifies this page (e.g. `/login`)
    fn url_pattern(&self) -> &str;

    /// Whether the page is loaded and ready for interaction (soft check)
    fn is_loaded(&self) -> bool;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Fixed mapping from semantic element names to locator chains
#[derive(Debug, Clone, Default)]
pub struct ElementMap {
    chains: HashMap<String, LocatorChain>,
}

impl ElementMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain under a semantic name
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, chain: LocatorChain) -> Self {
        let _ = self.chains.insert(name.into(), chain);
        self
    }

    /// Look up a chain by name.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::Config`] for an unregistered name; element
    /// names are fixed at construction, so this is a harness bug.
    pub fn get(&self, name: &str) -> PilotarResult<&LocatorChain> {
        self.chains.get(name).ok_or_else(|| PilotarError::Config {
            message: format!("no element named '{name}' is declared on this page"),
        })
    }

    /// All registered element names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    /// Number of registered elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Shared finder/interaction capability injected into every page object.
///
/// Bundles the session handle, the fallback finder, and the configured
/// timeout budget so pages stay declarative: an element chain plus a verb.
#[derive(Debug)]
pub struct Interactor<S: PageSession> {
    session: Arc<S>,
    finder: ElementFinder,
    timeout: Duration,
    screenshot_dir: PathBuf,
}

impl<S: PageSession> Clone for Interactor<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            finder: self.finder.clone(),
            timeout: self.timeout,
            screenshot_dir: self.screenshot_dir.clone(),
        }
    }
}

impl<S: PageSession> Interactor<S> {
    /// Create an interactor over a session, budgeted by the configuration
    #[must_use]
    pub fn new(session: Arc<S>, config: &HarnessConfig) -> Self {
        Self {
            session,
            finder: ElementFinder::new().with_poll_interval(config.timeouts.poll_interval()),
            timeout: config.timeouts.element_timeout(),
            screenshot_dir: config.screenshot_dir.clone(),
        }
    }

    /// The underlying session handle
    #[must_use]
    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Per-strategy timeout budget
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Navigate the session to a URL.
    ///
    /// # Errors
    ///
    /// Propagates navigation failures.
    pub fn navigate(&self, url: &str) -> PilotarResult<()> {
        info!(url, "navigating");
        self.session.navigate(url)
    }

    /// The session's current URL.
    ///
    /// # Errors
    ///
    /// Propagates session failures.
    pub fn current_url(&self) -> PilotarResult<String> {
        self.session.current_url()
    }

    /// Find an element through its fallback chain.
    ///
    /// # Errors
    ///
    /// Propagates finder failures.
    pub fn find_element(&self, chain: &LocatorChain) -> PilotarResult<ElementHandle> {
        self.finder.find_element(self.session.as_ref(), chain, self.timeout)
    }

    /// Find all elements matching a single descriptor.
    ///
    /// # Errors
    ///
    /// Propagates finder failures.
    pub fn find_all(&self, descriptor: &LocatorDescriptor) -> PilotarResult<Vec<ElementHandle>> {
        self.finder.find_all(self.session.as_ref(), descriptor, self.timeout)
    }

    /// Wait for an element of the chain to be visible.
    ///
    /// # Errors
    ///
    /// Propagates finder failures.
    pub fn wait_visible(&self, chain: &LocatorChain) -> PilotarResult<ElementHandle> {
        self.finder.wait_visible(self.session.as_ref(), chain, self.timeout)
    }

    /// Wait for the element to be visible, then click it.
    ///
    /// # Errors
    ///
    /// Propagates finder and interaction failures.
    pub fn click(&self, chain: &LocatorChain) -> PilotarResult<()> {
        let element = self.wait_visible(chain)?;
        self.session.click(&element)?;
        debug!(element = %element.id, "clicked");
        Ok(())
    }

    /// Find the element, clear it, and type `text` into it.
    ///
    /// # Errors
    ///
    /// Propagates finder and interaction failures.
    pub fn input_text(&self, chain: &LocatorChain, text: &str) -> PilotarResult<()> {
        let element = self.find_element(chain)?;
        self.session.fill(&element, text)?;
        debug!(element = %element.id, chars = text.len(), "text entered");
        Ok(())
    }

    /// Find the element and read its live text.
    ///
    /// # Errors
    ///
    /// Propagates finder and interaction failures.
    pub fn read_text(&self, chain: &LocatorChain) -> PilotarResult<String> {
        let element = self.find_element(chain)?;
        self.session.text(&element)
    }

    /// Find the element and scroll it into the viewport.
    ///
    /// # Errors
    ///
    /// Propagates finder and interaction failures.
    pub fn scroll_to(&self, chain: &LocatorChain) -> PilotarResult<()> {
        let element = self.find_element(chain)?;
        self.session.scroll_into_view(&element)
    }

    /// Run a script in the page.
    ///
    /// # Errors
    ///
    /// Propagates script failures.
    pub fn run_script(&self, script: &str) -> PilotarResult<serde_json::Value> {
        self.session.run_script(script)
    }

    /// Capture a screenshot and write it under the configured directory.
    ///
    /// Returns the written path.
    ///
    /// # Errors
    ///
    /// Propagates capture and filesystem failures.
    pub fn screenshot(&self, name: &str) -> PilotarResult<PathBuf> {
        let data = self.session.screenshot()?;
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(format!("{name}.png"));
        std::fs::write(&path, data)?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}
