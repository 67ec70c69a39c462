//! The browser session seam.
//!
//! [`PageSession`] is the abstract surface the harness drives. The finder,
//! the page objects, and the keyword engine only ever talk to this trait, so
//! the browser backend can be swapped: the `browser` feature provides a CDP
//! implementation, and [`crate::mock::MockSession`] provides a scripted
//! in-memory page for deterministic tests.
//!
//! The trait is synchronous and blocking throughout. A backend built on an
//! async protocol hides its runtime behind these methods.

use serde::{Deserialize, Serialize};

use crate::locator::ResolvedQuery;
use crate::result::PilotarResult;

/// Handle to an element located in a session.
///
/// Handles are issued by the session and passed back into it for
/// interactions. `tag_name` and `text_content` are a snapshot taken at
/// lookup time; [`PageSession::text`] re-reads the live value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Session-scoped identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Text content at lookup time
    pub text_content: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: None,
        }
    }

    /// Attach the text content snapshot
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }
}

/// A live browser page the harness can drive.
///
/// One session corresponds to one browser page; its lifecycle (launch,
/// configuration, teardown) belongs to the driver layer, not to the
/// consumers of this trait.
pub trait PageSession {
    /// Navigate the page to a URL.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Navigation`] if the load fails.
    fn navigate(&self, url: &str) -> PilotarResult<()>;

    /// The page's current URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is gone.
    fn current_url(&self) -> PilotarResult<String>;

    /// Look up the first element matching a resolved query.
    ///
    /// Returns `Ok(None)` when nothing matches; polling and timeouts are the
    /// finder's job, a single probe must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the query itself cannot be executed.
    fn query(&self, query: &ResolvedQuery) -> PilotarResult<Option<ElementHandle>>;

    /// Look up all elements matching a resolved query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query itself cannot be executed.
    fn query_all(&self, query: &ResolvedQuery) -> PilotarResult<Vec<ElementHandle>>;

    /// Click an element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Interaction`] if the element cannot be
    /// clicked.
    fn click(&self, element: &ElementHandle) -> PilotarResult<()>;

    /// Clear an element and type text into it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Interaction`] on failure.
    fn fill(&self, element: &ElementHandle, text: &str) -> PilotarResult<()>;

    /// Read an element's live text content.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Interaction`] if the element is gone.
    fn text(&self, element: &ElementHandle) -> PilotarResult<String>;

    /// Whether the element is currently visible.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Interaction`] if the element is gone.
    fn is_visible(&self, element: &ElementHandle) -> PilotarResult<bool>;

    /// Scroll the element into the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Interaction`] on failure.
    fn scroll_into_view(&self, element: &ElementHandle) -> PilotarResult<()>;

    /// Run a script in the page and return its JSON result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PilotarError::Script`] if evaluation fails.
    fn run_script(&self, script: &str) -> PilotarResult<serde_json::Value>;

    /// Capture a PNG screenshot of the page.
    ///
    /// # Errors
    ///
    /// Returns an error if capture fails.
    fn screenshot(&self) -> PilotarResult<Vec<u8>>;
}
