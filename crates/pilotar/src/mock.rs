//! Scripted in-memory page session for deterministic tests.
//!
//! [`MockSession`] implements [`PageSession`] against a scripted page model
//! instead of a browser: elements are staged under the resolved query that
//! would find them, optionally appearing only after a number of probes (to
//! exercise polling), and clicks can mutate the page (to script a login
//! transition). Every interaction is journaled so tests can assert on what
//! the harness actually did.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::locator::ResolvedQuery;
use crate::result::{PilotarError, PilotarResult};
use crate::session::{ElementHandle, PageSession};

/// A scripted element in the mock page
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Tag name reported on the handle
    pub tag_name: String,
    /// Text content returned by reads
    pub text: String,
    /// Whether the element reports as visible
    pub visible: bool,
    /// Number of probes that return "absent" before the element appears
    pub appears_after: u32,
}

impl MockNode {
    /// Create a visible, immediately-present node with no text
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            text: String::new(),
            visible: true,
            appears_after: 0,
        }
    }

    /// Set the node's text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Make the node present but not visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Make the node appear only after `polls` probes have missed it
    #[must_use]
    pub const fn appears_after(mut self, polls: u32) -> Self {
        self.appears_after = polls;
        self
    }
}

/// A scripted page mutation applied when an element is clicked
#[derive(Debug, Clone)]
pub enum PageChange {
    /// Replace the current URL
    SetUrl(String),
    /// Stage a node under a resolved query
    AddNode {
        /// Resolved query the node is staged under
        query: ResolvedQuery,
        /// The node itself
        node: MockNode,
    },
    /// Remove every node staged under a resolved query
    RemoveNode {
        /// Resolved query to clear
        query: ResolvedQuery,
    },
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    nodes: HashMap<String, Vec<MockNode>>,
    probes: HashMap<String, u32>,
    query_log: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    scrolls: Vec<String>,
    scripts: Vec<String>,
    navigations: Vec<String>,
    on_click: HashMap<String, Vec<PageChange>>,
    script_result: serde_json::Value,
}

impl MockState {
    fn apply(&mut self, change: &PageChange) {
        match change {
            PageChange::SetUrl(url) => self.url.clone_from(url),
            PageChange::AddNode { query, node } => {
                self.nodes
                    .entry(query.to_string())
                    .or_default()
                    .push(node.clone());
            }
            PageChange::RemoveNode { query } => {
                let _ = self.nodes.remove(&query.to_string());
            }
        }
    }

    fn node_for_handle(&self, id: &str) -> PilotarResult<&MockNode> {
        let (key, index) = decode_handle_id(id)?;
        self.nodes
            .get(key)
            .and_then(|nodes| nodes.get(index))
            .ok_or_else(|| PilotarError::Interaction {
                message: format!("stale element: {id}"),
            })
    }
}

fn decode_handle_id(id: &str) -> PilotarResult<(&str, usize)> {
    let (key, index) = id.rsplit_once('#').ok_or_else(|| PilotarError::Interaction {
        message: format!("malformed element id: {id}"),
    })?;
    let index = index.parse().map_err(|_| PilotarError::Interaction {
        message: format!("malformed element id: {id}"),
    })?;
    Ok((key, index))
}

/// In-memory [`PageSession`] driven by a scripted page model
#[derive(Debug, Default)]
pub struct MockSession {
    state: Mutex<MockState>,
}

impl MockSession {
    /// Create an empty mock page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock page scripted with the standard login flow.
    ///
    /// The login form (username, password, login button) is present from the
    /// start. Clicking the login button moves the URL to the dashboard,
    /// stages the logout button, and renders `welcome_text` as the greeting.
    /// Greetings containing `Welcome` land under the heading XPath used as
    /// the primary dashboard locator; anything else only matches the
    /// `.welcome-message` CSS fallback, the way a text-matching XPath would
    /// miss it in a real DOM.
    #[must_use]
    pub fn with_login_flow(welcome_text: impl Into<String>) -> Self {
        let welcome_text = welcome_text.into();
        let session = Self::new();
        session.stage(
            &ResolvedQuery::Css("[id='username']".to_string()),
            MockNode::new("input"),
        );
        session.stage(
            &ResolvedQuery::Css("[id='password']".to_string()),
            MockNode::new("input"),
        );
        let login_button = ResolvedQuery::Css("[id='loginBtn']".to_string());
        session.stage(&login_button, MockNode::new("button"));

        let welcome_query = if welcome_text.contains("Welcome") {
            ResolvedQuery::XPath("//h1[contains(text(), 'Welcome')]".to_string())
        } else {
            ResolvedQuery::Css(".welcome-message".to_string())
        };
        session.on_click(
            &login_button,
            vec![
                PageChange::SetUrl("https://app.example.com/dashboard".to_string()),
                PageChange::AddNode {
                    query: welcome_query,
                    node: MockNode::new("h1").with_text(welcome_text),
                },
                PageChange::AddNode {
                    query: ResolvedQuery::Css("[id='logout']".to_string()),
                    node: MockNode::new("button"),
                },
            ],
        );
        session.set_url("https://app.example.com/login");
        session
    }

    /// Stage a node under the query that finds it
    pub fn stage(&self, query: &ResolvedQuery, node: MockNode) {
        let mut state = self.state.lock().unwrap();
        state.nodes.entry(query.to_string()).or_default().push(node);
    }

    /// Stage several nodes under one query (for `query_all`)
    pub fn stage_list(&self, query: &ResolvedQuery, nodes: Vec<MockNode>) {
        let mut state = self.state.lock().unwrap();
        state.nodes.entry(query.to_string()).or_default().extend(nodes);
    }

    /// Script page mutations applied when the element under `query` is clicked
    pub fn on_click(&self, query: &ResolvedQuery, changes: Vec<PageChange>) {
        let mut state = self.state.lock().unwrap();
        let _ = state.on_click.insert(query.to_string(), changes);
    }

    /// Set the value every `run_script` call returns
    pub fn set_script_result(&self, value: serde_json::Value) {
        self.state.lock().unwrap().script_result = value;
    }

    /// Set the current URL without journaling a navigation
    pub fn set_url(&self, url: impl Into<String>) {
        self.state.lock().unwrap().url = url.into();
    }

    /// Number of probes issued for a query so far
    #[must_use]
    pub fn probe_count(&self, query: &ResolvedQuery) -> u32 {
        self.state
            .lock()
            .unwrap()
            .probes
            .get(&query.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Every query probed, in order
    #[must_use]
    pub fn query_log(&self) -> Vec<String> {
        self.state.lock().unwrap().query_log.clone()
    }

    /// Element ids clicked, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    /// `(element id, text)` pairs filled, in order
    #[must_use]
    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    /// Element ids scrolled into view, in order
    #[must_use]
    pub fn scrolls(&self) -> Vec<String> {
        self.state.lock().unwrap().scrolls.clone()
    }

    /// Scripts evaluated, in order
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    /// URLs navigated to, in order
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }
}

impl PageSession for MockSession {
    fn navigate(&self, url: &str) -> PilotarResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> PilotarResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    fn query(&self, query: &ResolvedQuery) -> PilotarResult<Option<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let key = query.to_string();
        state.query_log.push(key.clone());
        let seen = state.probes.entry(key.clone()).or_insert(0);
        *seen += 1;
        let seen = *seen;

        let Some(node) = state.nodes.get(&key).and_then(|nodes| nodes.first()) else {
            return Ok(None);
        };
        if seen <= node.appears_after {
            return Ok(None);
        }
        Ok(Some(
            ElementHandle::new(format!("{key}#0"), &node.tag_name).with_text(&node.text),
        ))
    }

    fn query_all(&self, query: &ResolvedQuery) -> PilotarResult<Vec<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let key = query.to_string();
        state.query_log.push(key.clone());
        let seen = state.probes.entry(key.clone()).or_insert(0);
        *seen += 1;
        let seen = *seen;

        let Some(nodes) = state.nodes.get(&key) else {
            return Ok(Vec::new());
        };
        Ok(nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| seen > node.appears_after)
            .map(|(i, node)| {
                ElementHandle::new(format!("{key}#{i}"), &node.tag_name).with_text(&node.text)
            })
            .collect())
    }

    fn click(&self, element: &ElementHandle) -> PilotarResult<()> {
        let mut state = self.state.lock().unwrap();
        let _ = state.node_for_handle(&element.id)?;
        state.clicks.push(element.id.clone());
        let (key, _) = decode_handle_id(&element.id)?;
        if let Some(changes) = state.on_click.get(key).cloned() {
            for change in &changes {
                state.apply(change);
            }
        }
        Ok(())
    }

    fn fill(&self, element: &ElementHandle, text: &str) -> PilotarResult<()> {
        let mut state = self.state.lock().unwrap();
        let _ = state.node_for_handle(&element.id)?;
        state.fills.push((element.id.clone(), text.to_string()));
        Ok(())
    }

    fn text(&self, element: &ElementHandle) -> PilotarResult<String> {
        let state = self.state.lock().unwrap();
        Ok(state.node_for_handle(&element.id)?.text.clone())
    }

    fn is_visible(&self, element: &ElementHandle) -> PilotarResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.node_for_handle(&element.id)?.visible)
    }

    fn scroll_into_view(&self, element: &ElementHandle) -> PilotarResult<()> {
        let mut state = self.state.lock().unwrap();
        let _ = state.node_for_handle(&element.id)?;
        state.scrolls.push(element.id.clone());
        Ok(())
    }

    fn run_script(&self, script: &str) -> PilotarResult<serde_json::Value> {
        let mut state = self.state.lock().unwrap();
        state.scripts.push(script.to_string());
        Ok(state.script_result.clone())
    }

    fn screenshot(&self) -> PilotarResult<Vec<u8>> {
        // PNG magic prefix stands in for real image data
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }
}
