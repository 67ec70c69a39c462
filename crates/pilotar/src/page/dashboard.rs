//! Dashboard page object.

use super::{ElementMap, Interactor, Page};
use crate::locator::{LocatorChain, LocatorDescriptor};
use crate::result::PilotarResult;
use crate::session::PageSession;

/// The post-login dashboard: greeting, profile block, logout
#[derive(Debug, Clone)]
pub struct DashboardPage<S: PageSession> {
    interactor: Interactor<S>,
    elements: ElementMap,
}

impl<S: PageSession> DashboardPage<S> {
    /// Create the page over a shared interactor
    #[must_use]
    pub fn new(interactor: Interactor<S>) -> Self {
        let elements = ElementMap::new()
            .with(
                "welcome_message",
                LocatorChain::new(LocatorDescriptor::xpath(
                    "//h1[contains(text(), 'Welcome')]",
                ))
                .with_fallback(LocatorDescriptor::css(".welcome-message"))
                .with_fallback(LocatorDescriptor::class("user-greeting")),
            )
            .with(
                "logout_button",
                LocatorChain::new(LocatorDescriptor::id("logout"))
                    .with_fallback(LocatorDescriptor::css("button.logout-btn"))
                    .with_fallback(LocatorDescriptor::xpath("//a[contains(text(), 'Logout')]")),
            )
            .with(
                "user_profile",
                LocatorChain::new(LocatorDescriptor::id("user-profile"))
                    .with_fallback(LocatorDescriptor::css(".user-info"))
                    .with_fallback(LocatorDescriptor::class("profile-menu")),
            );
        Self {
            interactor,
            elements,
        }
    }

    /// The greeting text, if the dashboard shows one. Soft check: lookup
    /// failures report `None`.
    #[must_use]
    pub fn welcome_message(&self) -> Option<String> {
        let chain = self.elements.get("welcome_message").ok()?;
        self.interactor.read_text(chain).ok()
    }

    /// Click the logout control.
    ///
    /// # Errors
    ///
    /// Propagates lookup and interaction failures.
    pub fn click_logout(&self) -> PilotarResult<()> {
        self.interactor.click(self.elements.get("logout_button")?)
    }

    /// The profile block text, if present. Soft check.
    #[must_use]
    pub fn profile_info(&self) -> Option<String> {
        let chain = self.elements.get("user_profile").ok()?;
        self.interactor.read_text(chain).ok()
    }
}

impl<S: PageSession> Page for DashboardPage<S> {
    fn url_pattern(&self) -> &str {
        "/dashboard"
    }

    /// Soft check: the dashboard counts as loaded once the greeting is
    /// visible through any of its fallback locators.
    fn is_loaded(&self) -> bool {
        self.elements
            .get("welcome_message")
            .map(|chain| self.interactor.wait_visible(chain).is_ok())
            .unwrap_or(false)
    }

    fn page_name(&self) -> &str {
        "DashboardPage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::locator::ResolvedQuery;
    use crate::mock::{MockNode, MockSession};
    use std::sync::Arc;
    use std::time::Duration;

    fn dashboard(session: Arc<MockSession>) -> DashboardPage<MockSession> {
        let config = HarnessConfig::default()
            .with_element_timeout(Duration::from_millis(10))
            .with_poll_interval(Duration::from_millis(1));
        DashboardPage::new(Interactor::new(session, &config))
    }

    fn logged_in_session(welcome: &str) -> Arc<MockSession> {
        let session = Arc::new(MockSession::with_login_flow(welcome));
        let button = session
            .query(&ResolvedQuery::Css("[id='loginBtn']".to_string()))
            .unwrap()
            .unwrap();
        session.click(&button).unwrap();
        session
    }

    #[test]
    fn test_not_loaded_before_login() {
        let session = Arc::new(MockSession::with_login_flow("Welcome, a"));
        let page = dashboard(session);
        assert!(!page.is_loaded());
    }

    #[test]
    fn test_loaded_after_login() {
        let page = dashboard(logged_in_session("Welcome, a"));
        assert!(page.is_loaded());
        assert_eq!(page.url_pattern(), "/dashboard");
    }

    #[test]
    fn test_welcome_message_via_primary_locator() {
        let page = dashboard(logged_in_session("Welcome, a"));
        assert_eq!(page.welcome_message().as_deref(), Some("Welcome, a"));
    }

    #[test]
    fn test_welcome_message_via_fallback_locator() {
        // A greeting without "Welcome" only matches the CSS fallback
        let page = dashboard(logged_in_session("Hello"));
        assert_eq!(page.welcome_message().as_deref(), Some("Hello"));
    }

    #[test]
    fn test_welcome_message_is_soft_on_blank_session() {
        let page = dashboard(Arc::new(MockSession::new()));
        assert!(page.welcome_message().is_none());
    }

    #[test]
    fn test_click_logout() {
        let session = logged_in_session("Welcome, a");
        let page = dashboard(Arc::clone(&session));
        page.click_logout().unwrap();
        assert!(session
            .clicks()
            .contains(&"css:[id='logout']#0".to_string()));
    }

    #[test]
    fn test_profile_info_soft_miss_and_hit() {
        let session = logged_in_session("Welcome, a");
        let page = dashboard(Arc::clone(&session));
        assert!(page.profile_info().is_none());

        session.stage(
            &ResolvedQuery::Css("[id='user-profile']".to_string()),
            MockNode::new("div").with_text("a@b.com"),
        );
        assert_eq!(page.profile_info().as_deref(), Some("a@b.com"));
    }
}
