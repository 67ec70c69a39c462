//! Login page object.

use tracing::info;

use super::{ElementMap, Interactor, Page};
use crate::locator::{LocatorChain, LocatorDescriptor};
use crate::result::PilotarResult;
use crate::session::PageSession;

/// URL fragments that indicate the login succeeded and the app moved on
const SUCCESS_PATHS: [&str; 3] = ["/dashboard", "/home", "/profile"];

/// The login form: username, password, submit, and the error banner
#[derive(Debug, Clone)]
pub struct LoginPage<S: PageSession> {
    interactor: Interactor<S>,
    elements: ElementMap,
}

impl<S: PageSession> LoginPage<S> {
    /// Create the page over a shared interactor
    #[must_use]
    pub fn new(interactor: Interactor<S>) -> Self {
        let elements = ElementMap::new()
            .with(
                "username_input",
                LocatorChain::new(LocatorDescriptor::id("username"))
                    .with_fallback(LocatorDescriptor::name("email"))
                    .with_fallback(LocatorDescriptor::css("input[type='email']")),
            )
            .with(
                "password_input",
                LocatorChain::new(LocatorDescriptor::id("password"))
                    .with_fallback(LocatorDescriptor::name("password"))
                    .with_fallback(LocatorDescriptor::css("input[type='password']")),
            )
            .with(
                "login_button",
                LocatorChain::new(LocatorDescriptor::id("loginBtn"))
                    .with_fallback(LocatorDescriptor::xpath(
                        "//button[contains(text(), 'Login')]",
                    ))
                    .with_fallback(LocatorDescriptor::css("button.login-button")),
            )
            .with(
                "error_message",
                LocatorChain::new(LocatorDescriptor::class("error-message"))
                    .with_fallback(LocatorDescriptor::xpath("//div[@class='alert alert-danger']")),
            );
        Self {
            interactor,
            elements,
        }
    }

    /// Open the login page at the given (already joined) URL.
    ///
    /// # Errors
    ///
    /// Propagates navigation failures.
    pub fn open(&self, url: &str) -> PilotarResult<()> {
        info!(url, "opening login page");
        self.interactor.navigate(url)
    }

    /// Clear the username field and type the username.
    ///
    /// # Errors
    ///
    /// Propagates lookup and interaction failures.
    pub fn enter_username(&self, username: &str) -> PilotarResult<()> {
        self.interactor
            .input_text(self.elements.get("username_input")?, username)
    }

    /// Clear the password field and type the password.
    ///
    /// # Errors
    ///
    /// Propagates lookup and interaction failures.
    pub fn enter_password(&self, password: &str) -> PilotarResult<()> {
        self.interactor
            .input_text(self.elements.get("password_input")?, password)
    }

    /// Click the login button.
    ///
    /// # Errors
    ///
    /// Propagates lookup and interaction failures.
    pub fn click_login_button(&self) -> PilotarResult<()> {
        self.interactor.click(self.elements.get("login_button")?)
    }

    /// Full login flow: username, password, submit.
    ///
    /// # Errors
    ///
    /// Propagates the first failing step.
    pub fn login(&self, username: &str, password: &str) -> PilotarResult<()> {
        self.enter_username(username)?;
        self.enter_password(password)?;
        self.click_login_button()
    }

    /// The error banner text, if one is shown. Soft check: lookup failures
    /// report `None`.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        let chain = self.elements.get("error_message").ok()?;
        self.interactor.read_text(chain).ok()
    }

    /// Whether the URL moved to a post-login page
    #[must_use]
    pub fn is_login_successful(&self) -> bool {
        self.interactor
            .current_url()
            .map(|url| SUCCESS_PATHS.iter().any(|path| url.contains(path)))
            .unwrap_or(false)
    }
}

impl<S: PageSession> Page for LoginPage<S> {
    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn is_loaded(&self) -> bool {
        self.elements
            .get("username_input")
            .map(|chain| self.interactor.wait_visible(chain).is_ok())
            .unwrap_or(false)
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}
