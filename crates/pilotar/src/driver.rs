//! CDP-backed driver manager (`browser` feature).
//!
//! [`DriverManager`] owns browser lifecycle: it launches a chromium instance
//! per [`HarnessConfig`] and hands out a [`CdpSession`] implementing
//! [`PageSession`]. The session owns a private tokio runtime and blocks on
//! every CDP call, preserving the crate's synchronous surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::locator::ResolvedQuery;
use crate::result::{PilotarError, PilotarResult};
use crate::session::{ElementHandle, PageSession};

/// Launches and tears down browser sessions
#[derive(Debug, Clone)]
pub struct DriverManager {
    config: HarnessConfig,
}

impl DriverManager {
    /// Create a manager over a configuration
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Launch a browser and open a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::BrowserLaunch`] if the runtime or the browser
    /// cannot be started.
    pub fn launch(&self) -> PilotarResult<CdpSession> {
        let runtime = Runtime::new().map_err(|e| PilotarError::BrowserLaunch {
            message: format!("failed to start runtime: {e}"),
        })?;

        let settings = &self.config.browser;
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.binary_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(|e| PilotarError::BrowserLaunch {
            message: e.to_string(),
        })?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(cdp_config))
            .map_err(|e| PilotarError::BrowserLaunch {
                message: e.to_string(),
            })?;

        // Drive CDP events for the lifetime of the session
        let _handle = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| PilotarError::BrowserLaunch {
                message: e.to_string(),
            })?;

        info!(browser = %settings.name, headless = settings.headless, "browser launched");
        Ok(CdpSession {
            runtime,
            browser: Mutex::new(Some(browser)),
            page,
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }
}

/// A live CDP page behind the synchronous [`PageSession`] surface
#[derive(Debug)]
pub struct CdpSession {
    runtime: Runtime,
    browser: Mutex<Option<Browser>>,
    page: Page,
    elements: Mutex<HashMap<String, Element>>,
    next_id: AtomicU64,
}

impl CdpSession {
    /// Close the browser. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::BrowserLaunch`] if shutdown fails.
    pub fn close(&self) -> PilotarResult<()> {
        let Some(mut browser) = self.browser.lock().unwrap().take() else {
            return Ok(());
        };
        self.runtime
            .block_on(browser.close())
            .map_err(|e| PilotarError::BrowserLaunch {
                message: format!("failed to close browser: {e}"),
            })?;
        info!("browser closed");
        Ok(())
    }

    fn register(&self, element: Element) -> String {
        let id = format!("el-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let _ = self.elements.lock().unwrap().insert(id.clone(), element);
        id
    }

    fn with_element<T>(
        &self,
        id: &str,
        f: impl FnOnce(&Element) -> PilotarResult<T>,
    ) -> PilotarResult<T> {
        let elements = self.elements.lock().unwrap();
        let element = elements.get(id).ok_or_else(|| PilotarError::Interaction {
            message: format!("stale element: {id}"),
        })?;
        f(element)
    }

    fn handle_for(&self, element: Element) -> ElementHandle {
        let tag_name = self
            .runtime
            .block_on(async {
                element
                    .call_js_fn("function() { return this.tagName.toLowerCase(); }", false)
                    .await
            })
            .ok()
            .and_then(|ret| ret.result.value)
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        let text = self
            .runtime
            .block_on(element.inner_text())
            .ok()
            .flatten();

        let id = self.register(element);
        let mut handle = ElementHandle::new(id, tag_name);
        if let Some(text) = text {
            handle = handle.with_text(text);
        }
        handle
    }

    async fn find_one(page: &Page, query: &ResolvedQuery) -> Option<Element> {
        // A miss is reported as an error by the CDP layer; the finder owns
        // retry policy, so any lookup failure counts as "absent" here.
        match query {
            ResolvedQuery::Css(selector) => page.find_element(selector.as_str()).await.ok(),
            ResolvedQuery::XPath(expression) => page.find_xpath(expression.as_str()).await.ok(),
        }
    }

    async fn find_many(page: &Page, query: &ResolvedQuery) -> Vec<Element> {
        match query {
            ResolvedQuery::Css(selector) => {
                page.find_elements(selector.as_str()).await.unwrap_or_default()
            }
            ResolvedQuery::XPath(expression) => {
                page.find_xpaths(expression.as_str()).await.unwrap_or_default()
            }
        }
    }
}

impl PageSession for CdpSession {
    fn navigate(&self, url: &str) -> PilotarResult<()> {
        self.runtime
            .block_on(async {
                self.page.goto(url).await?;
                self.page.wait_for_navigation().await?;
                Ok::<(), chromiumoxide::error::CdpError>(())
            })
            .map_err(|e| PilotarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn current_url(&self) -> PilotarResult<String> {
        self.runtime
            .block_on(self.page.url())
            .map_err(|e| PilotarError::Interaction {
                message: format!("failed to read url: {e}"),
            })
            .map(|url| url.unwrap_or_else(|| "about:blank".to_string()))
    }

    fn query(&self, query: &ResolvedQuery) -> PilotarResult<Option<ElementHandle>> {
        let found = self.runtime.block_on(Self::find_one(&self.page, query));
        match found {
            Some(element) => {
                debug!(query = %query, "probe hit");
                Ok(Some(self.handle_for(element)))
            }
            None => Ok(None),
        }
    }

    fn query_all(&self, query: &ResolvedQuery) -> PilotarResult<Vec<ElementHandle>> {
        let found = self.runtime.block_on(Self::find_many(&self.page, query));
        Ok(found.into_iter().map(|e| self.handle_for(e)).collect())
    }

    fn click(&self, element: &ElementHandle) -> PilotarResult<()> {
        self.with_element(&element.id, |target| {
            self.runtime
                .block_on(async {
                    target.click().await?;
                    Ok::<(), chromiumoxide::error::CdpError>(())
                })
                .map_err(|e| PilotarError::Interaction {
                    message: format!("click failed: {e}"),
                })
        })
    }

    fn fill(&self, element: &ElementHandle, text: &str) -> PilotarResult<()> {
        self.with_element(&element.id, |target| {
            self.runtime
                .block_on(async {
                    target
                        .call_js_fn("function() { this.value = ''; }", false)
                        .await?;
                    target.click().await?;
                    target.type_str(text).await?;
                    Ok::<(), chromiumoxide::error::CdpError>(())
                })
                .map_err(|e| PilotarError::Interaction {
                    message: format!("fill failed: {e}"),
                })
        })
    }

    fn text(&self, element: &ElementHandle) -> PilotarResult<String> {
        self.with_element(&element.id, |target| {
            self.runtime
                .block_on(target.inner_text())
                .map_err(|e| PilotarError::Interaction {
                    message: format!("text read failed: {e}"),
                })
                .map(Option::unwrap_or_default)
        })
    }

    fn is_visible(&self, element: &ElementHandle) -> PilotarResult<bool> {
        let script = "function() { \
            const rect = this.getBoundingClientRect(); \
            const style = window.getComputedStyle(this); \
            return rect.width > 0 && rect.height > 0 && \
                style.visibility !== 'hidden' && style.display !== 'none'; \
        }";
        self.with_element(&element.id, |target| {
            let result = self
                .runtime
                .block_on(target.call_js_fn(script, false))
                .map_err(|e| PilotarError::Interaction {
                    message: format!("visibility check failed: {e}"),
                })?;
            Ok(result
                .result
                .value
                .and_then(|value| value.as_bool())
                .unwrap_or(false))
        })
    }

    fn scroll_into_view(&self, element: &ElementHandle) -> PilotarResult<()> {
        self.with_element(&element.id, |target| {
            self.runtime
                .block_on(async {
                    target.scroll_into_view().await?;
                    Ok::<(), chromiumoxide::error::CdpError>(())
                })
                .map_err(|e| PilotarError::Interaction {
                    message: format!("scroll failed: {e}"),
                })
        })
    }

    fn run_script(&self, script: &str) -> PilotarResult<serde_json::Value> {
        let evaluation = self
            .runtime
            .block_on(self.page.evaluate(script))
            .map_err(|e| PilotarError::Script {
                message: e.to_string(),
            })?;
        evaluation
            .into_value()
            .map_err(|e| PilotarError::Script {
                message: e.to_string(),
            })
    }

    fn screenshot(&self) -> PilotarResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .runtime
            .block_on(self.page.execute(params))
            .map_err(|e| PilotarError::Interaction {
                message: format!("screenshot failed: {e}"),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| PilotarError::Interaction {
                message: format!("screenshot decode failed: {e}"),
            })
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
