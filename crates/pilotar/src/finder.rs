//! Multi-strategy element finder.
//!
//! Walks a [`LocatorChain`] in declared order, polling the session for each
//! descriptor until it matches or its timeout lapses. The timeout budget is
//! per descriptor, so the worst-case wait is the sum over the chain, not a
//! shared budget. Strategies are probed strictly sequentially; there is no
//! parallel probing and no cancellation beyond the timeout itself.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::locator::{LocatorChain, LocatorDescriptor, ResolvedQuery, DEFAULT_POLL_INTERVAL_MS};
use crate::result::{PilotarError, PilotarResult};
use crate::session::{ElementHandle, PageSession};

/// Finds elements through fallback chains with bounded polling
#[derive(Debug, Clone)]
pub struct ElementFinder {
    poll_interval: Duration,
}

impl Default for ElementFinder {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ElementFinder {
    /// Create a finder with the default polling interval
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interval between presence probes
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Find the first element matching any descriptor in the chain.
    ///
    /// Descriptors are tried in order; each is polled for up to `timeout`.
    /// The first hit wins and no later descriptors are tried.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::InvalidLocator`] if a descriptor cannot be
    /// resolved (configuration bug, surfaced immediately), or
    /// [`PilotarError::ElementNotFound`] carrying the whole chain once every
    /// descriptor has timed out. Session-level probe failures propagate as-is.
    pub fn find_element<S: PageSession>(
        &self,
        session: &S,
        chain: &LocatorChain,
        timeout: Duration,
    ) -> PilotarResult<ElementHandle> {
        let total = chain.len();
        let timeout_ms = timeout.as_millis() as u64;
        for (index, descriptor) in chain.iter().enumerate() {
            let query = descriptor.resolve()?;
            let attempt = index + 1;
            if let Some(element) =
                self.poll(session, &query, timeout, |found| Ok(Some(found)))?
            {
                info!(
                    strategy = attempt,
                    of = total,
                    locator = %descriptor,
                    "element found"
                );
                return Ok(element);
            }
            if attempt < total {
                warn!(
                    strategy = attempt,
                    of = total,
                    locator = %descriptor,
                    timeout_ms,
                    "strategy timed out, falling back"
                );
            }
        }

        error!(chain = %chain, "all locator strategies exhausted");
        Err(PilotarError::ElementNotFound {
            chain: chain.to_string(),
            timeout_ms,
        })
    }

    /// Find all elements matching a single descriptor (no fallback chain).
    ///
    /// Polls until at least one match is present.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::ElementNotFound`] if nothing matches within
    /// the timeout, or [`PilotarError::InvalidLocator`] for an unresolvable
    /// descriptor.
    pub fn find_all<S: PageSession>(
        &self,
        session: &S,
        descriptor: &LocatorDescriptor,
        timeout: Duration,
    ) -> PilotarResult<Vec<ElementHandle>> {
        let query = descriptor.resolve()?;
        let deadline = Instant::now() + timeout;
        loop {
            let matches = session.query_all(&query)?;
            if !matches.is_empty() {
                let count = matches.len();
                info!(count, locator = %descriptor, "elements found");
                return Ok(matches);
            }
            if Instant::now() >= deadline {
                error!(locator = %descriptor, "no elements found");
                return Err(PilotarError::ElementNotFound {
                    chain: format!("[{descriptor}]"),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Find an element through the chain and wait until it is visible.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::find_element`]; a present-but-hidden
    /// element counts as a miss for its descriptor.
    pub fn wait_visible<S: PageSession>(
        &self,
        session: &S,
        chain: &LocatorChain,
        timeout: Duration,
    ) -> PilotarResult<ElementHandle> {
        let total = chain.len();
        for (index, descriptor) in chain.iter().enumerate() {
            let query = descriptor.resolve()?;
            let attempt = index + 1;
            let visible = self.poll(session, &query, timeout, |found| {
                if session.is_visible(&found)? {
                    Ok(Some(found))
                } else {
                    Ok(None)
                }
            })?;
            if let Some(element) = visible {
                info!(
                    strategy = attempt,
                    of = total,
                    locator = %descriptor,
                    "element visible"
                );
                return Ok(element);
            }
            if attempt < total {
                warn!(
                    strategy = attempt,
                    of = total,
                    locator = %descriptor,
                    "visibility wait timed out, falling back"
                );
            }
        }

        error!(chain = %chain, "no strategy yielded a visible element");
        Err(PilotarError::ElementNotFound {
            chain: chain.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// Poll one resolved query until `accept` yields an element or the
    /// timeout lapses. Always probes at least once.
    fn poll<S, F>(
        &self,
        session: &S,
        query: &ResolvedQuery,
        timeout: Duration,
        accept: F,
    ) -> PilotarResult<Option<ElementHandle>>
    where
        S: PageSession,
        F: Fn(ElementHandle) -> PilotarResult<Option<ElementHandle>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(found) = session.query(query)? {
                if let Some(accepted) = accept(found)? {
                    return Ok(Some(accepted));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorDescriptor;
    use crate::mock::{MockNode, MockSession};

    fn fast_finder() -> ElementFinder {
        ElementFinder::new().with_poll_interval(Duration::from_millis(1))
    }

    fn short() -> Duration {
        Duration::from_millis(10)
    }

    fn username_chain() -> LocatorChain {
        LocatorChain::new(LocatorDescriptor::id("username"))
            .with_fallback(LocatorDescriptor::name("email"))
            .with_fallback(LocatorDescriptor::css("input[type='email']"))
    }

    mod find_element_tests {
        use super::*;

        #[test]
        fn test_primary_strategy_wins() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[id='username']".to_string()),
                MockNode::new("input"),
            );
            let element = fast_finder()
                .find_element(&session, &username_chain(), short())
                .unwrap();
            assert_eq!(element.id, "css:[id='username']#0");
            // later strategies are never probed
            assert_eq!(
                session.probe_count(&ResolvedQuery::Css("[name='email']".to_string())),
                0
            );
        }

        #[test]
        fn test_fallback_to_second_strategy() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[name='email']".to_string()),
                MockNode::new("input"),
            );
            let element = fast_finder()
                .find_element(&session, &username_chain(), short())
                .unwrap();
            assert_eq!(element.id, "css:[name='email']#0");
            // the first strategy was actually tried before falling back
            assert!(session.probe_count(&ResolvedQuery::Css("[id='username']".to_string())) >= 1);
        }

        #[test]
        fn test_fallback_order_is_declared_order() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("input[type='email']".to_string()),
                MockNode::new("input"),
            );
            let element = fast_finder()
                .find_element(&session, &username_chain(), short())
                .unwrap();
            assert_eq!(element.id, "css:input[type='email']#0");
            let log = session.query_log();
            let first_primary = log.iter().position(|q| q == "css:[id='username']").unwrap();
            let first_second = log.iter().position(|q| q == "css:[name='email']").unwrap();
            let first_third = log
                .iter()
                .position(|q| q == "css:input[type='email']")
                .unwrap();
            assert!(first_primary < first_second);
            assert!(first_second < first_third);
        }

        #[test]
        fn test_element_appearing_mid_poll_is_found() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[id='username']".to_string()),
                MockNode::new("input").appears_after(3),
            );
            let element = fast_finder()
                .find_element(&session, &username_chain(), Duration::from_millis(100))
                .unwrap();
            assert_eq!(element.id, "css:[id='username']#0");
            assert!(session.probe_count(&ResolvedQuery::Css("[id='username']".to_string())) >= 4);
        }

        #[test]
        fn test_exhausted_chain_reports_whole_chain() {
            let session = MockSession::new();
            let err = fast_finder()
                .find_element(&session, &username_chain(), short())
                .unwrap_err();
            match err {
                PilotarError::ElementNotFound { chain, timeout_ms } => {
                    assert!(chain.contains("id=username"));
                    assert!(chain.contains("name=email"));
                    assert!(chain.contains("input[type='email']"));
                    assert_eq!(timeout_ms, 10);
                }
                other => panic!("expected ElementNotFound, got {other:?}"),
            }
        }

        #[test]
        fn test_invalid_descriptor_fails_fast() {
            let session = MockSession::new();
            let chain = LocatorChain::new(LocatorDescriptor::class("alert alert-danger"));
            let err = fast_finder()
                .find_element(&session, &chain, short())
                .unwrap_err();
            assert!(matches!(err, PilotarError::InvalidLocator { .. }));
            // the invalid descriptor never reached the session
            assert!(session.query_log().is_empty());
        }

        #[test]
        fn test_zero_timeout_still_probes_once() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[id='username']".to_string()),
                MockNode::new("input"),
            );
            let chain = LocatorChain::new(LocatorDescriptor::id("username"));
            let element = fast_finder()
                .find_element(&session, &chain, Duration::ZERO)
                .unwrap();
            assert_eq!(element.tag_name, "input");
        }
    }

    mod find_all_tests {
        use super::*;

        #[test]
        fn test_returns_every_match() {
            let session = MockSession::new();
            session.stage_list(
                &ResolvedQuery::Css("li".to_string()),
                vec![MockNode::new("li"), MockNode::new("li"), MockNode::new("li")],
            );
            let elements = fast_finder()
                .find_all(&session, &LocatorDescriptor::css("li"), short())
                .unwrap();
            assert_eq!(elements.len(), 3);
        }

        #[test]
        fn test_no_fallback_for_find_all() {
            let session = MockSession::new();
            let err = fast_finder()
                .find_all(&session, &LocatorDescriptor::id("missing"), short())
                .unwrap_err();
            assert!(matches!(err, PilotarError::ElementNotFound { .. }));
        }
    }

    mod wait_visible_tests {
        use super::*;

        #[test]
        fn test_visible_element_is_returned() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[id='username']".to_string()),
                MockNode::new("input"),
            );
            let chain = LocatorChain::new(LocatorDescriptor::id("username"));
            assert!(fast_finder().wait_visible(&session, &chain, short()).is_ok());
        }

        #[test]
        fn test_hidden_element_counts_as_miss() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::Css("[id='username']".to_string()),
                MockNode::new("input").hidden(),
            );
            let chain = LocatorChain::new(LocatorDescriptor::id("username"));
            let err = fast_finder()
                .wait_visible(&session, &chain, short())
                .unwrap_err();
            assert!(matches!(err, PilotarError::ElementNotFound { .. }));
        }

        #[test]
        fn test_hidden_primary_falls_back_to_visible_secondary() {
            let session = MockSession::new();
            session.stage(
                &ResolvedQuery::XPath("//h1[contains(text(), 'Welcome')]".to_string()),
                MockNode::new("h1").hidden(),
            );
            session.stage(
                &ResolvedQuery::Css(".welcome-message".to_string()),
                MockNode::new("div").with_text("Welcome"),
            );
            let chain = LocatorChain::new(LocatorDescriptor::xpath(
                "//h1[contains(text(), 'Welcome')]",
            ))
            .with_fallback(LocatorDescriptor::css(".welcome-message"));
            let element = fast_finder().wait_visible(&session, &chain, short()).unwrap();
            assert_eq!(element.id, "css:.welcome-message#0");
        }
    }

    mod fallback_property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// For any chain length and any first-present index, the finder
            /// returns the element at that index and probes every earlier
            /// descriptor at least once, none after it.
            #[test]
            fn first_present_strategy_wins(len in 1usize..6, present in 0usize..6) {
                let present = present.min(len - 1);
                let descriptors: Vec<LocatorDescriptor> = (0..len)
                    .map(|i| LocatorDescriptor::id(format!("slot-{i}")))
                    .collect();
                let chain = LocatorChain::from_vec(descriptors.clone()).unwrap();

                let session = MockSession::new();
                let target = ResolvedQuery::Css(format!("[id='slot-{present}']"));
                session.stage(&target, MockNode::new("div"));

                let element = fast_finder()
                    .find_element(&session, &chain, Duration::from_millis(5))
                    .unwrap();
                prop_assert_eq!(element.id, format!("css:[id='slot-{}']#0", present));

                for (i, descriptor) in descriptors.iter().enumerate() {
                    let query = descriptor.resolve().unwrap();
                    let probes = session.probe_count(&query);
                    if i <= present {
                        prop_assert!(probes >= 1);
                    } else {
                        prop_assert_eq!(probes, 0);
                    }
                }
            }
        }
    }
}
