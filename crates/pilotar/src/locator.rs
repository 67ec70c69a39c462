//! Locator descriptors and the strategy resolver.
//!
//! A [`LocatorDescriptor`] names an element abstractly (`id=username`,
//! `css=input[type='email']`). The resolver turns it into a concrete
//! [`ResolvedQuery`] the browser layer can execute. Descriptors are grouped
//! into a [`LocatorChain`]: a non-empty, ordered fallback sequence where the
//! first strategy that matches wins.
//!
//! Strategy names follow the WebDriver locator vocabulary
//! (<https://www.w3.org/TR/webdriver2/#locator-strategies>).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{PilotarError, PilotarResult};

/// Default timeout for element polling (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval while waiting for an element (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Locator strategy for finding elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Match on the `id` attribute
    Id,
    /// Match on the `name` attribute
    Name,
    /// Raw XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// Raw CSS selector
    Css,
    /// Match on a single class name
    Class,
    /// Match on the tag name
    Tag,
    /// Anchor whose text equals the value
    LinkText,
    /// Anchor whose text contains the value
    PartialLinkText,
}

impl Strategy {
    /// All recognized strategies, in documentation order
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::Name,
        Self::XPath,
        Self::Css,
        Self::Class,
        Self::Tag,
        Self::LinkText,
        Self::PartialLinkText,
    ];

    /// Wire name of the strategy as used in scenario and page data
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::XPath => "xpath",
            Self::Css => "css",
            Self::Class => "class",
            Self::Tag => "tag",
            Self::LinkText => "link_text",
            Self::PartialLinkText => "partial_link_text",
        }
    }
}

impl FromStr for Strategy {
    type Err = PilotarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| PilotarError::InvalidLocator {
                message: format!("unrecognized locator strategy '{s}'"),
            })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete query the browser layer executes directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedQuery {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl ResolvedQuery {
    /// The query expression itself
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(expr) | Self::XPath(expr) => expr,
        }
    }

    /// Short name of the query language, for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
        }
    }
}

impl fmt::Display for ResolvedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.expression())
    }
}

/// An abstract element locator: a strategy plus its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    /// How to look the element up
    #[serde(rename = "type")]
    pub strategy: Strategy,
    /// Strategy-specific value (attribute value, selector, expression)
    pub value: String,
}

impl LocatorDescriptor {
    /// Create a descriptor from a strategy and value
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Locate by `id` attribute
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// Locate by XPath expression
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// Locate by class name
    #[must_use]
    pub fn class(value: impl Into<String>) -> Self {
        Self::new(Strategy::Class, value)
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag(value: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, value)
    }

    /// Locate an anchor by its exact text
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// Locate an anchor whose text contains the value
    #[must_use]
    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, value)
    }

    /// Resolve the descriptor into a concrete browser query.
    ///
    /// Pure: no side effects, no browser access.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::InvalidLocator`] if the value is empty, or if
    /// a `class` value contains whitespace (compound class names cannot be
    /// expressed as a single class selector).
    pub fn resolve(&self) -> PilotarResult<ResolvedQuery> {
        if self.value.trim().is_empty() {
            return Err(PilotarError::InvalidLocator {
                message: format!("empty value for strategy '{}'", self.strategy),
            });
        }

        let query = match self.strategy {
            Strategy::Id => ResolvedQuery::Css(format!("[id='{}']", css_escape(&self.value))),
            Strategy::Name => ResolvedQuery::Css(format!("[name='{}']", css_escape(&self.value))),
            Strategy::Css => ResolvedQuery::Css(self.value.clone()),
            Strategy::Class => {
                if self.value.contains(char::is_whitespace) {
                    return Err(PilotarError::InvalidLocator {
                        message: format!("compound class name '{}' is not supported", self.value),
                    });
                }
                ResolvedQuery::Css(format!(".{}", self.value))
            }
            Strategy::Tag => ResolvedQuery::Css(self.value.clone()),
            Strategy::XPath => ResolvedQuery::XPath(self.value.clone()),
            Strategy::LinkText => ResolvedQuery::XPath(format!(
                "//a[normalize-space(text())={}]",
                xpath_literal(&self.value)
            )),
            Strategy::PartialLinkText => ResolvedQuery::XPath(format!(
                "//a[contains(normalize-space(text()), {})]",
                xpath_literal(&self.value)
            )),
        };

        Ok(query)
    }
}

impl fmt::Display for LocatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Escape a value for embedding inside a single-quoted CSS attribute selector
fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render a string as an XPath 1.0 literal.
///
/// XPath 1.0 has no escape syntax inside string literals, so values containing
/// both quote kinds are rendered via `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut parts = Vec::new();
    for (i, segment) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !segment.is_empty() {
            parts.push(format!("'{segment}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// An ordered, non-empty fallback chain of locator descriptors.
///
/// Order is significant: strategies are tried strictly in declared order and
/// the first one that matches wins. Emptiness is rejected at construction and
/// at deserialization, so consumers never see a chain with nothing to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LocatorDescriptor>", into = "Vec<LocatorDescriptor>")]
pub struct LocatorChain {
    descriptors: Vec<LocatorDescriptor>,
}

impl LocatorChain {
    /// Create a chain from its primary descriptor
    #[must_use]
    pub fn new(primary: LocatorDescriptor) -> Self {
        Self {
            descriptors: vec![primary],
        }
    }

    /// Append a fallback descriptor, tried after all earlier ones
    #[must_use]
    pub fn with_fallback(mut self, descriptor: LocatorDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Build a chain from an existing descriptor list.
    ///
    /// # Errors
    ///
    /// Returns [`PilotarError::InvalidLocator`] if the list is empty.
    pub fn from_vec(descriptors: Vec<LocatorDescriptor>) -> PilotarResult<Self> {
        if descriptors.is_empty() {
            return Err(PilotarError::InvalidLocator {
                message: "locator chain must contain at least one descriptor".to_string(),
            });
        }
        Ok(Self { descriptors })
    }

    /// The primary (first) descriptor
    #[must_use]
    pub fn primary(&self) -> &LocatorDescriptor {
        &self.descriptors[0]
    }

    /// Resolve the primary descriptor to a concrete query.
    ///
    /// # Errors
    ///
    /// Propagates the resolution error of the primary descriptor.
    pub fn resolve_primary(&self) -> PilotarResult<ResolvedQuery> {
        self.primary().resolve()
    }

    /// Iterate descriptors in fallback order
    pub fn iter(&self) -> std::slice::Iter<'_, LocatorDescriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors in the chain (always ≥ 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// A chain is never empty; provided for completeness
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<LocatorDescriptor>> for LocatorChain {
    type Error = PilotarError;

    fn try_from(descriptors: Vec<LocatorDescriptor>) -> Result<Self, Self::Error> {
        Self::from_vec(descriptors)
    }
}

impl From<LocatorChain> for Vec<LocatorDescriptor> {
    fn from(chain: LocatorChain) -> Self {
        chain.descriptors
    }
}

impl<'a> IntoIterator for &'a LocatorChain {
    type Item = &'a LocatorDescriptor;
    type IntoIter = std::slice::Iter<'a, LocatorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{descriptor}")?;
        }
        write!(f, "]")
    }
}
