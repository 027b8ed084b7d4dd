//! Locator synthesis: turn an element into a string that re-finds it.
//!
//! Rules are tried in priority order and the first that applies wins:
//!
//! 1. non-empty `id` attribute -> `ID` locator `#<id>`
//! 2. test attribute (`data-testid`, `data-test`, ...) -> `CSS` `[attr="v"]`
//! 3. non-empty `name` attribute -> `NAME` locator
//! 4. first class name, if `.class` matches exactly one element -> `CSS`
//! 5. structural fallback -> `XPATH` `/html[1]/body[1]/div[2]/...`
//!
//! The class check in rule 4 only sees the snapshot taken when the event
//! fired, and the rule 5 path only holds while the document keeps its shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dom::selector::{escape_ident, quote_value};
use crate::dom::{xpath, Document, NodeId};
use crate::result::{GrabarError, GrabarResult};

/// Test attributes checked by rule 2, in order
pub const DEFAULT_TEST_ATTRIBUTES: &[&str] = &["data-testid", "data-test", "data-cy", "data-qa"];

/// How a locator's selector string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LocatorKind {
    /// Element id (`#submit`)
    Id,
    /// CSS selector
    Css,
    /// Absolute structural XPath
    #[serde(rename = "XPATH")]
    XPath,
    /// `name` attribute value
    Name,
}

impl LocatorKind {
    /// Upper-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Css => "CSS",
            Self::XPath => "XPATH",
            Self::Name => "NAME",
        }
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selector string tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Selector interpretation
    pub kind: LocatorKind,
    /// Selector text
    pub selector: String,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(kind: LocatorKind, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
        }
    }

    /// `ID` locator for a raw id value
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::new(LocatorKind::Id, format!("#{id}"))
    }

    /// `NAME` locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(LocatorKind::Name, name)
    }

    /// `CSS` locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(LocatorKind::Css, selector)
    }

    /// `XPATH` locator
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::new(LocatorKind::XPath, path)
    }

    /// Argument for a WebDriver `By` strategy (`#submit` -> `submit`)
    #[must_use]
    pub fn strategy_value(&self) -> &str {
        match self.kind {
            LocatorKind::Id => self.selector.strip_prefix('#').unwrap_or(&self.selector),
            _ => &self.selector,
        }
    }

    /// Re-find the element(s) this locator designates, in document order
    pub fn resolve(&self, doc: &Document) -> GrabarResult<Vec<NodeId>> {
        match self.kind {
            LocatorKind::Id => Ok(doc.elements_by_id(self.strategy_value())),
            LocatorKind::Name => Ok(doc
                .elements()
                .into_iter()
                .filter(|node| doc.attribute(*node, "name") == Some(self.selector.as_str()))
                .collect()),
            LocatorKind::Css => doc.query_selector_all(&self.selector),
            LocatorKind::XPath => Ok(doc.resolve_xpath(&self.selector)?.into_iter().collect()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.selector)
    }
}

/// Locator synthesis options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Test attributes for rule 2, in priority order
    pub test_attributes: Vec<String>,
    /// Whether rule 4 (unique first class) is tried
    pub use_class: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            test_attributes: DEFAULT_TEST_ATTRIBUTES
                .iter()
                .map(|a| (*a).to_string())
                .collect(),
            use_class: true,
        }
    }
}

/// Derives locators for elements of a snapshot
#[derive(Debug, Clone, Default)]
pub struct LocatorSynthesizer {
    config: LocatorConfig,
}

impl LocatorSynthesizer {
    /// Synthesizer with the given options
    #[must_use]
    pub const fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Active options
    #[must_use]
    pub const fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Derive the locator for an element
    pub fn synthesize(&self, doc: &Document, node: NodeId) -> GrabarResult<Locator> {
        let element = doc.element(node).ok_or(GrabarError::NotAnElement {
            node: node.index(),
        })?;

        if let Some(id) = element.id() {
            tracing::debug!(id, "locator: id rule");
            return Ok(Locator::id(id));
        }

        for attr in &self.config.test_attributes {
            if let Some(value) = element.attribute(attr).filter(|v| !v.is_empty()) {
                tracing::debug!(attr = attr.as_str(), "locator: test attribute rule");
                return Ok(Locator::css(format!(
                    "[{}={}]",
                    escape_ident(attr),
                    quote_value(value)
                )));
            }
        }

        if let Some(name) = element.attribute("name").filter(|n| !n.is_empty()) {
            tracing::debug!(name, "locator: name rule");
            return Ok(Locator::name(name));
        }

        if self.config.use_class {
            if let Some(locator) = unique_class(doc, element.classes().next()) {
                tracing::debug!(selector = locator.selector.as_str(), "locator: class rule");
                return Ok(locator);
            }
        }

        let path = xpath::absolute_path(doc, node);
        tracing::debug!(path = path.as_str(), "locator: structural fallback");
        Ok(Locator::xpath(path))
    }
}

fn unique_class(doc: &Document, class: Option<&str>) -> Option<Locator> {
    let selector = format!(".{}", escape_ident(class?));
    match doc.query_selector_all(&selector) {
        Ok(matches) if matches.len() == 1 => Some(Locator::css(selector)),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(%err, "locator: class selector not usable");
            None
        }
    }
}

/// Derive a locator with default options
pub fn synthesize(doc: &Document, node: NodeId) -> GrabarResult<Locator> {
    LocatorSynthesizer::default().synthesize(doc, node)
}
