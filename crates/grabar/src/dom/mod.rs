//! Arena DOM snapshot model.
//!
//! A [`Document`] is the page as the recorder saw it when an event fired.
//! Nodes live in a flat arena addressed by [`NodeId`]; parent and child
//! links are indices, so the tree has no reference cycles and can be cloned
//! or serialized cheaply.
//!
//! ```text
//! Document (NodeId 0)
//!  └─ html
//!      ├─ head
//!      └─ body
//!          ├─ form#login
//!          │   ├─ input[name=user]
//!          │   └─ button.primary
//!          └─ #text
//! ```

mod parser;
pub mod selector;
pub mod xpath;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::result::GrabarResult;

pub use parser::parse_html;
pub use selector::SelectorList;

/// Index of a node inside its [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An element's tag and attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    tag_name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    /// Create an element; tag and attribute names are lower-cased
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: attributes
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// Lower-case tag name
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Attribute value by (lower-case) name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the attribute is present, even if empty
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(attr, _)| attr == name)
    }

    /// Attributes in source order
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Non-empty `id` attribute
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }

    /// Class names in source order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        let name = name.to_ascii_lowercase();
        if let Some(slot) = self.attributes.iter_mut().find(|(attr, _)| *attr == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeData {
    /// The document node (arena root)
    Document,
    /// An element
    Element(Element),
    /// A text run
    Text(String),
    /// A comment
    Comment(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// A parsed page snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DocumentNodes")]
pub struct Document {
    nodes: Vec<Node>,
    #[serde(skip)]
    id_index: HashMap<String, Vec<NodeId>>,
}

/// Serialized form; the id index is derived from the nodes on load
#[derive(Deserialize)]
struct DocumentNodes {
    nodes: Vec<Node>,
}

impl From<DocumentNodes> for Document {
    fn from(repr: DocumentNodes) -> Self {
        let mut doc = Self {
            nodes: repr.nodes,
            id_index: HashMap::new(),
        };
        doc.rebuild_id_index();
        doc
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root node
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            id_index: HashMap::new(),
        }
    }

    /// Parse an HTML snapshot
    pub fn parse(html: &str) -> GrabarResult<Self> {
        parse_html(html)
    }

    /// The document node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, the root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no content below the root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// First element child of the root, usually `<html>`
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    /// Node payload
    #[must_use]
    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).map(|n| &n.data)
    }

    /// Element payload, if the node is an element
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.data(node) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Whether the node is an element
    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// Tag name of an element node
    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(Element::tag_name)
    }

    /// Attribute of an element node
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attribute(name))
    }

    /// Parent node
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Parent, if it is an element
    #[must_use]
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    /// All child nodes
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Element children only
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// Ancestors from the parent up to (and including) the document node
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |current| self.parent(*current))
    }

    /// Every element in document order
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if self.is_element(node) {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of the node and its descendants
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.data(node) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Document | NodeData::Element(_)) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
            Some(NodeData::Comment(_)) | None => {}
        }
    }

    /// First element carrying the given id, in document order
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index
            .get(id)
            .and_then(|nodes| nodes.iter().min().copied())
    }

    /// All elements carrying the given id, in document order
    #[must_use]
    pub fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        let mut nodes = self.id_index.get(id).cloned().unwrap_or_default();
        nodes.sort_unstable();
        nodes
    }

    /// Elements matching a CSS selector, in document order
    pub fn query_selector_all(&self, selector: &str) -> GrabarResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .filter(|node| list.matches(self, *node))
            .collect())
    }

    /// First element matching a CSS selector
    pub fn query_selector(&self, selector: &str) -> GrabarResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .find(|node| list.matches(self, *node)))
    }

    /// Resolve an absolute positional XPath such as `/html/body/div[2]`
    pub fn resolve_xpath(&self, path: &str) -> GrabarResult<Option<NodeId>> {
        xpath::resolve(self, path)
    }

    /// Append an element under `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        let element = Element::new(tag_name, attributes);
        let id_attr = element.id().map(str::to_string);
        let node = self.push(parent, NodeData::Element(element));
        if let Some(id) = id_attr {
            self.id_index.entry(id).or_default().push(node);
        }
        node
    }

    /// Append a text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeData::Text(text.into()))
    }

    /// Append a comment node under `parent`
    pub fn append_comment(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeData::Comment(text.into()))
    }

    /// Set (or add) an attribute on an element, keeping the id index current
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(Node {
            data: NodeData::Element(element),
            ..
        }) = self.nodes.get_mut(node.0)
        else {
            return;
        };
        element.set_attribute(name, value);
        if name.eq_ignore_ascii_case("id") {
            self.rebuild_id_index();
        }
    }

    /// Rebuild the id lookup table from the element attributes
    pub fn rebuild_id_index(&mut self) {
        self.id_index.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            if let NodeData::Element(element) = &node.data {
                if let Some(id) = element.id() {
                    self.id_index
                        .entry(id.to_string())
                        .or_default()
                        .push(NodeId(index));
                }
            }
        }
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(node);
        }
        node
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.append_element(doc.root(), "html", Vec::new());
        let body = doc.append_element(html, "BODY", Vec::new());
        let button = doc.append_element(body, "button", attrs(&[("id", "go"), ("class", "a b")]));
        doc.append_text(button, "Go");
        (doc, html, body, button)
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_tag_and_attribute_names_lowercased() {
            let element = Element::new("DIV", attrs(&[("Data-TestId", "x")]));
            assert_eq!(element.tag_name(), "div");
            assert_eq!(element.attribute("data-testid"), Some("x"));
        }

        #[test]
        fn test_empty_id_is_absent() {
            let element = Element::new("div", attrs(&[("id", "")]));
            assert!(element.has_attribute("id"));
            assert_eq!(element.id(), None);
        }

        #[test]
        fn test_classes_split_on_whitespace() {
            let element = Element::new("div", attrs(&[("class", "  card\tcard--big ")]));
            let classes: Vec<_> = element.classes().collect();
            assert_eq!(classes, vec!["card", "card--big"]);
        }
    }

    mod tree_tests {
        use super::*;

        #[test]
        fn test_document_element() {
            let (doc, html, _, _) = sample();
            assert_eq!(doc.document_element(), Some(html));
        }

        #[test]
        fn test_parent_and_ancestors() {
            let (doc, html, body, button) = sample();
            assert_eq!(doc.parent(button), Some(body));
            let ancestors: Vec<_> = doc.ancestors(button).collect();
            assert_eq!(ancestors, vec![body, html, doc.root()]);
            assert_eq!(doc.parent_element(html), None);
        }

        #[test]
        fn test_elements_in_document_order() {
            let (doc, html, body, button) = sample();
            assert_eq!(doc.elements(), vec![html, body, button]);
        }

        #[test]
        fn test_text_content() {
            let (doc, _, body, _) = sample();
            assert_eq!(doc.text_content(body), "Go");
        }

        #[test]
        fn test_element_children_skip_text() {
            let (doc, _, _, button) = sample();
            assert_eq!(doc.children(button).len(), 1);
            assert_eq!(doc.element_children(button).count(), 0);
        }
    }

    mod id_index_tests {
        use super::*;

        #[test]
        fn test_get_element_by_id() {
            let (doc, _, _, button) = sample();
            assert_eq!(doc.get_element_by_id("go"), Some(button));
            assert_eq!(doc.get_element_by_id("missing"), None);
        }

        #[test]
        fn test_set_attribute_reindexes_id() {
            let (mut doc, _, _, button) = sample();
            doc.set_attribute(button, "id", "stop");
            assert_eq!(doc.get_element_by_id("go"), None);
            assert_eq!(doc.get_element_by_id("stop"), Some(button));
        }

        #[test]
        fn test_deserialized_document_indexes_ids() {
            let (doc, _, _, button) = sample();
            let json = serde_json::to_string(&doc).unwrap();
            assert!(!json.contains("id_index"));
            let restored: Document = serde_json::from_str(&json).unwrap();
            assert_eq!(restored.get_element_by_id("go"), Some(button));
            assert_eq!(
                crate::locator::Locator::id("go").resolve(&restored).unwrap(),
                vec![button]
            );
        }

        #[test]
        fn test_duplicate_ids_in_document_order() {
            let mut doc = Document::new();
            let a = doc.append_element(doc.root(), "p", attrs(&[("id", "dup")]));
            let b = doc.append_element(doc.root(), "p", attrs(&[("id", "dup")]));
            assert_eq!(doc.elements_by_id("dup"), vec![a, b]);
            assert_eq!(doc.get_element_by_id("dup"), Some(a));
        }
    }
}
