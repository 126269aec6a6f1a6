//! Arena-backed HTML document
//!
//! A `Document` is built once per request from raw HTML and is read-only
//! afterwards. Nodes live in a single `Vec` in document (pre-order) order and
//! refer to each other through `NodeId`s; the parent link is only used for
//! sibling-position and path queries.

use regex::Regex;
use scraper::Html;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::locator::{Condition, Locator, Predicate};

/// Tags html5ever inserts even when the source does not contain them
const IMPLIED_TAGS: [&str; 3] = ["html", "head", "body"];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reasons raw input cannot be treated as HTML
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("HTML content is empty")]
    Empty,

    #[error("content looks like binary data, not HTML")]
    Binary,

    #[error("no HTML elements found in content")]
    NoElements,
}

/// Index of a node inside its `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One element of the parsed page
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Lowercase tag name
    pub tag: String,
    pub attributes: HashMap<String, String>,
    /// Concatenation of the element's own text children (not descendants)
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Node {
    /// Attribute value, treating empty values as absent
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Direct text with whitespace collapsed, the way `text()` is compared
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }
}

/// Collapse whitespace runs (NBSP included) and trim
pub fn normalize_text(s: &str) -> String {
    let s = s.replace('\u{00A0}', " ");
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Parsed HTML page
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse raw HTML. Malformed markup is recovered by the html5ever tree
    /// builder; only input that is not markup at all is rejected.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        if looks_binary(raw) {
            return Err(ParseError::Binary);
        }

        let html = Html::parse_document(raw);
        let mut nodes: Vec<Node> = Vec::new();

        // Pre-order walk so arena order == document order
        let mut stack = vec![(html.tree.root(), None::<NodeId>)];
        while let Some((node_ref, parent)) = stack.pop() {
            let scraper::Node::Element(element) = node_ref.value() else {
                // Document root and fragments: descend without creating a node
                if matches!(
                    node_ref.value(),
                    scraper::Node::Document | scraper::Node::Fragment
                ) {
                    let children: Vec<_> = node_ref.children().collect();
                    stack.extend(children.into_iter().rev().map(|c| (c, parent)));
                }
                continue;
            };

            let id = NodeId(nodes.len());
            let mut text = String::new();
            for child in node_ref.children() {
                if let scraper::Node::Text(t) = child.value() {
                    text.push_str(t);
                }
            }

            nodes.push(Node {
                id,
                tag: element.name().to_lowercase(),
                attributes: element
                    .attrs()
                    .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                    .collect(),
                text,
                children: Vec::new(),
                parent,
            });
            if let Some(p) = parent {
                nodes[p.0].children.push(id);
            }

            let children: Vec<_> = node_ref
                .children()
                .filter(|c| c.value().is_element())
                .collect();
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
        }

        if nodes.iter().all(|n| IMPLIED_TAGS.contains(&n.tag.as_str())) {
            return Err(ParseError::NoElements);
        }

        Ok(Self { nodes })
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All nodes in document order (depth-first, pre-order)
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|p| self.node(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.node(id).children.iter().map(|c| self.node(*c))
    }

    /// Other children of the same parent with the same tag
    pub fn same_tag_siblings(&self, id: NodeId) -> Vec<&Node> {
        let node = self.node(id);
        match node.parent {
            Some(p) => self
                .children(p)
                .filter(|s| s.id != id && s.tag == node.tag)
                .collect(),
            None => Vec::new(),
        }
    }

    /// 0-based position among siblings sharing the node's tag
    pub fn sibling_position(&self, id: NodeId) -> usize {
        let node = self.node(id);
        match node.parent {
            Some(p) => self
                .children(p)
                .filter(|s| s.tag == node.tag)
                .position(|s| s.id == id)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Absolute path such as `/html/body/div[1]/button[2]`
    pub fn absolute_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur);
            if IMPLIED_TAGS.contains(&node.tag.as_str()) {
                segments.push(node.tag.clone());
            } else {
                segments.push(format!("{}[{}]", node.tag, self.sibling_position(cur) + 1));
            }
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Every node the locator resolves to, in document order
    pub fn evaluate(&self, locator: &Locator) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| locator.tag.as_deref().map_or(true, |t| n.tag == t))
            .filter(|n| match &locator.predicate {
                None => true,
                Some(Predicate::Position(pos)) => self.sibling_position(n.id) + 1 == *pos,
                Some(Predicate::All(conditions)) => {
                    conditions.iter().all(|c| condition_holds(n, c))
                }
            })
            .map(|n| n.id)
            .collect()
    }
}

fn condition_holds(node: &Node, condition: &Condition) -> bool {
    match condition {
        Condition::AttrEquals(name, value) => {
            node.attributes.get(name).map(String::as_str) == Some(value.as_str())
        }
        Condition::TextEquals(value) => node.normalized_text() == *value,
        Condition::TextContains(value) => node.normalized_text().contains(value.as_str()),
    }
}

/// NUL bytes or a high share of control characters
fn looks_binary(raw: &str) -> bool {
    if raw.contains('\0') {
        return true;
    }
    let total = raw.chars().count();
    let control = raw
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\u{000C}'))
        .count();
    control * 10 > total
}
