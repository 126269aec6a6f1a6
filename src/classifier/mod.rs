//! Element classification
//!
//! Walks a parsed `Document` and buckets elements by role. The rule function
//! is total and order-sensitive: the first matching rule wins.
//!
//! 1. **Interactive**: button, a, input (except `type="hidden"`), select, textarea
//! 2. **Form**: form, fieldset, label, option
//! 3. **Text**: p, span, h1-h6, li, td, th with non-empty direct text
//! 4. **Structural**: everything else (kept for paths only)

pub mod analysis;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::html::{normalize_text, Document, Node, NodeId};

pub use analysis::{ElementSummary, StructureAnalysis};

const INTERACTIVE_TAGS: [&str; 5] = ["button", "a", "input", "select", "textarea"];
const FORM_TAGS: [&str; 4] = ["form", "fieldset", "label", "option"];
const TEXT_TAGS: [&str; 11] = ["p", "span", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th"];

/// Role an element plays on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Interactive,
    Form,
    Text,
    Structural,
}

impl Role {
    /// Roles returned as primary categories, in lookup order
    pub const PRIMARY: [Role; 3] = [Role::Interactive, Role::Form, Role::Text];

    pub fn of(node: &Node) -> Role {
        let tag = node.tag.as_str();
        if INTERACTIVE_TAGS.contains(&tag) && !is_hidden_input(node) {
            Role::Interactive
        } else if FORM_TAGS.contains(&tag) {
            Role::Form
        } else if TEXT_TAGS.contains(&tag) && !node.normalized_text().is_empty() {
            Role::Text
        } else {
            Role::Structural
        }
    }
}

fn is_hidden_input(node: &Node) -> bool {
    node.tag == "input"
        && node
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

/// A classified view over one document node
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedElement {
    pub role: Role,
    pub node: NodeId,
    /// First non-empty of: direct text, `value`, `placeholder`
    pub display_text: String,
    /// 0-based index among same-tag siblings
    pub position: usize,
}

/// Classification result: role buckets over a borrowed document
#[derive(Debug)]
pub struct ClassifiedTree<'a> {
    document: &'a Document,
    buckets: HashMap<Role, Vec<ClassifiedElement>>,
}

impl<'a> ClassifiedTree<'a> {
    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn node(&self, element: &ClassifiedElement) -> &'a Node {
        self.document.node(element.node)
    }

    /// Elements of a role in document order. Structural is never bucketed.
    pub fn elements(&self, role: Role) -> &[ClassifiedElement] {
        self.buckets.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Primary-role elements, interactive first, then form, then text
    pub fn primary_elements(&self) -> impl Iterator<Item = &ClassifiedElement> {
        Role::PRIMARY.iter().flat_map(|r| self.elements(*r))
    }
}

/// Classify every element of the document
pub fn classify(document: &Document) -> ClassifiedTree<'_> {
    let mut buckets: HashMap<Role, Vec<ClassifiedElement>> = HashMap::new();

    for node in document.nodes() {
        let role = Role::of(node);
        if role == Role::Structural {
            continue;
        }
        buckets.entry(role).or_default().push(ClassifiedElement {
            role,
            node: node.id,
            display_text: display_text(node),
            position: document.sibling_position(node.id),
        });
    }

    log::debug!(
        "classified {} nodes: {} interactive, {} form, {} text",
        document.nodes().count(),
        buckets.get(&Role::Interactive).map_or(0, Vec::len),
        buckets.get(&Role::Form).map_or(0, Vec::len),
        buckets.get(&Role::Text).map_or(0, Vec::len),
    );

    ClassifiedTree { document, buckets }
}

fn display_text(node: &Node) -> String {
    let text = node.normalized_text();
    if !text.is_empty() {
        return text;
    }
    ["value", "placeholder"]
        .iter()
        .filter_map(|a| node.attr(a))
        .map(normalize_text)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}
