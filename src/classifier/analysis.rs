//! Structure summary of a classified page

use serde::{Deserialize, Serialize};

use super::{ClassifiedElement, ClassifiedTree, Role};

/// Serializable description of one classified element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSummary {
    pub tag: String,
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Absolute path from the document root
    pub path: String,
}

/// Page structure grouped by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureAnalysis {
    pub total_elements: usize,
    pub interactive_elements: Vec<ElementSummary>,
    pub form_elements: Vec<ElementSummary>,
    pub text_elements: Vec<ElementSummary>,
    pub forms: usize,
    pub links: usize,
    pub inputs: usize,
    pub buttons: usize,
}

impl ClassifiedTree<'_> {
    pub fn summarize(&self, element: &ClassifiedElement) -> ElementSummary {
        let node = self.node(element);
        let owned = |name: &str| node.attr(name).map(str::to_string);
        ElementSummary {
            tag: node.tag.clone(),
            role: element.role,
            text: element.display_text.clone(),
            id: owned("id"),
            name: owned("name"),
            class: owned("class"),
            input_type: owned("type"),
            path: self.document().absolute_path(element.node),
        }
    }

    pub fn analyze(&self) -> StructureAnalysis {
        let summaries = |role| {
            self.elements(role)
                .iter()
                .map(|e| self.summarize(e))
                .collect::<Vec<_>>()
        };
        // Tag counts cover the whole document, hidden inputs included
        let count_tags = |tags: &[&str]| {
            self.document()
                .nodes()
                .filter(|n| tags.contains(&n.tag.as_str()))
                .count()
        };

        StructureAnalysis {
            total_elements: self.document().nodes().count(),
            form_elements: summaries(Role::Form),
            text_elements: summaries(Role::Text),
            forms: count_tags(&["form"]),
            links: count_tags(&["a"]),
            buttons: count_tags(&["button"]),
            inputs: count_tags(&["input", "select", "textarea"]),
            interactive_elements: summaries(Role::Interactive),
        }
    }
}
