//! Target resolution: which classified element does the description mean?
//!
//! Match tiers (first tier with a hit wins, document order inside a tier,
//! interactive elements before form and text elements):
//! 1. display text equals the hint
//! 2. an identifying attribute equals the hint
//! 3. display text contains the hint
//! 4. an identifying attribute contains the hint
//!
//! Comparisons are case-insensitive on whitespace-normalized strings.

use crate::classifier::{ClassifiedElement, ClassifiedTree};
use crate::html::{normalize_text, Node};

const IDENTIFYING_ATTRIBUTES: [&str; 7] = [
    "id",
    "name",
    "aria-label",
    "title",
    "placeholder",
    "value",
    "alt",
];

/// Does the element satisfy the optional `element_type` filter?
/// Accepts a tag name (`button`) or an input type (`email`).
fn type_matches(node: &Node, element_type: Option<&str>) -> bool {
    let Some(wanted) = element_type.map(str::trim).filter(|t| !t.is_empty()) else {
        return true;
    };
    node.tag.eq_ignore_ascii_case(wanted)
        || (node.tag == "input"
            && node
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case(wanted)))
}

pub fn resolve_target<'t>(
    hint: &str,
    element_type: Option<&str>,
    tree: &'t ClassifiedTree<'_>,
) -> Option<&'t ClassifiedElement> {
    let hint = normalize_text(hint).to_lowercase();
    if hint.is_empty() {
        return None;
    }

    let pool: Vec<(&ClassifiedElement, &Node)> = tree
        .primary_elements()
        .map(|e| (e, tree.node(e)))
        .filter(|(_, n)| type_matches(*n, element_type))
        .collect();

    let attrs = |node: &Node| -> Vec<String> {
        IDENTIFYING_ATTRIBUTES
            .iter()
            .filter_map(|a| node.attr(a))
            .map(|v| normalize_text(v).to_lowercase())
            .collect()
    };

    let tiers: [&dyn Fn(&ClassifiedElement, &Node) -> bool; 4] = [
        &|e: &ClassifiedElement, _: &Node| e.display_text.to_lowercase() == hint,
        &|_: &ClassifiedElement, n: &Node| attrs(n).iter().any(|v| *v == hint),
        &|e: &ClassifiedElement, _: &Node| e.display_text.to_lowercase().contains(&hint),
        &|_: &ClassifiedElement, n: &Node| attrs(n).iter().any(|v| v.contains(&hint)),
    ];

    for (tier, matches) in tiers.iter().enumerate() {
        if let Some((element, node)) = pool.iter().find(|(e, n)| matches(*e, *n)) {
            log::debug!(
                "target '{}' resolved to <{}> at tier {}",
                hint,
                node.tag,
                tier + 1
            );
            return Some(*element);
        }
    }

    log::debug!("no element matches target '{}'", hint);
    None
}
