//! Locator strategies
//!
//! Each strategy proposes at most one expression for the target element.
//! Proposals are re-evaluated against the whole document before they become
//! candidates:
//!
//! | Strategy              | Expression                          | Base |
//! |-----------------------|-------------------------------------|------|
//! | ID                    | `//*[@id='…']`                      | 0.95 |
//! | Name                  | `//*[@name='…']`                    | 0.85 |
//! | Exact text            | `//tag[text()='…']`                 | 0.75 |
//! | Partial text          | `//tag[contains(text(),'…')]`       | 0.60 |
//! | Class + tag           | `//tag[@class='…']`                 | 0.55 |
//! | Attribute combination | `//tag[@a='…' and @b='…']`          | 0.50 |
//! | Positional            | `//tag[N]`                          | 0.30 |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::{ClassifiedElement, ClassifiedTree};
use crate::html::{normalize_text, quote, Locator, Node};

/// Subtracted when an expression resolves to more than one element
pub const AMBIGUITY_PENALTY: f64 = 0.1;

/// Subtracted from class+tag when a same-tag sibling shares the class string
pub const SHARED_CLASS_PENALTY: f64 = 0.1;

/// Attributes considered stable enough to combine
const STABLE_ATTRIBUTES: [&str; 9] = [
    "type",
    "name",
    "placeholder",
    "aria-label",
    "role",
    "title",
    "alt",
    "for",
    "href",
];

/// Strategy identity. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Id,
    Name,
    ExactText,
    PartialText,
    ClassTag,
    AttributeCombination,
    Positional,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Id,
        StrategyKind::Name,
        StrategyKind::ExactText,
        StrategyKind::PartialText,
        StrategyKind::ClassTag,
        StrategyKind::AttributeCombination,
        StrategyKind::Positional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Id => "ID",
            StrategyKind::Name => "Name attribute",
            StrategyKind::ExactText => "Exact text",
            StrategyKind::PartialText => "Partial text",
            StrategyKind::ClassTag => "Class + tag",
            StrategyKind::AttributeCombination => "Attribute combination",
            StrategyKind::Positional => "Positional",
        }
    }

    pub fn base_confidence(self) -> f64 {
        match self {
            StrategyKind::Id => 0.95,
            StrategyKind::Name => 0.85,
            StrategyKind::ExactText => 0.75,
            StrategyKind::PartialText => 0.6,
            StrategyKind::ClassTag => 0.55,
            StrategyKind::AttributeCombination => 0.5,
            StrategyKind::Positional => 0.3,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scored locator expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorCandidate {
    pub expression: String,
    pub strategy: StrategyKind,
    pub confidence: f64,
    /// Expression resolves to exactly one element
    pub unique: bool,
}

/// Everything a strategy may look at
pub struct StrategyContext<'t, 'd> {
    pub tree: &'t ClassifiedTree<'d>,
    pub target: &'t ClassifiedElement,
    pub hint: &'t str,
}

impl<'t, 'd> StrategyContext<'t, 'd> {
    pub fn node(&self) -> &'d Node {
        self.tree.node(self.target)
    }
}

/// Unverified expression with its pre-check confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub expression: String,
    pub confidence: f64,
}

impl Proposal {
    fn new(expression: String, confidence: f64) -> Self {
        Self {
            expression,
            confidence,
        }
    }
}

pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Build an expression for the target, if the strategy applies
    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal>;

    /// Propose, then re-check the expression against the full document.
    /// Expressions that miss the target are dropped; ambiguous ones are
    /// penalized unless the strategy is positional.
    fn generate(&self, ctx: &StrategyContext<'_, '_>) -> Option<LocatorCandidate> {
        let kind = self.kind();
        let proposal = self.propose(ctx)?;
        let locator = match Locator::parse(&proposal.expression) {
            Ok(locator) => locator,
            Err(e) => {
                log::warn!("{} produced an unparsable locator: {}", kind, e);
                return None;
            }
        };

        let matches = ctx.tree.document().evaluate(&locator);
        if !matches.contains(&ctx.target.node) {
            log::debug!(
                "{}: '{}' does not resolve to the target ({} matches), dropped",
                kind,
                proposal.expression,
                matches.len()
            );
            return None;
        }

        let unique = matches.len() == 1;
        let mut confidence = proposal.confidence;
        if !unique && kind != StrategyKind::Positional {
            confidence -= AMBIGUITY_PENALTY;
        }

        log::debug!(
            "{}: '{}' matches {} element(s), confidence {:.2}",
            kind,
            proposal.expression,
            matches.len(),
            confidence
        );

        Some(LocatorCandidate {
            expression: proposal.expression,
            strategy: kind,
            confidence: round_confidence(confidence),
            unique,
        })
    }
}

/// Clamp to [0, 1] and round to two decimals
pub fn round_confidence(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

pub struct IdStrategy;

impl Strategy for IdStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Id
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let id = ctx.node().attr("id")?;
        Some(Proposal::new(
            format!("//*[@id={}]", quote(id)?),
            self.kind().base_confidence(),
        ))
    }
}

pub struct NameStrategy;

impl Strategy for NameStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Name
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let name = ctx.node().attr("name")?;
        Some(Proposal::new(
            format!("//*[@name={}]", quote(name)?),
            self.kind().base_confidence(),
        ))
    }
}

pub struct ExactTextStrategy;

impl Strategy for ExactTextStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactText
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let text = ctx.target.display_text.as_str();
        if text.is_empty() || !same_text(text, ctx.hint) {
            return None;
        }
        Some(Proposal::new(
            format!("//{}[text()={}]", ctx.node().tag, quote(text)?),
            self.kind().base_confidence(),
        ))
    }
}

pub struct PartialTextStrategy;

impl Strategy for PartialTextStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PartialText
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let text = ctx.target.display_text.as_str();
        let hint = normalize_text(ctx.hint);
        if hint.is_empty() || same_text(text, &hint) {
            return None;
        }
        let fragment = matching_fragment(text, &hint)?;
        Some(Proposal::new(
            format!("//{}[contains(text(),{})]", ctx.node().tag, quote(fragment)?),
            self.kind().base_confidence(),
        ))
    }
}

/// Equal after whitespace normalization and Unicode lowercasing, the same
/// comparison target resolution uses
fn same_text(text: &str, hint: &str) -> bool {
    normalize_text(text).to_lowercase() == normalize_text(hint).to_lowercase()
}

/// The part of `text` that matches `needle` case-insensitively, in the
/// original casing of `text`. Lowercasing may change byte lengths
/// (`ẞ` -> `ß`), so candidates are cut on `text`'s own char boundaries.
fn matching_fragment<'a>(text: &'a str, needle: &str) -> Option<&'a str> {
    if let Some(start) = text.find(needle) {
        return Some(&text[start..start + needle.len()]);
    }
    let needle = needle.to_lowercase();
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    bounds.iter().enumerate().find_map(|(i, &start)| {
        bounds[i + 1..]
            .iter()
            .map(|&end| &text[start..end])
            .find(|fragment| fragment.to_lowercase() == needle)
    })
}

pub struct ClassTagStrategy;

impl Strategy for ClassTagStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ClassTag
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let node = ctx.node();
        let class = node.attributes.get("class")?;
        if class.trim().is_empty() {
            return None;
        }

        let shared = ctx
            .tree
            .document()
            .same_tag_siblings(node.id)
            .iter()
            .any(|s| s.attributes.get("class") == Some(class));

        let mut confidence = self.kind().base_confidence();
        if shared {
            confidence -= SHARED_CLASS_PENALTY;
        }
        Some(Proposal::new(
            format!("//{}[@class={}]", node.tag, quote(class)?),
            confidence,
        ))
    }
}

pub struct AttributeCombinationStrategy;

impl Strategy for AttributeCombinationStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AttributeCombination
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        let node = ctx.node();
        let pairs: Vec<String> = STABLE_ATTRIBUTES
            .iter()
            .filter_map(|name| {
                let value = node.attributes.get(*name)?;
                if value.trim().is_empty() {
                    return None;
                }
                Some(format!("@{}={}", name, quote(value)?))
            })
            .take(2)
            .collect();

        if pairs.len() < 2 {
            return None;
        }
        Some(Proposal::new(
            format!("//{}[{}]", node.tag, pairs.join(" and ")),
            self.kind().base_confidence(),
        ))
    }
}

pub struct PositionalStrategy;

impl Strategy for PositionalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Positional
    }

    fn propose(&self, ctx: &StrategyContext<'_, '_>) -> Option<Proposal> {
        Some(Proposal::new(
            format!("//{}[{}]", ctx.node().tag, ctx.target.position + 1),
            self.kind().base_confidence(),
        ))
    }
}

/// All strategies in priority order
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(IdStrategy),
        Box::new(NameStrategy),
        Box::new(ExactTextStrategy),
        Box::new(PartialTextStrategy),
        Box::new(ClassTagStrategy),
        Box::new(AttributeCombinationStrategy),
        Box::new(PositionalStrategy),
    ]
}
