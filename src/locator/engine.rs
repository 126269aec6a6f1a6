//! Deterministic locator pipeline
//!
//! `raw HTML -> Document -> ClassifiedTree -> target -> strategies -> rank`
//!
//! Failures that a caller may want to hand to a fallback agent are returned
//! as `LocatorOutcome::NeedsFallback` instead of errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ranking::{rank_with_limit, LocatorResult, DEFAULT_MAX_ALTERNATIVES};
use super::strategy::{default_strategies, LocatorCandidate, Strategy, StrategyContext};
use super::target::resolve_target;
use crate::classifier::{classify, ClassifiedElement, ClassifiedTree};
use crate::html::{normalize_text, Document};

/// Locator generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorRequest {
    pub html_content: String,
    #[serde(default)]
    pub target_description: String,
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub additional_context: Option<String>,
}

impl LocatorRequest {
    pub fn new(html_content: impl Into<String>, target_description: impl Into<String>) -> Self {
        Self {
            html_content: html_content.into(),
            target_description: target_description.into(),
            ..Default::default()
        }
    }

    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }
}

/// Why the deterministic engine could not answer
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Input is not interpretable as HTML
    ParseFailure(String),
    /// No element matched the target description
    NoMatch(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::ParseFailure(detail) => write!(f, "Could not parse HTML: {}", detail),
            FallbackReason::NoMatch(hint) => write!(
                f,
                "No element matches target '{}'; no locator strategy applied",
                hint
            ),
        }
    }
}

/// Result of the deterministic stage
#[derive(Debug, Clone, PartialEq)]
pub enum LocatorOutcome {
    Resolved(LocatorResult),
    NeedsFallback(FallbackReason),
}

impl LocatorOutcome {
    /// Collapse to a `LocatorResult`, reporting fallbacks as `success = false`
    pub fn into_result(self) -> LocatorResult {
        match self {
            LocatorOutcome::Resolved(result) => result,
            LocatorOutcome::NeedsFallback(reason) => LocatorResult::failure(reason.to_string()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LocatorOutcome::Resolved(_))
    }
}

/// Runs every strategy against a target and ranks the survivors
pub struct LocatorEngine {
    strategies: Vec<Box<dyn Strategy>>,
    max_alternatives: usize,
}

impl Default for LocatorEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALTERNATIVES)
    }
}

impl LocatorEngine {
    pub fn new(max_alternatives: usize) -> Self {
        Self {
            strategies: default_strategies(),
            max_alternatives,
        }
    }

    /// All surviving candidates for a target, unranked
    pub fn candidates(
        &self,
        tree: &ClassifiedTree<'_>,
        target: &ClassifiedElement,
        hint: &str,
    ) -> Vec<LocatorCandidate> {
        let ctx = StrategyContext { tree, target, hint };
        self.strategies
            .iter()
            .filter_map(|s| s.generate(&ctx))
            .collect()
    }

    pub fn generate(&self, request: &LocatorRequest) -> LocatorOutcome {
        let document = match Document::parse(&request.html_content) {
            Ok(document) => document,
            Err(e) => {
                log::debug!("locator request rejected: {}", e);
                return LocatorOutcome::NeedsFallback(FallbackReason::ParseFailure(e.to_string()));
            }
        };
        let tree = classify(&document);

        let hint = normalize_text(&request.target_description);
        let Some(target) = resolve_target(&hint, request.element_type.as_deref(), &tree) else {
            return LocatorOutcome::NeedsFallback(FallbackReason::NoMatch(hint));
        };

        let candidates = self.candidates(&tree, target, &hint);
        let result = rank_with_limit(candidates, self.max_alternatives);
        if result.success {
            LocatorOutcome::Resolved(result)
        } else {
            LocatorOutcome::NeedsFallback(FallbackReason::NoMatch(hint))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::Locator;
    use crate::locator::strategy::StrategyKind;

    fn resolve(html: &str, hint: &str) -> LocatorResult {
        match LocatorEngine::default().generate(&LocatorRequest::new(html, hint)) {
            LocatorOutcome::Resolved(result) => result,
            LocatorOutcome::NeedsFallback(reason) => panic!("expected a locator: {}", reason),
        }
    }

    #[test]
    fn test_button_with_id() {
        let result = resolve(r#"<button id="submit-btn">Submit</button>"#, "Submit");
        assert!(result.success);
        assert_eq!(result.primary_locator, "//*[@id='submit-btn']");
        assert_eq!(result.confidence, 0.95);
        assert!(result
            .alternatives
            .contains(&"//button[text()='Submit']".to_string()));
        assert!(result.alternatives.contains(&"//button[1]".to_string()));
        assert!(result.reasoning.contains("Exact text (0.75)"));
        assert!(result.reasoning.contains("Positional (0.30)"));
    }

    #[test]
    fn test_shared_class_loses_to_exact_text() {
        let html = r#"<div><span class="item">A</span><span class="item">B</span></div>"#;
        let doc = Document::parse(html).unwrap();
        let tree = classify(&doc);
        let target = resolve_target("A", None, &tree).unwrap();
        let candidates = LocatorEngine::default().candidates(&tree, target, "A");
        let class_tag = candidates
            .iter()
            .find(|c| c.strategy == StrategyKind::ClassTag)
            .unwrap();
        assert!(class_tag.confidence < 0.55);

        let result = resolve(html, "A");
        assert_eq!(result.primary_locator, "//span[text()='A']");
        assert_eq!(result.confidence, 0.75);
    }

    #[test]
    fn test_hint_matches_like_target_resolution() {
        let result = resolve("<button>Log in</button>", "Log  in");
        assert_eq!(result.primary_locator, "//button[text()='Log in']");
        assert_eq!(result.confidence, 0.75);

        let result = resolve("<button>ÉCRIRE</button>", "écrire");
        assert_eq!(result.primary_locator, "//button[text()='ÉCRIRE']");
        assert_eq!(result.confidence, 0.75);
        assert!(result.reasoning.starts_with("Strategies: Exact text (0.75)"));
    }

    #[test]
    fn test_no_match_needs_fallback() {
        let outcome = LocatorEngine::default()
            .generate(&LocatorRequest::new("<div><p>Hello</p></div>", "nonexistent"));
        assert_eq!(
            outcome,
            LocatorOutcome::NeedsFallback(FallbackReason::NoMatch("nonexistent".to_string()))
        );

        let result = outcome.into_result();
        assert!(!result.success);
        assert!(result.primary_locator.is_empty());
        assert!(result.reasoning.contains("nonexistent"));
    }

    #[test]
    fn test_parse_failure_needs_fallback() {
        let outcome = LocatorEngine::default().generate(&LocatorRequest::new("", "Submit"));
        assert!(matches!(
            outcome,
            LocatorOutcome::NeedsFallback(FallbackReason::ParseFailure(_))
        ));
    }

    #[test]
    fn test_every_interactive_element_gets_positional_fallback() {
        let html = r#"
            <div><a href="/a">Alpha</a><a href="/b">Beta</a></div>
            <form><input type="text" value="Gamma"><textarea placeholder="Delta"></textarea>
            <select name="epsilon"></select></form>"#;
        let doc = Document::parse(html).unwrap();
        let tree = classify(&doc);
        let engine = LocatorEngine::default();
        for element in tree.elements(crate::classifier::Role::Interactive) {
            let candidates = engine.candidates(&tree, element, &element.display_text);
            assert!(candidates
                .iter()
                .any(|c| c.strategy == StrategyKind::Positional));
        }
    }

    #[test]
    fn test_primary_resolves_in_document() {
        let html = r#"
            <form>
              <input type="email" placeholder="Email">
              <input type="password" placeholder="Password">
              <button class="btn">Log in</button>
              <button class="btn">Cancel</button>
            </form>"#;
        let doc = Document::parse(html).unwrap();
        for hint in ["Email", "Password", "Log in", "Cancel", "log"] {
            let result = resolve(html, hint);
            let locator = Locator::parse(&result.primary_locator).unwrap();
            assert!(!doc.evaluate(&locator).is_empty(), "{}", hint);
        }
    }

    #[test]
    fn test_element_type_and_alternative_limit() {
        let html = r#"<h2>Save</h2><button id="save" name="save" class="primary" type="submit">Save</button>"#;
        let request = LocatorRequest::new(html, "Save").with_element_type("h2");
        let result = LocatorEngine::default().generate(&request).into_result();
        assert_eq!(result.primary_locator, "//h2[text()='Save']");

        let limited = LocatorEngine::new(1)
            .generate(&LocatorRequest::new(html, "Save"))
            .into_result();
        assert_eq!(limited.primary_locator, "//*[@id='save']");
        assert_eq!(limited.alternatives, vec!["//*[@name='save']"]);
    }
}
