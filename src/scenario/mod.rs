//! Test scenario synthesis
//!
//! One scenario per interactive `button`, `input` or `a`, in document order.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classifier::{ClassifiedTree, Role};

const SCENARIO_TAGS: [&str; 3] = ["button", "input", "a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub priority: Priority,
}

impl Scenario {
    fn for_element(index: usize, label: &str, priority: Priority) -> Self {
        Self {
            id: format!("scenario_{}", index),
            name: format!("Test {} functionality", label),
            description: format!("Verify {} works correctly", label),
            steps: vec![
                "Navigate to the page".to_string(),
                format!("Locate {} element", label),
                format!("Interact with {}", label),
                "Verify expected behavior".to_string(),
            ],
            expected_result: format!("{} should work as expected", label),
            priority,
        }
    }
}

pub fn synthesize(tree: &ClassifiedTree<'_>) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for element in tree.elements(Role::Interactive) {
        let node = tree.node(element);
        if !SCENARIO_TAGS.contains(&node.tag.as_str()) {
            continue;
        }
        let label = if element.display_text.is_empty() {
            node.tag.as_str()
        } else {
            element.display_text.as_str()
        };
        let priority = if node.attr("id").is_some() {
            Priority::High
        } else {
            Priority::Medium
        };
        scenarios.push(Scenario::for_element(scenarios.len() + 1, label, priority));
    }
    log::debug!("synthesized {} scenarios", scenarios.len());
    scenarios
}

/// Serialized scenario list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSuite {
    pub success: bool,
    pub scenarios: Vec<Scenario>,
    pub total_scenarios: usize,
}

impl ScenarioSuite {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self {
            success: true,
            total_scenarios: scenarios.len(),
            scenarios,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the suite as `json` or `yaml`, or print it when no path is given
    pub fn export(&self, format: &str, output: Option<&Path>) -> Result<()> {
        let rendered = match format {
            "json" => self.to_json()?,
            "yaml" | "yml" => self.to_yaml()?,
            _ => anyhow::bail!("Unknown format: {}", format),
        };

        if let Some(path) = output {
            std::fs::write(path, rendered)?;
            println!("Scenarios saved to: {}", path.display());
        } else {
            println!("{}", rendered);
        }
        Ok(())
    }
}
