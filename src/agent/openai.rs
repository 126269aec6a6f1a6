//! OpenAI-compatible chat completions agent

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AgentError, FallbackAgent};
use crate::locator::{FallbackReason, LocatorRequest, LocatorResult};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Upper bound on HTML sent in a prompt
const MAX_HTML_CHARS: usize = 20_000;

const SYSTEM_PROMPT: &str = "You generate XPath locators for UI test automation. \
Answer with a JSON object: {\"xpath\": string, \"confidence\": number between 0 and 1, \
\"alternatives\": [string], \"reasoning\": string}. Prefer id, name and exact text \
locators over positional ones.";

pub struct OpenAiAgent {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Shape the model is asked to answer with
#[derive(Debug, Deserialize)]
struct AgentAnswer {
    xpath: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    alternatives: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

impl OpenAiAgent {
    pub fn with_url(api_key: String, model: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn prompt(request: &LocatorRequest, reason: &FallbackReason) -> String {
        let html: String = request.html_content.chars().take(MAX_HTML_CHARS).collect();
        let mut prompt = format!(
            "Target element: {}\nDeterministic engine result: {}\n",
            request.target_description, reason
        );
        if let Some(element_type) = &request.element_type {
            prompt.push_str(&format!("Element type: {}\n", element_type));
        }
        if let Some(context) = &request.additional_context {
            prompt.push_str(&format!("Context: {}\n", context));
        }
        prompt.push_str(&format!("HTML:\n{}", html));
        prompt
    }
}

/// Turn the model's message content into a `LocatorResult`
fn parse_answer(content: &str) -> Result<LocatorResult, AgentError> {
    let answer: AgentAnswer =
        serde_json::from_str(content).map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
    if answer.xpath.trim().is_empty() {
        return Err(AgentError::InvalidResponse("empty xpath".to_string()));
    }
    Ok(LocatorResult {
        primary_locator: answer.xpath,
        confidence: answer.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        alternatives: answer.alternatives,
        reasoning: format!("AI agent: {}", answer.reasoning),
        success: true,
    })
}

#[async_trait]
impl FallbackAgent for OpenAiAgent {
    fn id(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        request: &LocatorRequest,
        reason: &FallbackReason,
    ) -> Result<LocatorResult, AgentError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::prompt(request, reason),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::Api { status, message });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::InvalidResponse("no choices returned".to_string()))?;

        parse_answer(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let result = parse_answer(
            r#"{"xpath": "//button[@data-test='buy']", "confidence": 1.4, "alternatives": ["//button[1]"], "reasoning": "data attribute"}"#,
        )
        .unwrap();
        assert_eq!(result.primary_locator, "//button[@data-test='buy']");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.alternatives, vec!["//button[1]"]);
        assert!(result.success);
    }

    #[test]
    fn test_parse_answer_rejects_garbage() {
        assert!(parse_answer("not json").is_err());
        assert!(parse_answer(r#"{"xpath": "  "}"#).is_err());
    }

    #[test]
    fn test_prompt_includes_request_details() {
        let request = LocatorRequest::new("<div></div>", "Buy now").with_element_type("button");
        let prompt = OpenAiAgent::prompt(&request, &FallbackReason::NoMatch("Buy now".into()));
        assert!(prompt.contains("Target element: Buy now"));
        assert!(prompt.contains("Element type: button"));
        assert!(prompt.ends_with("<div></div>"));
    }
}
