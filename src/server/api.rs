//! REST API endpoints
//!
//! Provides endpoints for locator generation, structure analysis and
//! scenario synthesis.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::agent::FallbackAgent;
use crate::classifier::{classify, StructureAnalysis};
use crate::html::Document;
use crate::locator::{FallbackReason, LocatorEngine, LocatorOutcome, LocatorRequest};
use crate::scenario::{synthesize, ScenarioSuite};

/// Shared state for API handlers
pub struct AppState {
    pub engine: LocatorEngine,
    pub agent: Option<Box<dyn FallbackAgent>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub components: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub analysis: StructureAnalysis,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

fn error(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Build API router
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/generate-xpath", post(generate_xpath))
        .route("/analyze-html", post(analyze_html))
        .route("/generate-test-scenarios", post(generate_test_scenarios))
}

/// GET /health - Component status
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut components = BTreeMap::new();
    components.insert("api_server", "running");
    components.insert("html_parser", "available");
    components.insert("locator_engine", "ready");
    components.insert(
        "xpath_agent",
        if state.agent.is_some() {
            "ready"
        } else {
            "fallback mode"
        },
    );

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components,
    })
}

/// POST /generate-xpath - Deterministic locators, AI agent on fallback
async fn generate_xpath(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocatorRequest>,
) -> Response {
    let reason = match state.engine.generate(&request) {
        LocatorOutcome::Resolved(result) => return Json(result).into_response(),
        LocatorOutcome::NeedsFallback(reason) => reason,
    };

    if let Some(agent) = &state.agent {
        log::info!("Deterministic engine deferred ({}), asking {}", reason, agent.id());
        return match agent.generate(&request, &reason).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => {
                log::warn!("Agent {} failed: {}", agent.id(), e);
                error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Agent error: {}", e),
                )
            }
        };
    }

    match reason {
        FallbackReason::ParseFailure(_) => {
            error(StatusCode::UNPROCESSABLE_ENTITY, reason.to_string())
        }
        FallbackReason::NoMatch(_) => {
            Json(LocatorOutcome::NeedsFallback(reason).into_result()).into_response()
        }
    }
}

/// POST /analyze-html - Structure summary grouped by role
async fn analyze_html(Json(request): Json<LocatorRequest>) -> Response {
    match Document::parse(&request.html_content) {
        Ok(document) => Json(AnalysisResponse {
            success: true,
            analysis: classify(&document).analyze(),
        })
        .into_response(),
        Err(e) => error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("HTML analysis error: {}", e),
        ),
    }
}

/// POST /generate-test-scenarios - One scenario per button, input and link
async fn generate_test_scenarios(Json(request): Json<LocatorRequest>) -> Response {
    match Document::parse(&request.html_content) {
        Ok(document) => {
            let suite = ScenarioSuite::new(synthesize(&classify(&document)));
            Json(suite).into_response()
        }
        Err(e) => error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Test scenario generation error: {}", e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentError;
    use crate::locator::LocatorResult;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct StubAgent;

    #[async_trait]
    impl FallbackAgent for StubAgent {
        fn id(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            _request: &LocatorRequest,
            reason: &FallbackReason,
        ) -> Result<LocatorResult, AgentError> {
            match reason {
                FallbackReason::NoMatch(_) => Ok(LocatorResult {
                    primary_locator: "//div[@data-agent='1']".to_string(),
                    confidence: 0.4,
                    alternatives: Vec::new(),
                    reasoning: "stub".to_string(),
                    success: true,
                }),
                FallbackReason::ParseFailure(_) => {
                    Err(AgentError::InvalidResponse("cannot read input".to_string()))
                }
            }
        }
    }

    fn router(agent: Option<Box<dyn FallbackAgent>>) -> Router {
        let state = Arc::new(AppState {
            engine: LocatorEngine::default(),
            agent,
        });
        api_router().with_state(state)
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generate_xpath() {
        let (status, body) = post_json(
            router(None),
            "/generate-xpath",
            serde_json::json!({
                "html_content": "<button id=\"submit-btn\">Submit</button>",
                "target_description": "Submit"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["primary_locator"], "//*[@id='submit-btn']");
        assert_eq!(body["confidence"], 0.95);
    }

    #[tokio::test]
    async fn test_no_match_without_agent_is_reported() {
        let (status, body) = post_json(
            router(None),
            "/generate-xpath",
            serde_json::json!({
                "html_content": "<p>Hello</p>",
                "target_description": "nonexistent"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["primary_locator"], "");
    }

    #[tokio::test]
    async fn test_no_match_uses_agent() {
        let (status, body) = post_json(
            router(Some(Box::new(StubAgent))),
            "/generate-xpath",
            serde_json::json!({
                "html_content": "<p>Hello</p>",
                "target_description": "nonexistent"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary_locator"], "//div[@data-agent='1']");
    }

    #[tokio::test]
    async fn test_agent_error_is_server_error() {
        let (status, body) = post_json(
            router(Some(Box::new(StubAgent))),
            "/generate-xpath",
            serde_json::json!({ "html_content": "", "target_description": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().starts_with("Agent error"));
    }

    #[tokio::test]
    async fn test_parse_failure_without_agent() {
        let (status, _) = post_json(
            router(None),
            "/generate-xpath",
            serde_json::json!({ "html_content": "  ", "target_description": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_analyze_html() {
        let (status, body) = post_json(
            router(None),
            "/analyze-html",
            serde_json::json!({
                "html_content": "<form><input name=\"q\"><button>Go</button></form>",
                "target_description": ""
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"]["interactive_elements"].as_array().unwrap().len(), 2);
        assert_eq!(body["analysis"]["forms"], 1);
    }

    #[tokio::test]
    async fn test_generate_test_scenarios() {
        let (status, body) = post_json(
            router(None),
            "/generate-test-scenarios",
            serde_json::json!({
                "html_content": "<a href=\"/\">Home</a><button id=\"b\">Buy</button>",
                "target_description": ""
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_scenarios"], 2);
        assert_eq!(body["scenarios"][1]["priority"], "high");
        assert_eq!(body["scenarios"][0]["id"], "scenario_1");
    }

    #[tokio::test]
    async fn test_health_reports_agent_mode() {
        let response = router(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["components"]["xpath_agent"], "fallback mode");
    }
}
