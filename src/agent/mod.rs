//! AI fallback boundary
//!
//! Consulted only when the deterministic engine returns `NeedsFallback`.
//! Nothing in the core depends on this module.

pub mod openai;

use async_trait::async_trait;

use crate::locator::{FallbackReason, LocatorRequest, LocatorResult};

pub use openai::OpenAiAgent;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait FallbackAgent: Send + Sync {
    /// Short identifier used in logs and health output
    fn id(&self) -> &str;

    async fn generate(
        &self,
        request: &LocatorRequest,
        reason: &FallbackReason,
    ) -> Result<LocatorResult, AgentError>;
}
