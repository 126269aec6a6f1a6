//! API Web Server

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::api::{self, AppState};
use crate::agent::{FallbackAgent, OpenAiAgent};
use crate::locator::LocatorEngine;
use crate::utils::Config;

/// API server configuration
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_alternatives: usize,
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_alternatives: config.max_alternatives,
        }
    }
}

/// Main API server
pub struct ApiServer {
    config: ServerConfig,
    agent: Option<Box<dyn FallbackAgent>>,
}

impl ApiServer {
    /// Create a new API server without a fallback agent
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            agent: None,
        }
    }

    /// Create a server from application config, wiring the OpenAI agent
    /// when an API key is present
    pub fn from_config(config: &Config) -> Self {
        let agent: Option<Box<dyn FallbackAgent>> = config.openai_api_key.as_ref().map(|key| {
            Box::new(OpenAiAgent::with_url(
                key.clone(),
                config.openai_model.clone(),
                config.openai_api_url.clone(),
            )) as Box<dyn FallbackAgent>
        });
        Self::new(ServerConfig::from(config)).with_agent(agent)
    }

    pub fn with_agent(mut self, agent: Option<Box<dyn FallbackAgent>>) -> Self {
        self.agent = agent;
        self
    }

    /// Build the router with CORS applied
    pub fn router(self) -> Router {
        let state = Arc::new(AppState {
            engine: LocatorEngine::new(self.config.max_alternatives),
            agent: self.agent,
        });

        Router::new()
            .merge(api::api_router())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let port = self.config.port;
        let agent_id = self.agent.as_ref().map(|a| a.id().to_string());

        let app = self.router();

        println!("\n🎯 Locator API started!");
        println!("   Open: http://localhost:{}", port);
        match agent_id {
            Some(id) => println!("   Fallback agent: {}", id),
            None => println!("   Fallback agent: disabled"),
        }
        println!("\n   Press Ctrl+C to stop.\n");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        log::info!("Listening on {}", addr);
        axum::serve(listener, app.into_make_service()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_wires_agent_only_with_key() {
        let config = Config::default();
        assert!(ApiServer::from_config(&config).agent.is_none());

        let with_key = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let server = ApiServer::from_config(&with_key);
        assert_eq!(server.agent.as_ref().map(|a| a.id()), Some("openai"));
        assert_eq!(server.config.port, 8000);
    }
}
