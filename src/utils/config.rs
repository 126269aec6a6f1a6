use anyhow::{Context, Result};

use crate::agent::openai::DEFAULT_API_URL;
use crate::locator::DEFAULT_MAX_ALTERNATIVES;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address the API server binds to
    pub host: String,

    pub port: u16,

    /// Alternatives returned next to the primary locator
    pub max_alternatives: usize,

    /// Enables the AI fallback agent when set
    pub openai_api_key: Option<String>,

    pub openai_model: String,

    pub openai_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment (after loading `.env`)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("LUMI_HOST") {
            config.host = host;
        }
        if let Some(port) = get("LUMI_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid LUMI_PORT: {}", port))?;
        }
        if let Some(max) = get("LUMI_MAX_ALTERNATIVES") {
            config.max_alternatives = max
                .trim()
                .parse()
                .with_context(|| format!("Invalid LUMI_MAX_ALTERNATIVES: {}", max))?;
        }
        config.openai_api_key = get("OPENAI_API_KEY");
        if let Some(model) = get("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(url) = get("OPENAI_API_URL") {
            config.openai_api_url = url;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_alternatives, 4);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("LUMI_PORT", "9333"),
            ("LUMI_MAX_ALTERNATIVES", "2"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", " "),
        ]))
        .unwrap();
        assert_eq!(config.port, 9333);
        assert_eq!(config.max_alternatives, 2);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::from_lookup(lookup(&[("LUMI_PORT", "http")])).is_err());
    }
}
