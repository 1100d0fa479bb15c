//! Service configuration. Precedence: defaults < TOML file < `CIVIC_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::model_client::{ChatCompletionsClient, DEFAULT_API_URL, DEFAULT_MODEL};

/// Placeholder key shipped in sample `.env` files; treated the same as no key.
pub const DEMO_API_KEY: &str = "demo_key_for_testing";
pub const DEFAULT_ORGANIZATION: &str = "김포도시관리공사";
const DEFAULT_CONFIG_PATH: &str = "config/civic.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Receiving organization named in prompts, templates and documents.
    pub organization: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    /// Optional TOML file extending the built-in facility table.
    #[serde(default)]
    pub facilities_path: Option<PathBuf>,
    /// Optional TTF/OTF with Hangul glyphs for generated documents.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    pub cors_permissive: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            llm_api_key: None,
            llm_api_url: DEFAULT_API_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 60,
            llm_max_attempts: 1,
            facilities_path: None,
            font_path: None,
            cors_permissive: true,
        }
    }
}

impl ServiceConfig {
    /// Load from `CIVIC_CONFIG` (default `config/civic.toml`, optional) and `CIVIC_*` env vars.
    /// Without a configured key, `OPENROUTER_API_KEY` is used.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("CIVIC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::from_sources(Some(Path::new(&path)), civic_environment())?;
        if cfg.api_key().is_none() {
            if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
                cfg.llm_api_key = Some(key);
            }
        }
        Ok(cfg)
    }

    fn from_sources(
        path: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", d.bind_addr)?
            .set_default("organization", d.organization)?
            .set_default("llm_api_url", d.llm_api_url)?
            .set_default("llm_model", d.llm_model)?
            .set_default("llm_timeout_secs", d.llm_timeout_secs as i64)?
            .set_default("llm_max_attempts", i64::from(d.llm_max_attempts))?
            .set_default("cors_permissive", d.cors_permissive)?;

        let builder = match path {
            Some(p) if p.exists() => builder.add_source(config::File::from(p)),
            _ => builder,
        };

        builder.add_source(env).build()?.try_deserialize()
    }

    /// Usable credential, if any. Blank and the demo placeholder mean demo mode.
    pub fn api_key(&self) -> Option<&str> {
        self.llm_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != DEMO_API_KEY)
    }

    pub fn is_live(&self) -> bool {
        self.api_key().is_some()
    }

    /// Model client for live mode; `None` routes every request through the templates.
    pub fn model_client(&self) -> Option<ChatCompletionsClient> {
        let key = self.api_key()?;
        Some(
            ChatCompletionsClient::new(key, Duration::from_secs(self.llm_timeout_secs.max(1)))
                .with_api_url(&self.llm_api_url)
                .with_model(&self.llm_model)
                .with_max_attempts(self.llm_max_attempts),
        )
    }
}

fn civic_environment() -> config::Environment {
    config::Environment::with_prefix("CIVIC")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        civic_environment().source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let cfg = ServiceConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:5000");
        assert_eq!(cfg.organization, DEFAULT_ORGANIZATION);
        assert_eq!(cfg.llm_timeout_secs, 60);
        assert_eq!(cfg.llm_max_attempts, 1);
        assert!(cfg.cors_permissive);
        assert!(!cfg.is_live());
        assert!(cfg.model_client().is_none());
    }

    #[test]
    fn file_then_env_override() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            "organization = \"김포시청\"\nllm_timeout_secs = 30\nfacilities_path = \"data/facilities.toml\""
        )
        .unwrap();
        let cfg = ServiceConfig::from_sources(
            Some(f.path()),
            env(&[("CIVIC_LLM_TIMEOUT_SECS", "15"), ("CIVIC_LLM_API_KEY", "sk-test")]),
        )
        .unwrap();
        assert_eq!(cfg.organization, "김포시청");
        assert_eq!(cfg.llm_timeout_secs, 15);
        assert_eq!(cfg.facilities_path, Some(PathBuf::from("data/facilities.toml")));
        assert_eq!(cfg.api_key(), Some("sk-test"));
        assert!(cfg.is_live());
    }

    #[test]
    fn demo_placeholder_is_not_a_key() {
        let cfg = ServiceConfig {
            llm_api_key: Some(DEMO_API_KEY.to_string()),
            ..Default::default()
        };
        assert!(!cfg.is_live());
        let cfg = ServiceConfig {
            llm_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!cfg.is_live());
    }

    #[test]
    fn model_client_follows_config() {
        let cfg = ServiceConfig {
            llm_api_key: Some("sk-test".to_string()),
            llm_model: "openai/gpt-4o-mini".to_string(),
            llm_max_attempts: 9,
            ..Default::default()
        };
        let client = cfg.model_client().unwrap();
        assert_eq!(client.model(), "openai/gpt-4o-mini");
        assert_eq!(client.max_attempts(), 2);
    }
}
