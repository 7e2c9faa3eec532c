mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads `.env`, the YAML config file and environment overrides, then validates.
pub async fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        // Normal outside development
        Err(e) if e.not_found() => {}
        Err(e) => return Err(Error::config(format!("Failed to load .env: {}", e))),
    }

    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => Config::from_yaml(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit_path.is_none() => {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.apply_env(|key| env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

impl Config {
    pub fn from_yaml(config_str: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(config_str)?)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GROQ_API_KEY").or_else(|| lookup("groq_api_key")) {
            self.llm.api_key = key;
        }

        if let Some(base_url) = lookup("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("Invalid PORT value: '{}'", port)))?;
        }

        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::config(
                "Groq API key not found. Set GROQ_API_KEY in the environment or .env file.",
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be greater than zero"));
        }

        Ok(())
    }
}
