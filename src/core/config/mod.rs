//! Startup configuration: optional `config.toml`, the API credential, and
//! command-line/environment overrides.

pub mod io;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use io::{default_config_dir, path_display, ConfigurationError};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const CONFIG_FILE: &str = "config.toml";
pub const SECRETS_FILE: &str = "secrets.toml";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model identifier sent with each request
    pub model: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: Option<String>,
}

/// Contents of `secrets.toml`, kept apart from `config.toml` so the
/// credential never lands in a file that gets shared.
#[derive(Debug, Deserialize, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
}

/// Values supplied on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_dir: Option<PathBuf>,
    pub model: Option<String>,
}

/// Fully resolved settings for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigurationError> {
        io::load_toml_or_default(&dir.join(CONFIG_FILE))
    }
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigurationError> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    /// Credential order: environment, then `secrets.toml`. Blank values count
    /// as missing.
    pub fn resolve_with<F>(overrides: &Overrides, env: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = match &overrides.config_dir {
            Some(dir) => dir.clone(),
            None => default_config_dir()?,
        };
        let config = Config::load_from_dir(&dir)?;

        let api_key = match non_blank(env(API_KEY_ENV)) {
            Some(key) => key,
            None => {
                let secrets_path = dir.join(SECRETS_FILE);
                let secrets: Secrets = io::load_toml_or_default(&secrets_path)?;
                non_blank(secrets.openai_api_key)
                    .ok_or(ConfigurationError::MissingCredential { secrets_path })?
            }
        };

        let model = non_blank(overrides.model.clone())
            .or_else(|| non_blank(config.model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_blank(env(BASE_URL_ENV))
            .or_else(|| non_blank(config.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            model,
            base_url,
            api_key,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
