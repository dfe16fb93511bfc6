use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything that can stop a session from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// No credential in the environment or the secrets file.
    #[error(
        "OPENAI_API_KEY is not set. Export it, or add `openai_api_key = \"...\"` to {}",
        path_display(.secrets_path)
    )]
    MissingCredential { secrets_path: PathBuf },

    #[error("Failed to read {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine a configuration directory; pass --config-dir")]
    NoConfigDir,
}

/// Platform configuration directory, e.g. `~/.config/sewbot` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigurationError> {
    ProjectDirs::from("org", "sewbot", "sewbot")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigurationError::NoConfigDir)
}

/// Reads a TOML file, treating a missing file as the type's default.
pub(crate) fn load_toml_or_default<T>(path: &Path) -> Result<T, ConfigurationError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigurationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Shortens paths under `$HOME` to `~/...` for messages.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            if let Ok(relative) = path.strip_prefix(PathBuf::from(home)) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
