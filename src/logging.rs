//! Diagnostic logging.
//!
//! The chat UI owns the terminal, so diagnostics only go to a file named with
//! `--log-file`. Verbosity comes from `SEWBOT_LOG` using the usual
//! `tracing-subscriber` directive syntax and defaults to `warn`.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SEWBOT_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn file_subscriber(file: File, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Installs the global subscriber when a log file was requested. Without one
/// nothing is installed and events are discarded.
pub fn init(log_file: Option<&Path>) -> Result<(), LoggingError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = open_log_file(path)?;
    let directive = std::env::var(LOG_ENV).ok();
    let subscriber = file_subscriber(file, filter_from(directive.as_deref()));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn capture(directive: Option<&str>, emit: impl FnOnce()) -> String {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("sewbot.log");
        let file = open_log_file(&path).expect("open");
        tracing::subscriber::with_default(file_subscriber(file, filter_from(directive)), emit);
        std::fs::read_to_string(&path).expect("read log")
    }

    #[test]
    fn default_filter_keeps_warnings_only() {
        let out = capture(None, || {
            tracing::info!("request sent");
            tracing::warn!("reply failed");
        });
        assert!(out.contains("reply failed"));
        assert!(!out.contains("request sent"));
        assert!(out.contains("WARN"));
    }

    #[test]
    fn directive_raises_verbosity() {
        let out = capture(Some("debug"), || tracing::debug!(fragments = 3, "stream finished"));
        assert!(out.contains("stream finished"));
        assert!(out.contains("fragments=3"));
    }

    #[test]
    fn blank_or_invalid_directive_falls_back_to_default() {
        let out = capture(Some("   "), || tracing::info!("hidden"));
        assert!(out.is_empty());
        let out = capture(Some("sewbot=loud"), || tracing::error!("shown"));
        assert!(out.contains("shown"));
    }

    #[test]
    fn log_file_is_appended_to() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("sewbot.log");
        std::fs::write(&path, "earlier\n").expect("seed");

        let file = open_log_file(&path).expect("open");
        tracing::subscriber::with_default(file_subscriber(file, filter_from(None)), || {
            tracing::error!("later")
        });

        let out = std::fs::read_to_string(&path).expect("read");
        assert!(out.starts_with("earlier\n"));
        assert!(out.contains("later"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let err = open_log_file(&dir.path().join("nope").join("x.log")).unwrap_err();
        assert!(matches!(err, LoggingError::Open { .. }));
    }

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(init(None).is_ok());
    }
}
