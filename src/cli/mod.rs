//! Command-line interface parsing and handling
//!
//! Resolves settings before the terminal is touched so configuration problems
//! are reported on plain stderr.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{Overrides, Settings};
use crate::ui::chat_loop::run_chat;

#[derive(Parser, Debug)]
#[command(name = "sewbot")]
#[command(version)]
#[command(about = "A terminal sewing-project assistant backed by the OpenAI chat API")]
#[command(
    long_about = "Sewbot is a full-screen terminal chat that suggests sewing projects, \
materials, and techniques. Replies stream in as they are generated, and the system \
prompt that steers the assistant can be edited and applied without restarting.\n\n\
Credentials:\n\
  OPENAI_API_KEY    Your OpenAI API key (or `openai_api_key` in secrets.toml)\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\n\
Configuration files live in the platform config directory (or --config-dir):\n\
  config.toml       `model` and `base_url`\n\
  secrets.toml      `openai_api_key`\n\n\
Controls:\n\
  Enter             Send the message\n\
  Tab               Switch between the message line and the prompt editor\n\
  Ctrl+S            Apply the edited system prompt\n\
  Ctrl+R            Reset the system prompt to the default\n\
  PageUp/PageDown   Scroll the conversation\n\
  Ctrl+Home/End     Jump to the oldest or newest message\n\
  Ctrl+C            Quit\n\n\
Logging:\n\
  --log-file PATH   Write diagnostics to PATH; SEWBOT_LOG sets the filter (default: warn)"
)]
pub struct Args {
    /// Model to request completions from
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory holding config.toml and secrets.toml
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Append diagnostic logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_dir: self.config_dir.clone(),
            model: self.model.clone(),
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Err(e) = crate::logging::init(args.log_file.as_deref()) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }

    let settings = match Settings::resolve(&args.overrides()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?settings, "resolved settings");

    run_chat(settings).await
}
