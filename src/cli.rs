//! Command-line settings shared by both binaries.

use crate::bot::ForestBot;
use crate::config::{Config, ModelSettings};
use crate::error::Result;
use crate::sessions::{SessionStore, DEFAULT_MAX_SESSIONS};
use crate::vendors::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::vendors::{CannedModel, GeminiClient, TextModel};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Args)]
pub struct BotArgs {
    /// Character override file (JSON merged over the built-in bear)
    #[arg(long, env = "ECOBEAR_CHARACTER")]
    pub character: Option<PathBuf>,

    /// Gemini model name
    #[arg(long, env = "ECOBEAR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "ECOBEAR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// File holding the API key
    #[arg(long, default_value = "API.env")]
    pub env_file: PathBuf,

    /// Environment variable holding the API key
    #[arg(long, default_value = "GEMINI_API_KEY")]
    pub api_key_env: String,

    /// Model request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,

    /// Answer with canned lines instead of calling the model
    #[arg(long)]
    pub offline: bool,

    /// Seed for reproducible bear behaviour
    #[arg(long)]
    pub seed: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl BotArgs {
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key_env: self.api_key_env.clone(),
            env_file: self.env_file.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Load the character and connect the model backend
    pub fn build_bot(&self) -> Result<ForestBot> {
        let config = Arc::new(Config::load(self.character.as_deref())?);

        let model: Arc<dyn TextModel> = if self.offline {
            let replies = config.core_personality.default_states.happy_mode.replies();
            Arc::new(CannedModel::new(replies))
        } else {
            Arc::new(GeminiClient::from_settings(&self.model_settings())?)
        };
        info!(model = model.name(), offline = self.offline, "bot ready");

        let mut sessions = SessionStore::new(config, self.max_sessions);
        if let Some(seed) = self.seed {
            sessions = sessions.with_seed(seed);
        }
        Ok(ForestBot::with_sessions(sessions, model))
    }
}

/// Log to stderr; `RUST_LOG` wins over `default_filter`
pub fn init_tracing(verbose: bool, default_filter: &str) {
    let fallback = if verbose {
        "ecobear=debug,tower_http=debug"
    } else {
        default_filter
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
