//! FPL Assistant — Fantasy Premier League chat assistant.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the FPL client, model, and storage, and serves the web API
//! with graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use fpl_assistant::api::{FplApi, ResponseCache};
use fpl_assistant::chat::Assistant;
use fpl_assistant::config::AppConfig;
use fpl_assistant::llm;
use fpl_assistant::rules::RulesIndex;
use fpl_assistant::server::{self, ServerState};
use fpl_assistant::storage::UserStore;

const BANNER: &str = r#"
 _____ ____  _       _            _     _              _
|  ___|  _ \| |     / \   ___ ___(_)___| |_ __ _ _ __ | |_
| |_  | |_) | |    / _ \ / __/ __| / __| __/ _` | '_ \| __|
|  _| |  __/| |___/ ___ \\__ \__ \ \__ \ || (_| | | | | |_
|_|   |_|   |_____/_/   \_\___/___/_|___/\__\__,_|_| |_|\__|

  Fantasy Premier League Chat Assistant
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        api_base = %cfg.fpl.api_base,
        provider = %cfg.llm.provider,
        model = %cfg.llm.model,
        "FPL Assistant starting up"
    );

    // -- Initialise components -------------------------------------------

    let cache = Arc::new(ResponseCache::new(Duration::from_secs(cfg.fpl.cache_ttl_secs)));
    let api = FplApi::new(cfg.fpl.api_base.clone(), cache)?;
    let model = llm::build_model(&cfg.llm)?;
    let rules = RulesIndex::new();
    let store = UserStore::new(&cfg.storage.data_dir);

    // Snapshot the rulebook so it's inspectable alongside user data.
    store.export_rules(&rules)?;

    let assistant = Assistant::new(api.clone(), model, rules.clone());

    let state = Arc::new(ServerState { api, assistant, rules, store });

    server::serve(state, cfg.server.port).await
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fpl_assistant=info"));

    let json_logging = std::env::var("FPL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
