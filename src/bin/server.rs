//! HTTP server for the data agent

use anyhow::Result;
use clap::Parser;
use data_agent::server::{start_server, AppState};
use data_agent::uploads::UploadStore;
use data_agent::{Agent, AgentConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Data agent HTTP API")]
struct Args {
    /// Address to listen on (or set BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Directory for uploaded files (or set UPLOAD_DIR)
    #[arg(long)]
    upload_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AgentConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.upload_dir {
        config.upload_dir = dir;
    }

    if config.has_openai_key() {
        info!("OpenAI API key found");
    } else {
        warn!("OPENAI_API_KEY not set - every answer will be a fallback");
    }

    let uploads = UploadStore::new(&config.upload_dir)?;
    if let Some(ttl) = config.upload_ttl {
        info!("Removing uploads older than {:?}", ttl);
        uploads.clone().spawn_sweeper(ttl);
    }

    let state = AppState {
        agent: Arc::new(Agent::from_config(&config)?),
        uploads: Arc::new(uploads),
    };

    start_server(state, &config).await
}
