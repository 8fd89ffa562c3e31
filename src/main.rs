use anyhow::Result;
use clap::Parser;
use data_agent::{Agent, AgentConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "data-agent")]
#[command(about = "Answer a question, optionally about a spreadsheet or document")]
struct Args {
    /// The question in natural language
    question: String,

    /// Spreadsheet (.csv, .xls, .xlsx) or document (.pdf, .docx) to ask about
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AgentConfig::from_env()?;
    if let Some(api_key) = args.api_key {
        config.openai_api_key = api_key;
    }

    info!("Question: {}", args.question);
    let agent = Agent::from_config(&config)?;
    let answer = agent.answer(&args.question, args.file.as_deref()).await;

    println!("{}", serde_json::to_string_pretty(&answer)?);

    Ok(())
}
