use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Normalization error: {0}")]
    Normalize(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
