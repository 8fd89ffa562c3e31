//! Agent configuration
//!
//! Values come from the environment (a `.env` file is loaded by the binaries
//! through `dotenv`); command-line flags override them.

use crate::error::{AgentError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_UPLOAD_DIR: &str = "temp_files";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_UPLOAD_BODY_LIMIT_MB: usize = 50;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    /// Timeout for every outbound HTTP call; `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    /// Uploaded files older than this are removed; `None` keeps them forever.
    pub upload_ttl: Option<Duration>,
    pub upload_body_limit_bytes: usize,
    /// Chunking and retrieval for document questions
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_top_k: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            tavily_api_key: None,
            tavily_base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            http_timeout: Some(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            upload_ttl: None,
            upload_body_limit_bytes: DEFAULT_UPLOAD_BODY_LIMIT_MB * 1024 * 1024,
            chunk_size: 1500,
            chunk_overlap: 200,
            retrieval_top_k: 4,
        }
    }
}

impl AgentConfig {
    /// Read configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AgentConfig::from_env`] with an explicit lookup, so tests
    /// don't touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match parse_number::<u64>("HTTP_TIMEOUT_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.http_timeout,
        };

        let upload_ttl = match get("UPLOAD_TTL_SECS") {
            Some(raw) => match parse_number::<u64>("UPLOAD_TTL_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let upload_body_limit_bytes = match get("UPLOAD_BODY_LIMIT_MB") {
            Some(raw) => parse_number::<usize>("UPLOAD_BODY_LIMIT_MB", &raw)? * 1024 * 1024,
            None => defaults.upload_body_limit_bytes,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            chat_model: get("OPENAI_MODEL").unwrap_or(defaults.chat_model),
            embedding_model: get("OPENAI_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            tavily_api_key: get("TAVILY_API_KEY"),
            tavily_base_url: get("TAVILY_BASE_URL").unwrap_or(defaults.tavily_base_url),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            allowed_origins,
            http_timeout,
            upload_ttl,
            upload_body_limit_bytes,
            ..defaults
        })
    }

    pub fn has_openai_key(&self) -> bool {
        !self.openai_api_key.is_empty()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| AgentError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
