//! Web search for general questions (Tavily API)

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::llm::http_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Results fed into the general-question prompt
pub const MAX_SEARCH_RESULTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub content: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilyClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl TavilyClient {
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            api_key: config.tavily_api_key.clone(),
            base_url: config.tavily_base_url.trim_end_matches('/').to_string(),
            max_results: MAX_SEARCH_RESULTS,
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Search("TAVILY_API_KEY is not set".to_string()))?;

        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
        });

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Search(format!("Search API call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::Search(format!("Search API returned {}", response.status())));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Search(format!("Failed to parse search response: {}", e)))?;

        debug!("Search returned {} results", parsed.results.len());
        Ok(parsed
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchHit { url: r.url, content: r.content })
            .collect())
    }
}

/// Render hits the way they are shown to the model: a JSON list of
/// `{url, content}` objects.
pub fn format_hits(hits: &[SearchHit]) -> String {
    serde_json::to_string_pretty(hits).unwrap_or_else(|_| "[]".to_string())
}
