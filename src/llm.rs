use crate::config::{AgentConfig, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Options for one completion call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    /// Ask the model for a single JSON object
    pub json_mode: bool,
}

impl CompletionOptions {
    pub fn text(temperature: f32) -> Self {
        Self { temperature, json_mode: false }
    }

    pub fn json(temperature: f32) -> Self {
        Self { temperature, json_mode: true }
    }
}

/// Most inputs sent in one embeddings request
pub const EMBED_BATCH_SIZE: usize = 1000;

/// A chat model that turns a prompt into text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
}

/// Text embedding backend
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-compatible client for chat completions and embeddings
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config)?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn ensure_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AgentError::Llm("OPENAI_API_KEY is not set".to_string()));
        }
        Ok(())
    }
}

/// Shared reqwest client honoring the configured timeout.
pub fn http_client(config: &AgentConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        self.ensure_key()?;

        let messages = [ChatMessage { role: "user", content: prompt }];
        let mut body = serde_json::json!({
            "model": self.chat_model,
            "messages": messages,
            "temperature": options.temperature,
        });
        if options.json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        debug!("Calling {} (json_mode={})", self.chat_model, options.json_mode);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        if !status.is_success() {
            let message = response_json["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(AgentError::Llm(format!("LLM API returned {}: {}", status, message)));
        }

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AgentError::Llm("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_key()?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            embeddings.extend(self.embed_batch(batch).await?);
        }
        Ok(embeddings)
    }
}

impl LlmClient {
    /// One embeddings request; `texts` must not exceed [`EMBED_BATCH_SIZE`].
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding batch of {} inputs", texts.len());
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("Embedding API call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::Llm(format!(
                "Embedding API returned {}",
                response.status()
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Failed to parse embedding response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(AgentError::Llm(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}
