//! Data Agent
//!
//! Routes a question to the general, structured or unstructured handler based
//! on the attached file, and turns every handler failure into a fixed
//! fallback answer so a caller always gets the four-field response.

pub mod dispatch;
mod general;
mod structured;
mod unstructured;

pub use dispatch::{FileKind, Route};
pub use structured::UNREADABLE_SPREADSHEET;

use crate::config::AgentConfig;
use crate::document::{DocumentParser, TextChunker};
use crate::error::{AgentError, Result};
use crate::llm::{Embedder, LanguageModel, LlmClient};
use crate::response::AnswerResponse;
use crate::search::{TavilyClient, WebSearch};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub const GENERAL_FALLBACK: &str = "Sorry, I encountered an error while trying to answer your question.";
pub const DOCUMENT_FALLBACK: &str = "Error analyzing the document.";
pub const UNSUPPORTED_FILE: &str = "Unsupported file type.";

pub struct Agent {
    llm: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn WebSearch>,
    parser: DocumentParser,
    chunker: TextChunker,
    top_k: usize,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        let defaults = AgentConfig::default();
        Self {
            llm,
            embedder,
            search,
            parser: DocumentParser::new(),
            chunker: TextChunker::new(defaults.chunk_size, defaults.chunk_overlap),
            top_k: defaults.retrieval_top_k,
        }
    }

    /// Agent backed by the OpenAI-compatible API and Tavily search.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let llm = Arc::new(LlmClient::from_config(config)?);
        let search = Arc::new(TavilyClient::from_config(config)?);
        Ok(Self::new(llm.clone(), llm, search).with_retrieval(
            config.chunk_size,
            config.chunk_overlap,
            config.retrieval_top_k,
        ))
    }

    pub fn with_retrieval(mut self, chunk_size: usize, chunk_overlap: usize, top_k: usize) -> Self {
        self.chunker = TextChunker::new(chunk_size, chunk_overlap);
        self.top_k = top_k.max(1);
        self
    }

    /// Answer a question, optionally about a file. Never fails.
    pub async fn answer(&self, question: &str, file: Option<&Path>) -> AnswerResponse {
        let route = Route::for_file(file);
        let handler = route.name();
        info!("Routing question to {} handler", handler);

        match route {
            Route::General => self
                .answer_general(question)
                .await
                .unwrap_or_else(|e| fallback(handler, &e, GENERAL_FALLBACK.to_string())),
            Route::Tabular(path, format) => self
                .answer_structured(question, path, format)
                .await
                .unwrap_or_else(|e| fallback(handler, &e, format!("An error occurred: {}", e))),
            Route::Document(path, format) => self
                .answer_unstructured(question, path, format)
                .await
                .unwrap_or_else(|e| fallback(handler, &e, DOCUMENT_FALLBACK.to_string())),
            Route::Unsupported => AnswerResponse::text(UNSUPPORTED_FILE),
        }
    }
}

fn fallback(handler: &str, err: &AgentError, summary: String) -> AnswerResponse {
    error!("{} handler failed: {}", handler, err);
    AnswerResponse::text(summary)
}
