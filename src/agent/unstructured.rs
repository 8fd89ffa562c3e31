//! Document questions: retrieve the relevant passages, then ask for a JSON
//! analysis grounded in them.

use super::Agent;
use crate::document::retriever::join_context;
use crate::document::{DocumentFormat, Retriever};
use crate::error::Result;
use crate::llm::{CompletionOptions, LanguageModel};
use crate::prompts::unstructured_prompt;
use crate::response::AnswerResponse;
use std::path::Path;
use tracing::info;

const TEMPERATURE: f32 = 0.3;

impl Agent {
    pub(crate) async fn answer_unstructured(
        &self,
        question: &str,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<AnswerResponse> {
        info!("--- Handling Unstructured Data Question ({:?}) ---", format);

        let parser = self.parser;
        let path = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || parser.parse(&path, format)).await??;
        let retriever = Retriever::build(&text, &self.chunker, self.embedder.as_ref()).await?;
        let chunks = retriever
            .retrieve(question, self.embedder.as_ref(), self.top_k)
            .await?;
        info!("Retrieved {} of {} chunks", chunks.len(), retriever.len());

        let prompt = unstructured_prompt(&join_context(&chunks), question);
        let raw = self
            .llm
            .complete(&prompt, CompletionOptions::json(TEMPERATURE))
            .await?;

        AnswerResponse::from_model_json(&raw)
    }
}
