//! General questions: web search, then a plain-text completion.

use super::Agent;
use crate::error::Result;
use crate::llm::{CompletionOptions, LanguageModel};
use crate::prompts::general_prompt;
use crate::response::AnswerResponse;
use crate::search::{format_hits, WebSearch};
use tracing::{debug, info};

const TEMPERATURE: f32 = 0.5;

impl Agent {
    pub(crate) async fn answer_general(&self, question: &str) -> Result<AnswerResponse> {
        info!("--- Handling General Question ---");

        let hits = self.search.search(question).await?;
        debug!("Web search returned {} results", hits.len());

        let prompt = general_prompt(question, &format_hits(&hits));
        let summary = self
            .llm
            .complete(&prompt, CompletionOptions::text(TEMPERATURE))
            .await?;

        Ok(AnswerResponse::text(summary))
    }
}
