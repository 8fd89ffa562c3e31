//! Document Retriever
//!
//! Embeds every chunk of one document, then returns the chunks closest to a
//! question as prompt context.

use super::chunker::TextChunker;
use super::vector_store::{Document, InMemoryVectorStore};
use crate::error::{AgentError, Result};
use crate::llm::{Embedder, EMBED_BATCH_SIZE};
use tracing::info;

pub struct Retriever {
    store: InMemoryVectorStore,
}

impl Retriever {
    /// Chunk `text` and embed the chunks, at most [`EMBED_BATCH_SIZE`] per
    /// embedder call.
    pub async fn build(text: &str, chunker: &TextChunker, embedder: &dyn Embedder) -> Result<Self> {
        let chunks = chunker.chunk(text);
        if chunks.is_empty() {
            return Err(AgentError::Document("Document produced no chunks".to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let vectors = embedder.embed(batch).await?;
            if vectors.len() != batch.len() {
                return Err(AgentError::Document(format!(
                    "Embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);
        }
        let dimension = embeddings
            .first()
            .map(Vec::len)
            .ok_or_else(|| AgentError::Document("Embedder returned no vectors".to_string()))?;

        let mut store = InMemoryVectorStore::new(dimension);
        store.add_documents(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| Document {
                    id: chunk.index,
                    text: chunk.text,
                    embedding,
                })
                .collect(),
        );

        info!("Indexed {} chunks (dimension {})", store.len(), dimension);
        Ok(Self { store })
    }

    /// The `top_k` chunks closest to the question, best first.
    pub async fn retrieve(
        &self,
        question: &str,
        embedder: &dyn Embedder,
        top_k: usize,
    ) -> Result<Vec<String>> {
        let query = embedder
            .embed(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Document("Embedder returned no query vector".to_string()))?;

        Ok(self
            .store
            .search(&query, top_k)?
            .into_iter()
            .map(|r| r.document.text)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Join retrieved chunks into one context block.
pub fn join_context(chunks: &[String]) -> String {
    chunks.join("\n\n")
}
