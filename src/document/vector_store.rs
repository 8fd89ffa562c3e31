//! Vector Store
//!
//! In-memory store with exact cosine-similarity search. One store is built
//! per document question and dropped with the request.

use crate::error::{AgentError, Result};
use tracing::warn;

/// Vector embedding (simple f32 vector)
pub type Embedding = Vec<f32>;

/// Chunk of text stored with its embedding
#[derive(Debug, Clone)]
pub struct Document {
    pub id: usize,
    pub text: String,
    pub embedding: Embedding,
}

/// Search result from vector store
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

pub struct InMemoryVectorStore {
    documents: Vec<Document>,
    dimension: usize,
}

impl InMemoryVectorStore {
    /// Create a new vector store with specified embedding dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            documents: Vec::new(),
            dimension,
        }
    }

    /// Add a document; embeddings of the wrong dimension are skipped.
    pub fn add_document(&mut self, document: Document) {
        if document.embedding.len() != self.dimension {
            warn!(
                "Embedding dimension {} doesn't match store dimension {}",
                document.embedding.len(),
                self.dimension
            );
            return;
        }
        self.documents.push(document);
    }

    pub fn add_documents(&mut self, documents: Vec<Document>) {
        for doc in documents {
            self.add_document(doc);
        }
    }

    /// Top `top_k` documents by cosine similarity, best first
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if self.documents.is_empty() {
            return Ok(Vec::new());
        }

        if query_embedding.len() != self.dimension {
            return Err(AgentError::Document(format!(
                "Query embedding dimension {} doesn't match store dimension {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let mut results: Vec<SearchResult> = self
            .documents
            .iter()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Compute cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
