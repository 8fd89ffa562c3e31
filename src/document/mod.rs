//! Document pipeline for PDF and DOCX questions
//!
//! Extract text, split it into overlapping chunks, embed the chunks and pull
//! the ones closest to the question.

pub mod chunker;
pub mod parser;
pub mod retriever;
pub mod vector_store;

pub use chunker::TextChunker;
pub use parser::DocumentParser;
pub use retriever::Retriever;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}
