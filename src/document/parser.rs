use super::DocumentFormat;
use crate::error::{AgentError, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract plain text. A document with no extractable text is an error.
    pub fn parse(&self, path: &Path, format: DocumentFormat) -> Result<String> {
        let text = match format {
            DocumentFormat::Pdf => self.parse_pdf(path)?,
            DocumentFormat::Docx => self.parse_docx(path)?,
        };

        if text.trim().is_empty() {
            return Err(AgentError::Document(format!(
                "No extractable text in {}",
                path.display()
            )));
        }

        info!("Extracted {} chars from {}", text.len(), path.display());
        Ok(text)
    }

    fn parse_pdf(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| AgentError::Document(format!("Failed to read PDF {}: {}", path.display(), e)))
    }

    fn parse_docx(&self, path: &Path) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            AgentError::Document(format!("Failed to read DOCX as ZIP {}: {}", path.display(), e))
        })?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| {
                AgentError::Document(format!("DOCX missing word/document.xml {}: {}", path.display(), e))
            })?
            .read_to_string(&mut xml)?;

        Ok(extract_docx_text(&xml))
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of every `<w:t>` run, one line per `<w:p>` paragraph.
pub fn extract_docx_text(xml: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut rest = xml;

    while let Some(start) = find_tag(rest, "<w:p") {
        let after = &rest[start..];
        let Some(open_end) = after.find('>') else {
            break;
        };
        if after[..open_end].ends_with('/') {
            rest = &after[open_end + 1..];
            continue;
        }
        let end = after.find("</w:p>").map(|e| e + "</w:p>".len()).unwrap_or(after.len());
        let paragraph = &after[..end];

        let text = paragraph_runs(paragraph);
        if !text.is_empty() {
            paragraphs.push(decode_entities(&text));
        }
        rest = &after[end..];
    }

    paragraphs.join("\n")
}

/// Position of `<tag` followed by `>`, `/` or whitespace, so `<w:p` does not
/// match `<w:pPr>`.
fn find_tag(haystack: &str, tag: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(tag) {
        let abs = offset + pos;
        match haystack[abs + tag.len()..].chars().next() {
            Some('>') | Some('/') | Some(' ') | Some('\t') | Some('\n') | Some('\r') => return Some(abs),
            _ => offset = abs + tag.len(),
        }
    }
    None
}

fn paragraph_runs(paragraph: &str) -> String {
    let mut text = String::new();
    let mut rest = paragraph;

    while let Some(start) = find_tag(rest, "<w:t") {
        let after = &rest[start..];
        let Some(open_end) = after.find('>') else {
            break;
        };
        if after[..open_end].ends_with('/') {
            rest = &after[open_end + 1..];
            continue;
        }
        let content = &after[open_end + 1..];
        let Some(close) = content.find("</w:t>") else {
            break;
        };
        text.push_str(&content[..close]);
        rest = &content[close + "</w:t>".len()..];
    }

    text
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
