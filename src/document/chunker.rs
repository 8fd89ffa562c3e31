/// A slice of document text with its byte offsets
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Sliding-window splitter that prefers natural break points
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if text.len() <= self.chunk_size {
            return vec![Chunk {
                index: 0,
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len(),
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let end = snap_to_char_boundary(text, start + self.chunk_size);
            let actual_end = if end < text.len() {
                self.find_break_point(text, start, end)
            } else {
                end
            };

            let chunk_text = &text[start..actual_end];
            if !chunk_text.trim().is_empty() {
                chunks.push(Chunk {
                    index: chunks.len(),
                    text: chunk_text.to_string(),
                    start_offset: start,
                    end_offset: actual_end,
                });
            }

            if actual_end >= text.len() {
                break;
            }

            // Step back by the overlap, but always make progress.
            let next = snap_to_char_boundary(text, actual_end.saturating_sub(self.chunk_overlap));
            start = if next > start { next } else { actual_end };
        }

        chunks
    }

    /// Paragraph break > sentence end > line break > word break, searched in
    /// the last 200 bytes of the window. Falls back to a hard cut.
    fn find_break_point(&self, text: &str, start: usize, preferred_end: usize) -> usize {
        let search_start = snap_to_char_boundary(text, preferred_end.saturating_sub(200).max(start));
        if search_start >= preferred_end {
            return preferred_end;
        }

        let region = &text[search_start..preferred_end];
        let found = region
            .rfind("\n\n")
            .map(|p| p + 2)
            .or_else(|| region.rfind(". ").map(|p| p + 2))
            .or_else(|| region.rfind(".\n").map(|p| p + 2))
            .or_else(|| region.rfind('\n').map(|p| p + 1))
            .or_else(|| region.rfind(' ').map(|p| p + 1));

        match found {
            Some(offset) if search_start + offset > start => search_start + offset,
            _ => preferred_end,
        }
    }
}

/// Round a byte offset down to a UTF-8 char boundary, clamped to the text.
fn snap_to_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}
