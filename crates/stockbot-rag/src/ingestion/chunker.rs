//! Fixed-window text chunking with overlap and position tracking

use crate::types::{Chunk, Document};

/// Text chunker with configurable size and overlap
///
/// Windows are measured in characters, not bytes. Every window except the
/// last is exactly `chunk_size` long, and consecutive windows share exactly
/// `overlap` characters, so the windows cover the whole text.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Window size in characters
    chunk_size: usize,
    /// Characters shared by consecutive windows
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// `chunk_size` is raised to 1 and `overlap` clamped below `chunk_size`
    /// so the window always advances.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let overlap = overlap.min(chunk_size - 1);
        Self { chunk_size, overlap }
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into `(start_char_index, window)` pairs
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        // Byte offset of every char boundary, including the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        if total == 0 {
            return Vec::new();
        }

        let step = self.chunk_size - self.overlap;
        let mut windows = Vec::with_capacity(total / step + 1);
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(total);
            windows.push((start, &text[bounds[start]..bounds[end]]));
            if end == total {
                break;
            }
            start += step;
        }

        windows
    }

    /// Chunk one document; blank documents produce no chunks
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        if doc.content.trim().is_empty() {
            return Vec::new();
        }

        self.split_text(&doc.content)
            .into_iter()
            .enumerate()
            .map(|(index, (start, window))| {
                Chunk::new(window.to_string(), doc.source.clone(), start, index as u32)
            })
            .collect()
    }

    /// Chunk many documents, preserving document order
    pub fn chunk_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        docs.iter().flat_map(|doc| self.chunk_document(doc)).collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}
