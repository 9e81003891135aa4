//! Document and chunk types with source tracking

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Metadata key holding the chunk text inside a vector record
pub const TEXT_KEY: &str = "text";

/// Uploadable file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
}

impl FileType {
    /// Detect file type from a filename's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Detect file type from an extension without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Where a piece of text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Uploaded filename
    pub source: String,
    /// File type
    pub file_type: FileType,
    /// Page index (0-based, PDFs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl DocumentSource {
    /// Source for a whole-file document
    pub fn file(source: impl Into<String>, file_type: FileType) -> Self {
        Self {
            source: source.into(),
            file_type,
            page: None,
        }
    }

    /// Source for a single PDF page
    pub fn pdf_page(source: impl Into<String>, page: u32) -> Self {
        Self {
            source: source.into(),
            file_type: FileType::Pdf,
            page: Some(page),
        }
    }

    /// Format source for display, e.g. `report.pdf, Page 3`
    pub fn format_citation(&self) -> String {
        match self.page {
            // Pages are stored 0-based; humans read them 1-based
            Some(page) => format!("{}, Page {}", self.source, page + 1),
            None => self.source.clone(),
        }
    }
}

/// Plain text loaded from an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text
    pub content: String,
    /// Source metadata
    pub source: DocumentSource,
}

impl Document {
    /// Create a new document
    pub fn new(content: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            content: content.into(),
            source,
        }
    }
}

/// A bounded window of document text, ready for embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID, generated fresh for every chunk
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Source information
    pub source: DocumentSource,
    /// Character offset of this window in the parent document
    pub start_index: usize,
    /// Position of this chunk within the parent document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk with a freshly generated ID
    pub fn new(content: String, source: DocumentSource, start_index: usize, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            start_index,
            chunk_index,
        }
    }

    /// Convert to vector metadata for storage
    pub fn to_vector_metadata(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert(TEXT_KEY.to_string(), json!(self.content));
        meta.insert("source".to_string(), json!(self.source.source));
        meta.insert("file_type".to_string(), json!(self.source.file_type));
        meta.insert("start_index".to_string(), json!(self.start_index));
        meta.insert("chunk_index".to_string(), json!(self.chunk_index));

        if let Some(page) = self.source.page {
            meta.insert("page".to_string(), json!(page));
        }

        meta
    }

    /// Rebuild a chunk from a stored vector record
    ///
    /// Returns `None` when the record carries no text; such records are
    /// useless as retrieval context.
    pub fn from_vector_metadata(id: &str, meta: &Map<String, Value>) -> Option<Self> {
        let content = meta.get(TEXT_KEY)?.as_str()?.to_string();

        let file_type = meta
            .get("file_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(FileType::Pdf);

        let source = DocumentSource {
            source: meta
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            file_type,
            page: meta.get("page").and_then(|v| v.as_u64()).map(|p| p as u32),
        };

        Some(Self {
            id: Uuid::parse_str(id).unwrap_or_else(|_| Uuid::nil()),
            content,
            source,
            start_index: meta
                .get("start_index")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize,
            chunk_index: meta
                .get("chunk_index")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        })
    }
}
