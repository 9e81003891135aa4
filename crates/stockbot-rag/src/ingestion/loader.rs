//! PDF and DOCX loading into plain-text documents

use crate::error::{Error, Result};
use crate::types::{Document, DocumentSource, FileType, UploadedFile};

/// Replace ligature glyphs and control characters pdf-extract leaves behind
fn cleanup_pdf_text(text: &str) -> String {
    let text = text
        .replace('\0', "")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{00A0}', " ");

    text.lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Run a parser, turning a panic inside it into a parse error
///
/// pdf-extract and docx-rs panic on some malformed inputs.
fn guard_parse<T>(filename: &str, parse: impl FnOnce() -> Result<T>) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(parse)).unwrap_or_else(|_| {
        Err(Error::file_parse(filename, "Parser panicked on malformed input"))
    })
}

/// Converts uploaded files into [`Document`]s
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a file, dispatching on its extension
    pub fn load(file: &UploadedFile) -> Result<Vec<Document>> {
        let file_type = FileType::from_filename(&file.filename)
            .ok_or_else(|| Error::UnsupportedFileType(file.filename.clone()))?;

        guard_parse(&file.filename, || match file_type {
            FileType::Pdf => Self::load_pdf(&file.filename, &file.data),
            FileType::Docx => Self::load_docx(&file.filename, &file.data),
        })
    }

    /// Load a PDF as one document per non-blank page
    ///
    /// Page metadata is 0-based.
    pub fn load_pdf(filename: &str, data: &[u8]) -> Result<Vec<Document>> {
        let pages = match pdf_extract::extract_text_from_mem_by_pages(data) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("pdf-extract failed for {}: {}, trying lopdf", filename, e);
                Self::extract_pages_fallback(filename, data)?
            }
        };

        let documents: Vec<Document> = pages
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let text = cleanup_pdf_text(&raw);
                if text.is_empty() {
                    None
                } else {
                    Some(Document::new(text, DocumentSource::pdf_page(filename, index as u32)))
                }
            })
            .collect();

        if documents.is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF (image-based or encrypted?)",
            ));
        }

        tracing::debug!("PDF loaded: {} ({} pages with text)", filename, documents.len());
        Ok(documents)
    }

    /// Page-by-page extraction with lopdf
    fn extract_pages_fallback(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e);
                    pages.push(String::new());
                }
            }
        }

        Ok(pages)
    }

    /// Load a DOCX as a single document (paragraphs and table cells)
    pub fn load_docx(filename: &str, data: &[u8]) -> Result<Vec<Document>> {
        let docx = docx_rs::read_docx(data).map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        for child in &docx.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    push_paragraph(&mut content, p);
                }
                docx_rs::DocumentChild::Table(table) => {
                    push_table(&mut content, table);
                }
                _ => {}
            }
        }

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(Error::file_parse(filename, "Document contains no text"));
        }

        tracing::debug!("DOCX loaded: {} ({} chars)", filename, content.chars().count());
        Ok(vec![Document::new(
            content,
            DocumentSource::file(filename, FileType::Docx),
        )])
    }
}

fn push_paragraph(out: &mut String, paragraph: &docx_rs::Paragraph) {
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for child in &run.children {
                match child {
                    docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                    docx_rs::RunChild::Tab(_) => out.push('\t'),
                    docx_rs::RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out.push('\n');
}

fn push_table(out: &mut String, table: &docx_rs::Table) {
    for row in &table.rows {
        #[allow(irrefutable_let_patterns)]
        let docx_rs::TableChild::TableRow(row) = row else {
            continue;
        };
        let mut cells = Vec::new();
        for cell in &row.cells {
            #[allow(irrefutable_let_patterns)]
            let docx_rs::TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            let mut text = String::new();
            for content in &cell.children {
                match content {
                    docx_rs::TableCellContent::Paragraph(p) => push_paragraph(&mut text, p),
                    docx_rs::TableCellContent::Table(inner) => push_table(&mut text, inner),
                    _ => {}
                }
            }
            cells.push(text.trim().replace('\n', " "));
        }
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
}
