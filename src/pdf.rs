//! PDF documents through `pdf-extract`.
//!
//! Text is extracted page by page, one item per line. `pdf-extract` can't
//! decrypt user-password protected files; those are reported as password
//! failures so the caller can tell them apart from broken files.

use async_trait::async_trait;

use crate::notes::document::{Document, DocumentLoader, OpenError, TextDocument};

/// PDF magic bytes
const PDF_MAGIC: &[u8] = b"%PDF";
/// Maximum PDF file size (100 MB)
const MAX_PDF_SIZE: usize = 100 * 1024 * 1024;

fn validate_pdf(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a PDF".to_string());
    }

    if bytes.len() > MAX_PDF_SIZE {
        return Err(format!(
            "PDF file too large ({} MB). Maximum: {} MB",
            bytes.len() / (1024 * 1024),
            MAX_PDF_SIZE / (1024 * 1024)
        ));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err("Invalid PDF file: missing PDF header".to_string());
    }

    Ok(())
}

fn classify_error(message: String, password: Option<&str>) -> OpenError {
    let lower = message.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") || lower.contains("decrypt") {
        match password {
            Some(_) => OpenError::IncorrectPassword,
            None => OpenError::NoPassword,
        }
    } else {
        OpenError::Other(message)
    }
}

fn extract_pages(bytes: &[u8], password: Option<&str>) -> Result<Vec<String>, OpenError> {
    // pdf-extract panics on some malformed files
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(classify_error(e.to_string(), password)),
        Err(_) => Err(OpenError::Other("Failed to extract text from PDF".to_string())),
    }
}

pub struct PdfLoader;

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn open(&self, content: &[u8], password: Option<&str>) -> Result<Box<dyn Document>, OpenError> {
        validate_pdf(content).map_err(OpenError::Other)?;

        let bytes = content.to_vec();
        let password = password.map(str::to_string);
        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes, password.as_deref()))
            .await
            .map_err(|e| OpenError::Other(format!("PDF extraction task failed: {}", e)))??;

        log::debug!("Extracted {} pages of text", pages.len());
        Ok(Box::new(TextDocument::from_page_strings(pages)))
    }
}
