//! PDF-to-text extraction with a two-method fallback.

use std::path::Path;

use crate::error::IngestError;

/// Extract the full text of a PDF.
///
/// Tries `pdf-extract` first; on failure or whitespace-only output, walks
/// the pages with `lopdf`. Both methods coming up empty is a terminal error
/// for the file; no parsing is attempted on missing text.
pub fn extract_text(path: &Path) -> Result<String, IngestError> {
    match pdf_extract::extract_text(path) {
        Ok(text) if !text.trim().is_empty() => {
            log::debug!(
                "Extracted {} characters from {}",
                text.len(),
                path.display()
            );
            return Ok(text);
        }
        Ok(_) => log::warn!("pdf-extract returned no text for {}", path.display()),
        Err(e) => log::warn!("pdf-extract failed for {}: {e}", path.display()),
    }
    extract_text_lopdf(path)
}

/// Per-page extraction via lopdf. Pages that fail to decode are skipped;
/// the result only errors when nothing at all was recovered.
fn extract_text_lopdf(path: &Path) -> Result<String, IngestError> {
    let document = lopdf::Document::load(path).map_err(|e| {
        log::warn!("lopdf failed to load {}: {e}", path.display());
        IngestError::PdfRead
    })?;

    let mut text = String::new();
    for (page_number, _) in document.get_pages() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => log::warn!(
                "lopdf could not read page {page_number} of {}: {e}",
                path.display()
            ),
        }
    }

    if text.trim().is_empty() {
        return Err(IngestError::PdfRead);
    }
    log::debug!(
        "Extracted {} characters from {} via lopdf",
        text.len(),
        path.display()
    );
    Ok(text)
}
