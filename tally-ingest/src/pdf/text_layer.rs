//! Embedded text-layer extraction.
//!
//! `pdf_extract` can panic on malformed input rather than returning an
//! error, so calls are wrapped in `catch_unwind`. Any failure here yields an
//! empty page list: the caller treats that as "no text layer" and moves on
//! to OCR.

use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

use crate::types::TextLine;

/// Extract one `String` per page from the PDF's text layer.
pub fn text_layer_pages(bytes: &[u8]) -> Vec<String> {
    let data = bytes.to_vec();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    }));
    match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF text layer extraction failed");
            Vec::new()
        }
        Err(_) => {
            warn!("PDF text layer extraction panicked (malformed document)");
            Vec::new()
        }
    }
}

/// True when at least one page carries non-whitespace text.
pub fn has_text(pages: &[String]) -> bool {
    pages.iter().any(|p| !p.trim().is_empty())
}

/// Split pages into non-blank lines, keeping page order and page numbers (1-based).
pub fn pages_to_lines(pages: &[String]) -> Vec<TextLine> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(idx, page)| {
            page.lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .map(move |l| TextLine::new(idx as u32 + 1, l))
        })
        .collect()
}
