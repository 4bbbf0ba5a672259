//! OCR fallback for scanned, image-only statements.
//!
//! Pages are rasterized with `pdftoppm` and recognized with `tesseract`,
//! one pass per page, no retries. Every intermediate file lives in a
//! temporary directory that is removed when it goes out of scope.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::IngestError;

pub const DEFAULT_OCR_DPI: u32 = 300;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// A page-at-a-time text recognizer.
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Recognize the text of one page (1-based) of the PDF at `pdf_path`.
    fn recognize_page(&self, pdf_path: &Path, page: u32) -> Result<String, IngestError>;
}

/// Tesseract via the command line, fed by pdftoppm rasterization.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    language: String,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>, dpi: u32) -> Self {
        Self {
            language: language.into(),
            dpi,
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_LANGUAGE, DEFAULT_OCR_DPI)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize_page(&self, pdf_path: &Path, page: u32) -> Result<String, IngestError> {
        let temp_dir = TempDir::new()?;
        let image = rasterize_page(pdf_path, page, self.dpi, temp_dir.path())?;
        run_tesseract(&image, &self.language)
    }
}

/// Render a single page to PNG with pdftoppm.
fn rasterize_page(pdf_path: &Path, page: u32, dpi: u32, output_dir: &Path) -> Result<PathBuf, IngestError> {
    let page_str = page.to_string();
    let status = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi.to_string(), "-f", &page_str, "-l", &page_str])
        .arg(pdf_path)
        .arg(output_dir.join("page"))
        .status();

    match status {
        Ok(s) if s.success() => find_page_image(output_dir, page)
            .ok_or_else(|| IngestError::OcrFailed(format!("no image generated for page {page}"))),
        Ok(s) => Err(IngestError::OcrFailed(format!("pdftoppm exited with {s}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IngestError::OcrUnavailable(
            "pdftoppm not found (install poppler-utils)".to_string(),
        )),
        Err(e) => Err(IngestError::Io(e)),
    }
}

/// pdftoppm zero-pads the page number to a width that depends on the page count.
fn find_page_image(dir: &Path, page: u32) -> Option<PathBuf> {
    [1usize, 2, 3, 4, 5]
        .iter()
        .map(|width| dir.join(format!("page-{page:0width$}.png", width = *width)))
        .find(|p| p.exists())
}

fn run_tesseract(image: &Path, language: &str) -> Result<String, IngestError> {
    let output = Command::new("tesseract")
        .arg(image)
        .arg("stdout")
        .args(["-l", language])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => Err(IngestError::OcrFailed(format!(
            "tesseract failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IngestError::OcrUnavailable(
            "tesseract not found (install tesseract-ocr)".to_string(),
        )),
        Err(e) => Err(IngestError::Io(e)),
    }
}

/// Number of pages according to the PDF's page tree.
pub fn page_count(bytes: &[u8]) -> Result<u32, IngestError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| IngestError::OcrFailed(format!("cannot read PDF page tree: {e}")))?;
    Ok(doc.get_pages().len() as u32)
}

/// Run `engine` exactly once per page, in page order.
pub fn ocr_pages(bytes: &[u8], engine: &dyn OcrEngine) -> Result<Vec<String>, IngestError> {
    let pages = page_count(bytes)?;
    info!(engine = engine.name(), pages, "running OCR fallback");

    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    let mut out = Vec::with_capacity(pages as usize);
    for page in 1..=pages {
        let text = engine.recognize_page(file.path(), page)?;
        debug!(page, chars = text.len(), "recognized page");
        out.push(text);
    }
    Ok(out)
}
