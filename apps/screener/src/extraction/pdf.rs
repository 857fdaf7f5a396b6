//! Built-in engine: embedded-text extraction for PDFs, plain read for TXT.
//! Scanned PDFs carry no text layer and come back empty; use the `command` engine for those.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinError;

use super::{Document, ExtractionError, TextExtractor};

#[derive(Default)]
pub struct PdfTextExtractor {
    worker: Arc<Mutex<()>>,
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs `work` on the blocking pool while holding `worker`. The lock is taken inside the blocking
/// thread, so a parse abandoned by a timeout still finishes before the next one starts.
async fn run_exclusive<T, F>(worker: Arc<Mutex<()>>, work: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _held = worker.lock().unwrap_or_else(PoisonError::into_inner);
        work()
    })
    .await
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &'static str {
        "pdf-text"
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "pdf" | "txt")
    }

    async fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        match document.extension().as_str() {
            "txt" => {
                let bytes = tokio::fs::read(&document.path)
                    .await
                    .map_err(|source| ExtractionError::Io {
                        path: document.path.clone(),
                        source,
                    })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            "pdf" => {
                let path = document.path.clone();
                // pdf-extract is synchronous and CPU-bound.
                run_exclusive(self.worker.clone(), move || pdf_extract::extract_text(&path))
                    .await
                    .map_err(|e| ExtractionError::Engine(format!("PDF worker failed: {e}")))?
                    .map_err(|e| ExtractionError::Engine(e.to_string()))
            }
            other => Err(ExtractionError::Unsupported(other.to_string())),
        }
    }
}
