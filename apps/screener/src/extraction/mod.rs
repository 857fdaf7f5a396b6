//! Text Extraction: the single boundary between the screening core and OCR / text engines.
//!
//! The core only sees `ExtractionService::extract(&Document) -> Result<String, ExtractionError>`.
//! Engines implement `TextExtractor` and are swapped at startup via `OCR_ENGINE`.
//!
//! The service owns the one engine instance for the process. It is initialized explicitly before
//! the server starts, serializes engine calls behind a mutex, bounds every call with a timeout,
//! and retries retryable failures with exponential backoff.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub mod command;
pub mod pdf;

const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'")]
    Unsupported(String),

    #[error("Could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Text extraction failed: {0}")]
    Engine(String),

    #[error("Text extraction timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Document contains no extractable text")]
    NoText,

    #[error("Extraction engine unavailable: {0}")]
    Unavailable(String),
}

impl ExtractionError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionError::Engine(_) | ExtractionError::Timeout(_))
    }
}

/// An uploaded resume staged on disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// Sanitized original file name, e.g. `jane_doe.pdf`.
    pub name: String,
    pub path: PathBuf,
}

impl Document {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Lowercased extension of the original file name, empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// File name without its extension; shown as the profile name in results.
    pub fn profile_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
            .to_string()
    }
}

/// A text extraction engine. Implement this to plug in another OCR backend.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Short label used in logs, e.g. "pdf-text".
    fn name(&self) -> &'static str;

    /// Whether this engine can handle files with the given lowercased extension.
    fn supports(&self, extension: &str) -> bool;

    /// One-time startup check or model load. Called once before the first `extract`.
    async fn initialize(&self) -> Result<(), ExtractionError> {
        Ok(())
    }

    async fn extract(&self, document: &Document) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractionSettings {
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_attempts: 1,
        }
    }
}

pub struct ExtractionService {
    engine: Arc<dyn TextExtractor>,
    settings: ExtractionSettings,
    gate: Mutex<()>,
}

impl ExtractionService {
    /// Runs the engine's initialization step and wraps it for use by the pipeline.
    pub async fn initialize(
        engine: Arc<dyn TextExtractor>,
        settings: ExtractionSettings,
    ) -> Result<Self, ExtractionError> {
        engine.initialize().await?;
        info!(
            "Extraction engine '{}' initialized (timeout {}s, {} attempt(s))",
            engine.name(),
            settings.timeout.as_secs(),
            settings.max_attempts
        );
        Ok(Self {
            engine,
            settings,
            gate: Mutex::new(()),
        })
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.engine.supports(extension)
    }

    pub async fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        let extension = document.extension();
        if !self.supports(&extension) {
            return Err(ExtractionError::Unsupported(extension));
        }

        // One engine call at a time across all requests. A call abandoned by the timeout is
        // dropped here; engines that hand work to other threads keep their own lock for it.
        let _guard = self.gate.lock().await;

        let attempts = self.settings.max_attempts.max(1);
        let mut last_error: Option<ExtractionError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s, 2s, ...
                let delay = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1).min(8));
                warn!(
                    "Extraction of '{}' failed on attempt {}, retrying after {}ms...",
                    document.name,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = tokio::time::timeout(self.settings.timeout, self.engine.extract(document))
                .await
                .unwrap_or_else(|_| Err(ExtractionError::Timeout(self.settings.timeout)));

            match outcome {
                Ok(text) if text.trim().is_empty() => return Err(ExtractionError::NoText),
                Ok(text) => {
                    debug!(
                        "Extracted {} chars from '{}' via {}",
                        text.len(),
                        document.name,
                        self.engine.name()
                    );
                    return Ok(text);
                }
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ExtractionError::Engine("no attempt was made".into())))
    }
}
