use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ExtractionService;
use crate::screening::pipeline::Screener;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only scoring rules, built once at startup.
    pub screener: Arc<Screener>,
    /// The process-wide extraction engine. Initialized before the server starts.
    pub extraction: Arc<ExtractionService>,
}
