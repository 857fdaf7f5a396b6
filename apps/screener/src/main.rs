mod config;
mod errors;
mod extraction;
mod render;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, OcrEngine};
use crate::extraction::command::CommandOcrExtractor;
use crate::extraction::pdf::PdfTextExtractor;
use crate::extraction::{ExtractionService, ExtractionSettings, TextExtractor};
use crate::routes::build_router;
use crate::screening::ats::AtsRuleSet;
use crate::screening::dates::DateRules;
use crate::screening::pipeline::Screener;
use crate::screening::sections::SectionLocator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Screener v{}", env!("CARGO_PKG_VERSION"));

    // ATS rules are loaded exactly once; a missing or invalid file is fatal.
    let ats_rules = AtsRuleSet::load(&config.ats_rules_path)
        .with_context(|| format!("Failed to load ATS rules from {}", config.ats_rules_path.display()))?;
    info!(
        "ATS rules loaded: {} criteria from {}",
        ats_rules.criteria_count(),
        config.ats_rules_path.display()
    );

    let screener = Screener {
        date_rules: DateRules::standard().context("Invalid built-in date rules")?,
        sections: SectionLocator::new(&config.section_headings)
            .context("Invalid section headings")?,
        ats_rules,
        policy: config.shortlist,
    };
    info!(
        "Experience sections: {}",
        screener.sections.headings().collect::<Vec<_>>().join(", ")
    );
    info!(
        "{} date patterns, ATS date pattern '{}'",
        screener.date_rules.patterns().count(),
        screener.ats_rules.config().date_pattern
    );
    info!(
        "Shortlist thresholds: skill match >= {}%, ATS compliance >= {}%",
        config.shortlist.min_skill_match, config.shortlist.min_ats_compliance
    );

    // Initialize the extraction engine (single instance for the process)
    let engine = build_engine(&config.ocr_engine)?;
    let extraction = ExtractionService::initialize(
        engine,
        ExtractionSettings {
            timeout: config.extraction_timeout,
            max_attempts: config.extraction_max_attempts,
        },
    )
    .await
    .context("Failed to initialize text extraction engine")?;

    // Build app state
    let state = AppState {
        config: config.clone(),
        screener: Arc::new(screener),
        extraction: Arc::new(extraction),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_engine(engine: &OcrEngine) -> Result<Arc<dyn TextExtractor>> {
    Ok(match engine {
        OcrEngine::PdfText => Arc::new(PdfTextExtractor::new()),
        OcrEngine::Command(command_line) => Arc::new(
            CommandOcrExtractor::parse(command_line).context("Invalid OCR_COMMAND")?,
        ),
    })
}
