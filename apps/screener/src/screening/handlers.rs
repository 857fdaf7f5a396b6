//! Axum route handlers for the Screening API.

use std::path::Path;

use anyhow::Context;
use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::Document;
use crate::render::ScreenerPage;
use crate::screening::aggregate::ScoreResult;
use crate::screening::pipeline::ScreeningRequest;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Raw multipart form, before validation.
#[derive(Debug, Default)]
struct UploadForm {
    documents: Vec<Document>,
    job_description: Option<String>,
    experience_required: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub results: Vec<ScoreResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Result<Html<String>, AppError> {
    Ok(Html(ScreenerPage::form().render()?))
}

/// POST /api/v1/screenings
///
/// Multipart fields: `resumes` (one or more files), `job_description`, `experience_required`.
/// Returns one result per uploaded resume, in upload order.
pub async fn handle_screen(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let results = run_screening(&state, multipart).await?;
    Ok(Json(ScreeningResponse { results }))
}

/// POST /upload
///
/// Same form as `/api/v1/screenings`, answered with the HTML results table.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let results = run_screening(&state, multipart).await?;
    Ok(Html(ScreenerPage::with_results(&results).render()?))
}

async fn run_screening(
    state: &AppState,
    multipart: Multipart,
) -> Result<Vec<ScoreResult>, AppError> {
    // Uploads live only as long as the request.
    let staging = tempfile::tempdir().context("Failed to create upload staging directory")?;
    let form = read_upload_form(multipart, staging.path()).await?;

    if form.documents.is_empty() {
        return Err(AppError::Validation("No resumes uploaded".to_string()));
    }
    let request = ScreeningRequest::parse(
        form.job_description.as_deref(),
        form.experience_required.as_deref(),
    )?;

    Ok(state
        .screener
        .screen_batch(&state.extraction, &form.documents, &request)
        .await)
}

/// Reads every multipart field, staging resume files under `staging`.
async fn read_upload_form(mut multipart: Multipart, staging: &Path) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("resumes") => {
                let name = secure_filename(field.file_name().unwrap_or_default());
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if bytes.is_empty() && name.is_empty() {
                    continue;
                }
                let name = if name.is_empty() {
                    "resume".to_string()
                } else {
                    name
                };

                let path = staging.join(format!("{}-{name}", Uuid::new_v4()));
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("Failed to stage upload '{name}'"))?;
                form.documents.push(Document::new(name, path));
            }
            Some("job_description") => form.job_description = Some(field.text().await?),
            Some("experience_required") => form.experience_required = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// Reduces a client-supplied file name to a safe basename: ASCII letters, digits, `.`, `-`, `_`.
fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}
