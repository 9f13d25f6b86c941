//! Axum route handlers for the Layout and Export APIs.
//!
//! Planning, compaction and rendering are CPU-bound, so every handler moves
//! the work onto `tokio::task::spawn_blocking` with a clone of the state.

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::compaction::{estimate_lines, fit_to_one_page, CompactionResult};
use crate::layout::content::build_paragraphs;
use crate::layout::fingerprint::revision_fingerprint;
use crate::layout::paginate::{plan_pagination, PaginationPlan};
use crate::models::{SourceLayout, TailoredResume};
use crate::render::docx::render_docx;
use crate::render::pdf::render_pdf;
use crate::render::{DocumentMeta, RenderedDocument};
use crate::state::AppState;

const PAGE_COUNT_HEADER: HeaderName = HeaderName::from_static("x-page-count");
const FITS_HEADER: HeaderName = HeaderName::from_static("x-one-page-fit");

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub resume: TailoredResume,
    #[serde(default)]
    pub layout: SourceLayout,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub fingerprint: String,
    pub estimated_lines: usize,
    pub plan: PaginationPlan,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub resume: TailoredResume,
    #[serde(default)]
    pub layout: SourceLayout,
    /// Render the best-effort resume even when it cannot fit one page.
    #[serde(default)]
    pub allow_multi_page: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

/// A rendered export plus how compaction went.
#[derive(Debug)]
pub struct ExportedDocument {
    pub format: ExportFormat,
    pub file_name: String,
    pub fits: bool,
    pub document: RenderedDocument,
}

impl IntoResponse for ExportedDocument {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name);
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.format.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
                (PAGE_COUNT_HEADER, self.document.page_count.to_string()),
                (FITS_HEADER, self.fits.to_string()),
            ],
            Bytes::from(self.document.bytes),
        )
            .into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))?
}

fn validate_resume(resume: &TailoredResume) -> Result<(), AppError> {
    resume.validate().map_err(AppError::Validation)
}

/// `Jane Q. Doe` → `jane-q-doe-resume.pdf`.
pub fn export_file_name(name: &str, format: ExportFormat) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        format!("resume.{}", format.extension())
    } else {
        format!("{slug}-resume.{}", format.extension())
    }
}

fn compact(state: &AppState, resume: &TailoredResume, layout: &SourceLayout) -> CompactionResult {
    let exact = state.exact_fit();
    fit_to_one_page(resume, layout, state.config.page_line_budget, exact.as_ref())
}

/// Compacts, plans and renders one export. Fit conflicts are rejected unless
/// the caller accepts a multi-page document.
pub fn export_document(
    state: &AppState,
    request: &ExportRequest,
    format: ExportFormat,
) -> Result<ExportedDocument, AppError> {
    let compaction = compact(state, &request.resume, &request.layout);
    if !compaction.fits {
        let reason = compaction
            .reason
            .clone()
            .unwrap_or_else(|| "resume does not fit on one page".to_string());
        if !request.allow_multi_page {
            return Err(AppError::UnprocessableEntity(reason));
        }
        warn!(%reason, "exporting multi-page document on request");
    }

    let resume = &compaction.resume;
    let plan = plan_pagination(
        build_paragraphs(resume, &request.layout),
        &state.styles,
        &state.geometry,
        state.measurer.as_ref(),
    );
    let meta = DocumentMeta::for_resume(&resume.name);
    let document = match format {
        ExportFormat::Pdf => render_pdf(&plan, &state.geometry, state.measurer.as_ref(), &meta)?,
        ExportFormat::Docx => render_docx(&plan, &state.styles, &state.geometry, &meta)?,
    };

    info!(
        format = format.extension(),
        pages = document.page_count,
        trims = compaction.steps.len(),
        "resume exported"
    );
    Ok(ExportedDocument {
        format,
        file_name: export_file_name(&resume.name, format),
        fits: compaction.fits,
        document,
    })
}

async fn export(
    state: AppState,
    request: ExportRequest,
    format: ExportFormat,
) -> Result<ExportedDocument, AppError> {
    validate_resume(&request.resume)?;
    run_blocking(move || export_document(&state, &request, format)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/layout/plan
///
/// Plans the resume as-is (no compaction) and returns every planned line with
/// its break marker, plus the revision fingerprint of the pair.
pub async fn handle_plan(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    validate_resume(&request.resume)?;
    let fingerprint = revision_fingerprint(&request.resume, &request.layout)
        .map_err(|e| AppError::Internal(e.into()))?;

    let response = run_blocking(move || {
        let plan = plan_pagination(
            build_paragraphs(&request.resume, &request.layout),
            &state.styles,
            &state.geometry,
            state.measurer.as_ref(),
        );
        Ok(PlanResponse {
            fingerprint,
            estimated_lines: estimate_lines(&request.resume, &request.layout),
            plan,
        })
    })
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/layout/compact
///
/// Returns the one-page compaction result. A fit conflict is a normal
/// response here (`fits: false` with a reason), not an error.
pub async fn handle_compact(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<CompactionResult>, AppError> {
    validate_resume(&request.resume)?;
    let result = run_blocking(move || Ok(compact(&state, &request.resume, &request.layout))).await?;
    Ok(Json(result))
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<ExportedDocument, AppError> {
    export(state, request, ExportFormat::Pdf).await
}

/// POST /api/v1/export/docx
pub async fn handle_export_docx(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<ExportedDocument, AppError> {
    export(state, request, ExportFormat::Docx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Jane Q. Doe", ExportFormat::Pdf),
            "jane-q-doe-resume.pdf"
        );
        assert_eq!(export_file_name("  ", ExportFormat::Docx), "resume.docx");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
        assert!(ExportFormat::Docx.content_type().ends_with("wordprocessingml.document"));
    }
}
