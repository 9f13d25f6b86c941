//! Axum route handler for the Tailoring API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::compaction::estimate_lines;
use crate::layout::fingerprint::revision_fingerprint;
use crate::models::{SourceLayout, TailoredResume};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub resume_text: String,
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub resume: TailoredResume,
    pub layout: SourceLayout,
    pub fingerprint: String,
    pub estimated_lines: usize,
}

/// POST /api/v1/resumes/tailor
///
/// Rewrites the uploaded resume for a job description and extracts the
/// section structure of the upload, so the result can go straight to
/// `/layout/compact` or an export endpoint.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    let tailor = state.tailor.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("resume tailoring is not configured".to_string())
    })?;

    let resume = tailor.tailor(&request.resume_text, &request.jd_text).await?;
    let layout = state.extractor.extract(&request.resume_text, &resume);
    let fingerprint =
        revision_fingerprint(&resume, &layout).map_err(|e| AppError::Internal(e.into()))?;
    let estimated_lines = estimate_lines(&resume, &layout);

    Ok(Json(TailorResponse {
        resume,
        layout,
        fingerprint,
        estimated_lines,
    }))
}
