pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers as layout;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout/plan", post(layout::handle_plan))
        .route("/api/v1/layout/compact", post(layout::handle_compact))
        // Export API
        .route("/api/v1/export/pdf", post(layout::handle_export_pdf))
        .route("/api/v1/export/docx", post(layout::handle_export_docx))
        // Tailoring API
        .route("/api/v1/resumes/tailor", post(tailoring::handle_tailor))
        .with_state(state)
}
