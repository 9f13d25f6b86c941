mod config;
mod errors;
mod layout;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod tailoring;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::layout::{PageGeometry, StandardFontMeasurer, StyleTable};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::extract::SourceLayoutExtractor;
use crate::tailoring::{LlmResumeTailor, ResumeTailor};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OnePage API v{}", env!("CARGO_PKG_VERSION"));

    // Font metrics are required; there is no fallback measurer.
    let measurer = StandardFontMeasurer::load().context("font metric tables are unusable")?;
    let styles = StyleTable::default();
    let geometry = PageGeometry::letter();
    info!(
        "Layout: {}x{}pt, content width {}pt, line budget {}, exact fit {}",
        geometry.width_pt(),
        geometry.height_pt(),
        geometry.content_width_pt(),
        config.page_line_budget,
        config.verify_exact_fit
    );

    let extractor = SourceLayoutExtractor::new().context("section heading patterns")?;

    // Tailoring is optional; layout and export work without it.
    let tailor: Option<Arc<dyn ResumeTailor>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone()).context("building LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmResumeTailor::new(llm)))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; /api/v1/resumes/tailor will return 503");
            None
        }
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        styles: Arc::new(styles),
        geometry,
        measurer: Arc::new(measurer),
        extractor: Arc::new(extractor),
        tailor,
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
