use std::sync::Arc;

use crate::config::Config;
use crate::layout::compaction::ExactFit;
use crate::layout::{PageGeometry, StyleTable, TextMeasurer};
use crate::tailoring::extract::SourceLayoutExtractor;
use crate::tailoring::ResumeTailor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable paragraph styles shared by the planner and both renderers.
    pub styles: Arc<StyleTable>,
    pub geometry: PageGeometry,
    /// Production measurer: the Times advances the PDF is drawn with.
    pub measurer: Arc<dyn TextMeasurer>,
    pub extractor: Arc<SourceLayoutExtractor>,
    /// `None` when no API key is configured; the tailoring endpoint then answers 503.
    pub tailor: Option<Arc<dyn ResumeTailor>>,
}

impl AppState {
    /// Exact verification inputs, when enabled in config.
    pub fn exact_fit(&self) -> Option<ExactFit<'_>> {
        self.config.verify_exact_fit.then(|| ExactFit {
            styles: &self.styles,
            geometry: &self.geometry,
            measurer: self.measurer.as_ref(),
        })
    }
}
