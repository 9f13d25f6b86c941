//! Renderers that consume a [`PaginationPlan`](crate::layout::paginate::PaginationPlan).
//!
//! Both renderers follow the plan's break markers exactly and never re-wrap.
//! The PDF renderer places text with the plan's resolved points; the DOCX
//! renderer re-resolves paragraph properties from the
//! [`StyleTable`](crate::layout::style::StyleTable) in twips and half-points.

pub mod docx;
pub mod pdf;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rendered {rendered} pages but the plan has {planned}")]
    PageCountMismatch { planned: u32, rendered: u32 },
}

/// Document properties embedded by both renderers.
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    pub title: String,
    pub author: String,
    /// Fixed creation time. `None` omits the timestamp so output is
    /// byte-identical for identical plans.
    pub created: Option<DateTime<Utc>>,
}

impl DocumentMeta {
    pub fn for_resume(name: &str) -> Self {
        Self {
            title: format!("{name} - Resume"),
            author: name.to_string(),
            created: None,
        }
    }
}

/// A rendered document and the number of pages it realized.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

pub(crate) fn check_page_count(planned: u32, rendered: u32) -> Result<(), RenderError> {
    if planned == rendered {
        Ok(())
    } else {
        Err(RenderError::PageCountMismatch { planned, rendered })
    }
}
