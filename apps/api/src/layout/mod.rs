// One-page layout core: content model, measurement, wrapping, pagination and
// compaction. Everything here is synchronous and pure; handlers run it inside
// tokio::task::spawn_blocking.

pub mod compaction;
pub mod content;
pub mod fingerprint;
pub mod font_metrics;
pub mod handlers;
pub mod paginate;
pub mod sanitize;
pub mod skills;
pub mod style;
pub mod wrap;

// Re-export the public API consumed by handlers and the renderers.
pub use compaction::{fit_to_one_page, CompactionResult, ExactFit};
pub use content::{build_paragraphs, Paragraph};
pub use font_metrics::{StandardFontMeasurer, TextMeasurer};
pub use paginate::{plan_pagination, PaginationPlan};
pub use style::{PageGeometry, StyleTable};
