//! Pagination planner. Turns paragraphs into a renderer-agnostic plan.
//!
//! # Algorithm
//! One deterministic pass. The cursor is a Y coordinate measured from the page
//! bottom, starting at the top margin of page 1. Per paragraph: subtract
//! spacing-before, wrap, then place each line. A line that would cross the
//! bottom margin starts a new page and is marked [`LineBreak::Page`]. After the
//! last line, subtract spacing-after.
//!
//! Content is never dropped. A line that cannot fit on an empty page is still
//! placed there rather than producing another empty page.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::content::Paragraph;
use crate::layout::font_metrics::TextMeasurer;
use crate::layout::style::{PageGeometry, ParagraphStyle, ResolvedStyle, StyleTable};
use crate::layout::wrap::{
    strip_bullet_prefix, wrap_skills_line, wrap_text, LineWidths, WIDTH_EPSILON,
};

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

/// What must precede a planned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBreak {
    /// First line of a paragraph on the current page.
    None,
    Line,
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlannedLine {
    pub break_before: LineBreak,
    pub text: String,
    /// Bold `"Label:"` drawn before `text`. Skills lines only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_label: Option<String>,
    /// Draw the bullet glyph in the marker column. First bullet line only.
    #[serde(default)]
    pub bullet_marker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedParagraph {
    pub paragraph: Paragraph,
    pub style: ResolvedStyle,
    pub lines: Vec<PlannedLine>,
}

/// The single artifact both renderers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationPlan {
    pub paragraphs: Vec<PlannedParagraph>,
    pub page_count: u32,
}

impl PaginationPlan {
    pub fn lines(&self) -> impl Iterator<Item = &PlannedLine> {
        self.paragraphs.iter().flat_map(|p| p.lines.iter())
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    #[cfg(test)]
    pub fn page_break_count(&self) -> usize {
        self.lines()
            .filter(|l| l.break_before == LineBreak::Page)
            .count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wrapping per paragraph kind
// ────────────────────────────────────────────────────────────────────────────

/// Wraps one paragraph into unbroken lines (break markers are set later).
fn wrap_paragraph(
    paragraph: &Paragraph,
    style: &ResolvedStyle,
    content_width: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<PlannedLine> {
    let width = content_width - style.indent_left;
    let unbroken = |text: String| PlannedLine {
        break_before: LineBreak::Line,
        text,
        skills_label: None,
        bullet_marker: false,
    };

    if paragraph.is_skills_line() {
        return wrap_skills_line(
            &paragraph.text,
            measurer,
            style.variant,
            style.font_size,
            width,
        )
        .into_iter()
        .map(|row| PlannedLine {
            skills_label: row.label,
            ..unbroken(row.text)
        })
        .collect();
    }

    if paragraph.style == ParagraphStyle::Bullet {
        let text = strip_bullet_prefix(&paragraph.text);
        return wrap_text(
            text,
            measurer,
            style.variant,
            style.font_size,
            LineWidths::uniform(width),
        )
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlannedLine {
            bullet_marker: i == 0,
            ..unbroken(text)
        })
        .collect();
    }

    let widths = LineWidths {
        first: width + style.indent_hanging,
        rest: width,
    };
    wrap_text(
        &paragraph.text,
        measurer,
        style.variant,
        style.font_size,
        widths,
    )
    .into_iter()
    .map(unbroken)
    .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Planner
// ────────────────────────────────────────────────────────────────────────────

struct Cursor {
    y: f32,
    page_count: u32,
    /// Whether anything was placed on the current page.
    page_used: bool,
    top: f32,
    bottom: f32,
}

impl Cursor {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            y: geometry.top_y(),
            page_count: 1,
            page_used: false,
            top: geometry.top_y(),
            bottom: geometry.bottom_y(),
        }
    }

    /// Advances past one line, returning true when it had to start a new page.
    fn place_line(&mut self, line_height: f32) -> bool {
        let overflows = self.y - line_height < self.bottom - WIDTH_EPSILON;
        let new_page = overflows && self.page_used;
        if new_page {
            self.page_count += 1;
            self.y = self.top;
        }
        self.y -= line_height;
        self.page_used = true;
        new_page
    }
}

/// Plans `paragraphs` onto pages of `geometry`.
pub fn plan_pagination(
    paragraphs: Vec<Paragraph>,
    styles: &StyleTable,
    geometry: &PageGeometry,
    measurer: &dyn TextMeasurer,
) -> PaginationPlan {
    let content_width = geometry.content_width_pt();
    let mut cursor = Cursor::new(geometry);
    let mut planned = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        let style = styles.get(paragraph.style).resolve();
        cursor.y -= style.space_before;

        let mut lines = wrap_paragraph(&paragraph, &style, content_width, measurer);
        for (i, line) in lines.iter_mut().enumerate() {
            line.break_before = if cursor.place_line(style.line_height) {
                LineBreak::Page
            } else if i == 0 {
                LineBreak::None
            } else {
                LineBreak::Line
            };
        }

        cursor.y -= style.space_after;
        planned.push(PlannedParagraph {
            paragraph,
            style,
            lines,
        });
    }

    let plan = PaginationPlan {
        paragraphs: planned,
        page_count: cursor.page_count,
    };
    debug!(
        paragraphs = plan.paragraphs.len(),
        lines = plan.line_count(),
        pages = plan.page_count,
        "pagination planned"
    );
    plan
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::content::build_paragraphs;
    use crate::layout::font_metrics::{AverageWidthMeasurer, StandardFontMeasurer};
    use crate::models::{ContactInfo, ExperienceEntry, SourceLayout, TailoredResume};

    /// 5pt per character at 10pt.
    const HALF_EM: AverageWidthMeasurer = AverageWidthMeasurer { em_per_char: 0.5 };

    fn body(text: &str) -> Paragraph {
        Paragraph::new(ParagraphStyle::Body, text)
    }

    fn plan(paragraphs: Vec<Paragraph>, measurer: &dyn TextMeasurer) -> PaginationPlan {
        plan_pagination(
            paragraphs,
            &StyleTable::default(),
            &PageGeometry::letter(),
            measurer,
        )
    }

    fn make_resume() -> TailoredResume {
        TailoredResume {
            name: "Ada Lovelace".to_string(),
            contact: ContactInfo {
                email: Some("ada@example.com".to_string()),
                ..Default::default()
            },
            skills: vec!["Languages: Go, Python, TypeScript, JavaScript, Java, C++".to_string()],
            experience: vec![ExperienceEntry {
                title: "Analyst".to_string(),
                company: "Analytical Engines Ltd".to_string(),
                bullets: vec![
                    "Wrote the first published algorithm intended for a machine, \
                     translating and extending notes on the engine with commentary \
                     three times longer than the source article"
                        .to_string(),
                    "Described looping and conditional branching".to_string(),
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_first_line_has_no_break_and_rest_are_line_breaks() {
        let text = "word ".repeat(60);
        let plan = plan(vec![body(&text), body("short")], &HALF_EM);
        let first = &plan.paragraphs[0].lines;
        // 544pt / 5pt = 108 chars; "word " is 5 chars so 21 words per line.
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].break_before, LineBreak::None);
        assert!(first[1..].iter().all(|l| l.break_before == LineBreak::Line));
        assert_eq!(plan.paragraphs[1].lines[0].break_before, LineBreak::None);
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn test_page_capacity_for_single_line_body_paragraphs() {
        // Each body paragraph takes 12.4pt line + 2pt after; 50 fit in 728pt.
        let fifty: Vec<Paragraph> = (0..50).map(|i| body(&format!("line {i}"))).collect();
        assert_eq!(plan(fifty.clone(), &HALF_EM).page_count, 1);

        let mut fifty_one = fifty;
        fifty_one.push(body("overflow"));
        let plan = plan(fifty_one, &HALF_EM);
        assert_eq!(plan.page_count, 2);
        let last = plan.paragraphs.last().unwrap();
        assert_eq!(last.lines[0].break_before, LineBreak::Page);
        assert_eq!(plan.page_break_count(), 1);
    }

    #[test]
    fn test_dense_paragraph_spills_onto_second_page() {
        let words = ["resume", "layout", "engine", "measures", "every", "glyph"];
        let text = (0..1800)
            .map(|i| words[i % words.len()])
            .collect::<Vec<_>>()
            .join(" ");
        let measurer = StandardFontMeasurer::load().unwrap();
        let plan = plan(vec![body(&text)], &measurer);
        assert!(plan.page_count > 1);
        assert!(plan.lines().any(|l| l.break_before == LineBreak::Page));
        assert_eq!(plan.page_break_count() + 1, plan.page_count as usize);
    }

    #[test]
    fn test_bullet_marker_only_on_first_line() {
        let measurer = StandardFontMeasurer::load().unwrap();
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let plan = plan(paragraphs, &measurer);
        let bullets: Vec<&PlannedParagraph> = plan
            .paragraphs
            .iter()
            .filter(|p| p.paragraph.style == ParagraphStyle::Bullet)
            .collect();
        assert_eq!(bullets.len(), 2);
        assert!(bullets[0].lines.len() > 1);
        for bullet in bullets {
            assert!(bullet.lines[0].bullet_marker);
            assert!(bullet.lines[1..].iter().all(|l| !l.bullet_marker));
            assert!(!bullet.lines[0].text.starts_with('•'));
        }
        assert!(plan
            .paragraphs
            .iter()
            .filter(|p| p.paragraph.style != ParagraphStyle::Bullet)
            .flat_map(|p| &p.lines)
            .all(|l| !l.bullet_marker));
    }

    #[test]
    fn test_skills_labels_only_on_skills_lines() {
        let measurer = StandardFontMeasurer::load().unwrap();
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let plan = plan(paragraphs, &measurer);
        for p in &plan.paragraphs {
            let labeled = p.lines.iter().filter(|l| l.skills_label.is_some()).count();
            if p.paragraph.is_skills_line() {
                assert_eq!(labeled, 1);
                assert_eq!(p.lines[0].skills_label.as_deref(), Some("Languages:"));
            } else {
                assert_eq!(labeled, 0);
            }
        }
    }

    #[test]
    fn test_wrapped_lines_fit_their_widths() {
        let measurer = StandardFontMeasurer::load().unwrap();
        let geometry = PageGeometry::letter();
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let plan = plan(paragraphs, &measurer);
        for p in plan
            .paragraphs
            .iter()
            .filter(|p| !p.paragraph.is_skills_line())
        {
            let width = geometry.content_width_pt() - p.style.indent_left;
            for line in &p.lines {
                let drawn = measurer.width_of_text_at_size(&line.text, p.style.variant, p.style.font_size);
                assert!(drawn <= width + p.style.indent_hanging + WIDTH_EPSILON);
            }
        }
    }

    #[test]
    fn test_oversized_line_on_empty_page_does_not_add_pages() {
        let styles = StyleTable {
            body: crate::layout::style::StyleOptions {
                size_half_points: 2000,
                ..StyleTable::default().body
            },
            ..StyleTable::default()
        };
        let plan = plan_pagination(
            vec![body("x")],
            &styles,
            &PageGeometry::letter(),
            &HALF_EM,
        );
        assert_eq!(plan.page_count, 1);
        assert_eq!(plan.paragraphs[0].lines[0].break_before, LineBreak::None);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let measurer = StandardFontMeasurer::load().unwrap();
        let resume = make_resume();
        let layout = SourceLayout::default();
        let a = plan(build_paragraphs(&resume, &layout), &measurer);
        let b = plan(build_paragraphs(&resume, &layout), &measurer);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
