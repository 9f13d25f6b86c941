//! Fixed-layout renderer: one PDF page object per planned page, text placed at
//! absolute coordinates with the four standard Times fonts.
//!
//! Content streams are left uncompressed. Strings are WinAnsi encoded, the
//! same repertoire the measurer reports widths for.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use tracing::debug;

use crate::layout::font_metrics::{encode_win_ansi, StyleVariant, TextMeasurer};
use crate::layout::paginate::{LineBreak, PaginationPlan, PlannedLine, PlannedParagraph};
use crate::layout::style::{PageGeometry, ParagraphStyle};
use crate::layout::wrap::{skills_label_width, BULLET_GLYPH};
use crate::render::{check_page_count, DocumentMeta, RenderError, RenderedDocument};

/// Font resource names, one per style variant.
const FONT_RESOURCES: [(StyleVariant, &str); 4] = [
    (StyleVariant::Regular, "F1"),
    (StyleVariant::Bold, "F2"),
    (StyleVariant::Italic, "F3"),
    (StyleVariant::BoldItalic, "F4"),
];

/// Baseline position inside a line box, as a fraction of line height from the top.
const BASELINE_RATIO: f32 = 0.8;
const RULE_WIDTH: f32 = 0.6;

fn font_resource(variant: StyleVariant) -> &'static str {
    FONT_RESOURCES
        .iter()
        .find(|(v, _)| *v == variant)
        .map(|(_, name)| *name)
        .unwrap_or("F1")
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

/// Drawing cursor plus the operations of every page drawn so far.
struct Canvas<'a> {
    geometry: &'a PageGeometry,
    measurer: &'a dyn TextMeasurer,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl<'a> Canvas<'a> {
    fn new(geometry: &'a PageGeometry, measurer: &'a dyn TextMeasurer) -> Self {
        Self {
            geometry,
            measurer,
            pages: Vec::new(),
            ops: Vec::new(),
            y: geometry.top_y(),
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = self.geometry.top_y();
    }

    fn text(&mut self, text: &str, variant: StyleVariant, size: f32, x: f32, baseline: f32) {
        if text.is_empty() {
            return;
        }
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font_resource(variant).into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rule(&mut self, y: f32) {
        let left = self.geometry.left_pt();
        let right = left + self.geometry.content_width_pt();
        self.ops.extend([
            Operation::new("w", vec![RULE_WIDTH.into()]),
            Operation::new("m", vec![left.into(), y.into()]),
            Operation::new("l", vec![right.into(), y.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn width(&self, text: &str, variant: StyleVariant, size: f32) -> f32 {
        self.measurer.width_of_text_at_size(text, variant, size)
    }

    fn draw_line(&mut self, planned: &PlannedParagraph, index: usize, line: &PlannedLine) {
        let style = &planned.style;
        let baseline = self.y - style.line_height * BASELINE_RATIO;
        let left = self.geometry.left_pt() + style.indent_left;

        if planned.paragraph.style == ParagraphStyle::Bullet {
            if line.bullet_marker {
                let marker_x = left - style.indent_hanging;
                self.text(
                    &BULLET_GLYPH.to_string(),
                    style.variant,
                    style.font_size,
                    marker_x,
                    baseline,
                );
            }
            self.text(&line.text, style.variant, style.font_size, left, baseline);
            return;
        }

        if let Some(label) = &line.skills_label {
            self.text(label, StyleVariant::Bold, style.font_size, left, baseline);
            let value_x = left + skills_label_width(label, self.measurer, style.font_size);
            self.text(&line.text, style.variant, style.font_size, value_x, baseline);
            return;
        }

        let x = if style.centered {
            let width = self.width(&line.text, style.variant, style.font_size);
            self.geometry.left_pt() + (self.geometry.content_width_pt() - width) / 2.0
        } else if index == 0 {
            left - style.indent_hanging
        } else {
            left
        };
        self.text(&line.text, style.variant, style.font_size, x, baseline);
    }

    fn draw(&mut self, plan: &PaginationPlan) {
        for planned in &plan.paragraphs {
            let style = planned.style;
            self.y -= style.space_before;
            for (index, line) in planned.lines.iter().enumerate() {
                if line.break_before == LineBreak::Page {
                    self.new_page();
                }
                self.draw_line(planned, index, line);
                self.y -= style.line_height;
            }
            if style.section_divider && self.y >= self.geometry.bottom_y() {
                self.rule(self.y);
            }
            self.y -= style.space_after;
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.ops);
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document assembly
// ────────────────────────────────────────────────────────────────────────────

fn info_dictionary(meta: &DocumentMeta) -> Dictionary {
    let literal = |s: &str| Object::String(encode_win_ansi(s), StringFormat::Literal);
    let mut info = dictionary! {
        "Title" => literal(&meta.title),
        "Author" => literal(&meta.author),
        "Producer" => literal(concat!("onepage-api ", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(created) = meta.created {
        let stamp = created.format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("CreationDate", literal(&stamp));
    }
    info
}

/// Draws `plan` and serializes the document.
pub fn render_pdf(
    plan: &PaginationPlan,
    geometry: &PageGeometry,
    measurer: &dyn TextMeasurer,
    meta: &DocumentMeta,
) -> Result<RenderedDocument, RenderError> {
    let mut canvas = Canvas::new(geometry, measurer);
    canvas.draw(plan);
    let pages = canvas.finish();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for (variant, name) in FONT_RESOURCES {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => variant.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(name, font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        geometry.width_pt().into(),
        geometry.height_pt().into(),
    ];
    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages.iter().cloned() {
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content).with_compression(false));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as u32;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(info_dictionary(meta));
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    check_page_count(plan.page_count, page_count)?;
    debug!(pages = page_count, bytes = bytes.len(), "pdf rendered");
    Ok(RenderedDocument { bytes, page_count })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
