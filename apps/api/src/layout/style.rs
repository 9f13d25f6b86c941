//! Paragraph archetypes, their style options, and page geometry.
//!
//! Style options are stored in the units of the flow-markup format
//! (half-points for font size, twips for spacing and indents). Each consumer
//! resolves them into its own units: the planner and the PDF renderer into
//! points via [`StyleOptions::resolve`], the DOCX renderer directly.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::StyleVariant;

/// Twips (twentieths of a point) per point.
pub const TWIPS_PER_POINT: f32 = 20.0;
/// Minimum line height in points regardless of font size.
pub const MIN_LINE_HEIGHT_PT: f32 = 12.0;
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.24;

// ────────────────────────────────────────────────────────────────────────────
// Archetypes
// ────────────────────────────────────────────────────────────────────────────

/// The fixed set of paragraph archetypes a resume is printed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphStyle {
    Name,
    Contact,
    SectionHeading,
    Body,
    EntryHeader,
    Bullet,
}

/// Semantic role that changes how a paragraph is wrapped and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphRole {
    /// `"Label: value, value"` line drawn as a bold label plus wrapped value.
    SkillsLine,
}

// ────────────────────────────────────────────────────────────────────────────
// Style options
// ────────────────────────────────────────────────────────────────────────────

/// Style options for one archetype, in flow-markup native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOptions {
    pub bold: bool,
    pub italic: bool,
    /// Font size in half-points.
    pub size_half_points: u32,
    /// Spacing before the paragraph in twips.
    pub spacing_before: u32,
    /// Spacing after the paragraph in twips.
    pub spacing_after: u32,
    /// Left indent in twips.
    pub indent_left: u32,
    /// Hanging indent in twips.
    pub indent_hanging: u32,
    pub centered: bool,
    /// Draw a horizontal rule under the paragraph.
    pub section_divider: bool,
}

impl StyleOptions {
    pub fn variant(&self) -> StyleVariant {
        StyleVariant::from_flags(self.bold, self.italic)
    }

    /// Resolves the options into points.
    pub fn resolve(&self) -> ResolvedStyle {
        let font_size = self.size_half_points as f32 / 2.0;
        ResolvedStyle {
            variant: self.variant(),
            font_size,
            line_height: line_height_for(font_size),
            space_before: self.spacing_before as f32 / TWIPS_PER_POINT,
            space_after: self.spacing_after as f32 / TWIPS_PER_POINT,
            indent_left: self.indent_left as f32 / TWIPS_PER_POINT,
            indent_hanging: self.indent_hanging as f32 / TWIPS_PER_POINT,
            centered: self.centered,
            section_divider: self.section_divider,
        }
    }
}

pub fn line_height_for(font_size: f32) -> f32 {
    (font_size * LINE_HEIGHT_FACTOR).max(MIN_LINE_HEIGHT_PT)
}

/// Style options converted to points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    pub variant: StyleVariant,
    pub font_size: f32,
    pub line_height: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub indent_left: f32,
    pub indent_hanging: f32,
    pub centered: bool,
    pub section_divider: bool,
}

/// Immutable archetype → options table, built once and shared by the builder,
/// the planner and both renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTable {
    pub name: StyleOptions,
    pub contact: StyleOptions,
    pub section_heading: StyleOptions,
    pub body: StyleOptions,
    pub entry_header: StyleOptions,
    pub bullet: StyleOptions,
}

impl StyleTable {
    pub fn get(&self, style: ParagraphStyle) -> &StyleOptions {
        match style {
            ParagraphStyle::Name => &self.name,
            ParagraphStyle::Contact => &self.contact,
            ParagraphStyle::SectionHeading => &self.section_heading,
            ParagraphStyle::Body => &self.body,
            ParagraphStyle::EntryHeader => &self.entry_header,
            ParagraphStyle::Bullet => &self.bullet,
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        let plain = StyleOptions {
            bold: false,
            italic: false,
            size_half_points: 20,
            spacing_before: 0,
            spacing_after: 40,
            indent_left: 0,
            indent_hanging: 0,
            centered: false,
            section_divider: false,
        };
        StyleTable {
            name: StyleOptions {
                bold: true,
                size_half_points: 32,
                spacing_after: 40,
                centered: true,
                ..plain
            },
            contact: StyleOptions {
                size_half_points: 19,
                spacing_after: 120,
                centered: true,
                ..plain
            },
            section_heading: StyleOptions {
                bold: true,
                size_half_points: 22,
                spacing_before: 140,
                spacing_after: 60,
                section_divider: true,
                ..plain
            },
            body: plain,
            entry_header: StyleOptions {
                bold: true,
                size_half_points: 21,
                spacing_before: 80,
                spacing_after: 20,
                ..plain
            },
            bullet: StyleOptions {
                spacing_after: 20,
                indent_left: 360,
                indent_hanging: 216,
                ..plain
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Page size and margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
}

impl PageGeometry {
    /// US letter (8.5" × 11"), 640-twip top/bottom and 680-twip side margins.
    pub const fn letter() -> Self {
        PageGeometry {
            width: 12240,
            height: 15840,
            margin_top: 640,
            margin_bottom: 640,
            margin_left: 680,
            margin_right: 680,
        }
    }

    pub fn width_pt(&self) -> f32 {
        self.width as f32 / TWIPS_PER_POINT
    }

    pub fn height_pt(&self) -> f32 {
        self.height as f32 / TWIPS_PER_POINT
    }

    pub fn left_pt(&self) -> f32 {
        self.margin_left as f32 / TWIPS_PER_POINT
    }

    /// Y of the first line's top edge, measured from the page bottom.
    pub fn top_y(&self) -> f32 {
        self.height_pt() - self.margin_top as f32 / TWIPS_PER_POINT
    }

    /// Lowest Y a line may extend to.
    pub fn bottom_y(&self) -> f32 {
        self.margin_bottom as f32 / TWIPS_PER_POINT
    }

    pub fn content_width_pt(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right) as f32 / TWIPS_PER_POINT
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}
