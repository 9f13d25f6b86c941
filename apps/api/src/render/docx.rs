//! Flow-markup renderer: a minimal WordprocessingML package.
//!
//! Word reflows text itself, so every planned line boundary is written as an
//! explicit `<w:br/>` (or a page break) between runs. A page break before a
//! paragraph's first line becomes `<w:pageBreakBefore/>` instead, so no
//! paragraph opens with a break run. Exact line spacing keeps Word from
//! fitting more lines per page than the planner did.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::layout::paginate::{LineBreak, PaginationPlan, PlannedParagraph};
use crate::layout::style::{
    line_height_for, PageGeometry, ParagraphStyle, StyleOptions, StyleTable, TWIPS_PER_POINT,
};
use crate::layout::wrap::BULLET_GLYPH;
use crate::render::{check_page_count, DocumentMeta, RenderError, RenderedDocument};

const FONT_NAME: &str = "Times New Roman";
const LINE_BREAK_RUN: &str = "<w:r><w:br/></w:r>";
const PAGE_BREAK_RUN: &str = r#"<w:r><w:br w:type="page"/></w:r>"#;
const PAGE_BREAK_BEFORE: &str = "<w:pageBreakBefore/>";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

// ────────────────────────────────────────────────────────────────────────────
// Property mapping
// ────────────────────────────────────────────────────────────────────────────

pub fn escape_xml_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Exact line pitch in twips for a font size in half-points.
pub fn line_pitch_twips(size_half_points: u32) -> u32 {
    (line_height_for(size_half_points as f32 / 2.0) * TWIPS_PER_POINT).round() as u32
}

/// `<w:pPr>` for one archetype, in native units.
pub fn paragraph_properties(options: &StyleOptions, page_break_before: bool) -> String {
    let mut xml = String::from("<w:pPr>");
    if page_break_before {
        xml.push_str(PAGE_BREAK_BEFORE);
    }
    if options.section_divider {
        xml.push_str(
            r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/></w:pBdr>"#,
        );
    }
    xml.push_str(&format!(
        r#"<w:spacing w:before="{}" w:after="{}" w:line="{}" w:lineRule="exact"/>"#,
        options.spacing_before,
        options.spacing_after,
        line_pitch_twips(options.size_half_points)
    ));
    if options.indent_left > 0 || options.indent_hanging > 0 {
        xml.push_str(&format!(r#"<w:ind w:left="{}""#, options.indent_left));
        if options.indent_hanging > 0 {
            xml.push_str(&format!(r#" w:hanging="{}""#, options.indent_hanging));
        }
        xml.push_str("/>");
    }
    if options.centered {
        xml.push_str(r#"<w:jc w:val="center"/>"#);
    }
    xml.push_str("</w:pPr>");
    xml
}

/// `<w:rPr>` for a run.
pub fn run_properties(bold: bool, italic: bool, size_half_points: u32) -> String {
    let mut xml = format!(
        r#"<w:rPr><w:rFonts w:ascii="{FONT_NAME}" w:hAnsi="{FONT_NAME}" w:cs="{FONT_NAME}"/>"#
    );
    if bold {
        xml.push_str("<w:b/>");
    }
    if italic {
        xml.push_str("<w:i/>");
    }
    xml.push_str(&format!(
        r#"<w:sz w:val="{size_half_points}"/><w:szCs w:val="{size_half_points}"/></w:rPr>"#
    ));
    xml
}

// ────────────────────────────────────────────────────────────────────────────
// Runs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Runs {
    xml: String,
    /// Set when the paragraph's first line opens a page.
    page_break_before: bool,
}

impl Runs {
    fn brk(&mut self, kind: LineBreak) {
        match kind {
            LineBreak::None => {}
            LineBreak::Line => self.xml.push_str(LINE_BREAK_RUN),
            LineBreak::Page if self.xml.is_empty() => self.page_break_before = true,
            LineBreak::Page => self.xml.push_str(PAGE_BREAK_RUN),
        }
    }

    fn text(&mut self, rpr: &str, text: &str) {
        if text.is_empty() {
            return;
        }
        self.xml.push_str(&format!(
            r#"<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml_text(text)
        ));
    }

    fn bullet_glyph(&mut self, rpr: &str) {
        self.xml
            .push_str(&format!("<w:r>{rpr}<w:t>{BULLET_GLYPH}</w:t><w:tab/></w:r>"));
    }
}

fn bullet_runs(planned: &PlannedParagraph, rpr: &str, runs: &mut Runs) {
    let mut pending = String::new();
    for (index, line) in planned.lines.iter().enumerate() {
        if index == 0 {
            runs.brk(line.break_before);
            if line.bullet_marker {
                runs.bullet_glyph(rpr);
            }
            pending.push_str(&line.text);
            continue;
        }
        match line.break_before {
            LineBreak::None => {
                if !pending.is_empty() {
                    pending.push(' ');
                }
                pending.push_str(&line.text);
            }
            kind => {
                runs.text(rpr, &pending);
                runs.brk(kind);
                pending = line.text.clone();
            }
        }
    }
    runs.text(rpr, &pending);
}

fn paragraph_xml(planned: &PlannedParagraph, styles: &StyleTable) -> String {
    let options = styles.get(planned.paragraph.style);
    let rpr = run_properties(options.bold, options.italic, options.size_half_points);
    let mut runs = Runs::default();

    if planned.paragraph.style == ParagraphStyle::Bullet {
        bullet_runs(planned, &rpr, &mut runs);
    } else if planned.paragraph.is_skills_line() {
        let label_rpr = run_properties(true, options.italic, options.size_half_points);
        for line in &planned.lines {
            runs.brk(line.break_before);
            if let Some(label) = &line.skills_label {
                runs.text(&label_rpr, &format!("{label} "));
            }
            runs.text(&rpr, &line.text);
        }
    } else {
        for line in &planned.lines {
            runs.brk(line.break_before);
            runs.text(&rpr, &line.text);
        }
    }

    format!(
        "<w:p>{}{}</w:p>",
        paragraph_properties(options, runs.page_break_before),
        runs.xml
    )
}

fn section_properties(geometry: &PageGeometry) -> String {
    format!(
        r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr>"#,
        geometry.width,
        geometry.height,
        geometry.margin_top,
        geometry.margin_right,
        geometry.margin_bottom,
        geometry.margin_left
    )
}

/// The `word/document.xml` part for `plan`.
pub fn document_xml(plan: &PaginationPlan, styles: &StyleTable, geometry: &PageGeometry) -> String {
    let body: String = plan
        .paragraphs
        .iter()
        .map(|p| paragraph_xml(p, styles))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORD_NS}"><w:body>{body}{}</w:body></w:document>"#,
        section_properties(geometry)
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Package parts
// ────────────────────────────────────────────────────────────────────────────

fn styles_xml(styles: &StyleTable) -> String {
    let body = &styles.body;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{WORD_NS}"><w:docDefaults><w:rPrDefault>{}</w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/>{}</w:style></w:styles>"#,
        run_properties(false, false, body.size_half_points),
        paragraph_properties(body, false)
    )
}

fn core_xml(meta: &DocumentMeta) -> String {
    let created = meta
        .created
        .map(|c| {
            format!(
                r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
                c.format("%Y-%m-%dT%H:%M:%SZ")
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>{}</dc:creator>{created}</cp:coreProperties>"#,
        escape_xml_text(&meta.title),
        escape_xml_text(&meta.author)
    )
}

fn app_xml(page_count: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>onepage-api</Application><Pages>{page_count}</Pages></Properties>"#
    )
}

/// Writes the DOCX package for `plan`.
pub fn render_docx(
    plan: &PaginationPlan,
    styles: &StyleTable,
    geometry: &PageGeometry,
    meta: &DocumentMeta,
) -> Result<RenderedDocument, RenderError> {
    let document = document_xml(plan, styles, geometry);
    let breaks =
        document.matches(PAGE_BREAK_RUN).count() + document.matches(PAGE_BREAK_BEFORE).count();
    let page_count = breaks as u32 + 1;
    check_page_count(plan.page_count, page_count)?;

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("docProps/core.xml", core_xml(meta)),
        ("docProps/app.xml", app_xml(page_count)),
        ("word/styles.xml", styles_xml(styles)),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("word/document.xml", document),
    ];

    // Fixed entry timestamps keep identical plans byte-identical.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, xml) in &parts {
        zip.start_file(*name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    let bytes = zip.finish()?.into_inner();

    debug!(pages = page_count, bytes = bytes.len(), "docx rendered");
    Ok(RenderedDocument { bytes, page_count })
}

#[cfg(test)]
pub(crate) fn read_part(bytes: &[u8], name: &str) -> Result<String, RenderError> {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::content::Paragraph;
    use crate::layout::paginate::PlannedLine;

    fn line(break_before: LineBreak, text: &str) -> PlannedLine {
        PlannedLine {
            break_before,
            text: text.to_string(),
            skills_label: None,
            bullet_marker: false,
        }
    }

    fn planned(paragraph: Paragraph, lines: Vec<PlannedLine>) -> PlannedParagraph {
        let style = StyleTable::default().get(paragraph.style).resolve();
        PlannedParagraph {
            paragraph,
            style,
            lines,
        }
    }

    #[test]
    fn test_paragraph_properties_for_heading() {
        let xml = paragraph_properties(&StyleTable::default().section_heading, false);
        assert!(xml.contains(r#"<w:bottom w:val="single""#));
        // 11pt * 1.24 = 13.64pt = 272.8 twips
        assert!(xml.contains(r#"<w:spacing w:before="140" w:after="60" w:line="273" w:lineRule="exact"/>"#));
        assert!(!xml.contains("<w:jc"));
        assert!(!xml.contains(PAGE_BREAK_BEFORE));
    }

    #[test]
    fn test_paragraph_properties_for_bullet_and_name() {
        let styles = StyleTable::default();
        let bullet = paragraph_properties(&styles.bullet, false);
        assert!(bullet.contains(r#"<w:ind w:left="360" w:hanging="216"/>"#));
        let name = paragraph_properties(&styles.name, false);
        assert!(name.contains(r#"<w:jc w:val="center"/>"#));
        assert!(!name.contains("<w:ind"));
    }

    #[test]
    fn test_line_pitch_has_twelve_point_floor() {
        assert_eq!(line_pitch_twips(16), 240);
        assert_eq!(line_pitch_twips(20), 248);
    }

    #[test]
    fn test_escape_xml_text() {
        assert_eq!(escape_xml_text(r#"R&D <"x"> 'y'"#), "R&amp;D &lt;&quot;x&quot;&gt; &apos;y&apos;");
    }

    #[test]
    fn test_body_lines_separated_by_breaks() {
        let p = planned(
            Paragraph::new(ParagraphStyle::Body, "one two three"),
            vec![
                line(LineBreak::None, "one"),
                line(LineBreak::Line, "two"),
                line(LineBreak::Page, "three"),
            ],
        );
        let xml = paragraph_xml(&p, &StyleTable::default());
        let one = xml.find(">one<").unwrap();
        let br = xml.find(LINE_BREAK_RUN).unwrap();
        let two = xml.find(">two<").unwrap();
        let page = xml.find(PAGE_BREAK_RUN).unwrap();
        let three = xml.find(">three<").unwrap();
        assert!(one < br && br < two && two < page && page < three);
    }

    #[test]
    fn test_page_break_on_first_line_moves_into_paragraph_properties() {
        let p = planned(
            Paragraph::new(ParagraphStyle::Body, "Volunteer tutor"),
            vec![line(LineBreak::Page, "Volunteer"), line(LineBreak::Line, "tutor")],
        );
        let xml = paragraph_xml(&p, &StyleTable::default());
        assert!(xml.starts_with(&format!("<w:p><w:pPr>{PAGE_BREAK_BEFORE}")));
        assert!(!xml.contains(PAGE_BREAK_RUN));
        let text = xml.find(">Volunteer<").unwrap();
        assert!(xml.find("</w:pPr><w:r><w:rPr>").unwrap() < text);
        assert!(xml.contains(LINE_BREAK_RUN));
    }

    #[test]
    fn test_bullet_opening_a_page_keeps_glyph_first() {
        let mut first = line(LineBreak::Page, "Led the migration");
        first.bullet_marker = true;
        let p = planned(Paragraph::new(ParagraphStyle::Bullet, "• Led the migration"), vec![first]);
        let xml = paragraph_xml(&p, &StyleTable::default());
        assert!(xml.contains(PAGE_BREAK_BEFORE));
        assert!(!xml.contains(PAGE_BREAK_RUN));
        assert!(xml.contains("</w:pPr><w:r><w:rPr>"));
        assert!(xml.find("<w:t>•</w:t>").unwrap() < xml.find(">Led the migration<").unwrap());
    }

    #[test]
    fn test_page_break_before_counts_as_a_page() {
        let plan = PaginationPlan {
            paragraphs: vec![
                planned(
                    Paragraph::new(ParagraphStyle::Body, "first"),
                    vec![line(LineBreak::None, "first")],
                ),
                planned(
                    Paragraph::new(ParagraphStyle::Body, "second"),
                    vec![line(LineBreak::Page, "second")],
                ),
            ],
            page_count: 2,
        };
        let out = render_docx(
            &plan,
            &StyleTable::default(),
            &PageGeometry::letter(),
            &DocumentMeta::default(),
        )
        .unwrap();
        assert_eq!(out.page_count, 2);
        let document = read_part(&out.bytes, "word/document.xml").unwrap();
        assert_eq!(document.matches(PAGE_BREAK_BEFORE).count(), 1);
        let app = read_part(&out.bytes, "docProps/app.xml").unwrap();
        assert!(app.contains("<Pages>2</Pages>"));
    }

    #[test]
    fn test_bullet_glyph_then_lines() {
        let mut first = line(LineBreak::None, "Led the migration");
        first.bullet_marker = true;
        let p = planned(
            Paragraph::new(ParagraphStyle::Bullet, "• Led the migration to Rust"),
            vec![first, line(LineBreak::Line, "to Rust")],
        );
        let xml = paragraph_xml(&p, &StyleTable::default());
        assert_eq!(xml.matches("<w:t>•</w:t><w:tab/>").count(), 1);
        assert!(xml.contains(">Led the migration</w:t>"));
        assert!(xml.contains(&format!("{LINE_BREAK_RUN}<w:r>")));
        assert!(xml.contains(">to Rust</w:t>"));
    }

    #[test]
    fn test_bullet_lines_without_breaks_are_joined() {
        let mut first = line(LineBreak::None, "Led the");
        first.bullet_marker = true;
        let p = planned(
            Paragraph::new(ParagraphStyle::Bullet, "• Led the migration"),
            vec![first, line(LineBreak::None, "migration")],
        );
        let xml = paragraph_xml(&p, &StyleTable::default());
        assert!(xml.contains(">Led the migration</w:t>"));
        assert!(!xml.contains(LINE_BREAK_RUN));
    }

    #[test]
    fn test_skills_label_run_is_bold() {
        let mut first = line(LineBreak::None, "Go, Rust");
        first.skills_label = Some("Languages:".to_string());
        let p = planned(Paragraph::skills_line("Languages: Go, Rust"), vec![first]);
        let xml = paragraph_xml(&p, &StyleTable::default());
        let bold_label = format!(
            r#"{}<w:t xml:space="preserve">Languages: </w:t>"#,
            run_properties(true, false, 20)
        );
        assert!(xml.contains(&bold_label));
        assert!(xml.contains(">Go, Rust</w:t>"));
    }

    #[test]
    fn test_package_contains_all_parts() {
        let plan = PaginationPlan {
            paragraphs: vec![planned(
                Paragraph::new(ParagraphStyle::Name, "Annie Easley"),
                vec![line(LineBreak::None, "Annie Easley")],
            )],
            page_count: 1,
        };
        let out = render_docx(
            &plan,
            &StyleTable::default(),
            &PageGeometry::letter(),
            &DocumentMeta::for_resume("Annie Easley"),
        )
        .unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
            "word/document.xml",
        ] {
            assert!(read_part(&out.bytes, part).is_ok(), "missing {part}");
        }
        let document = read_part(&out.bytes, "word/document.xml").unwrap();
        assert!(document.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        assert!(document.contains(r#"w:top="640" w:right="680" w:bottom="640" w:left="680""#));
        let core = read_part(&out.bytes, "docProps/core.xml").unwrap();
        assert!(core.contains("<dc:title>Annie Easley - Resume</dc:title>"));
        assert!(!core.contains("dcterms:created"));
    }

    #[test]
    fn test_page_count_mismatch_is_an_error() {
        let plan = PaginationPlan {
            paragraphs: vec![planned(
                Paragraph::new(ParagraphStyle::Body, "x"),
                vec![line(LineBreak::None, "x")],
            )],
            page_count: 2,
        };
        let err = render_docx(
            &plan,
            &StyleTable::default(),
            &PageGeometry::letter(),
            &DocumentMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::PageCountMismatch { .. }));
    }
}
