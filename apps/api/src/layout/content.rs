//! Canonical content model: the exact paragraphs that get printed.
//!
//! Sections follow the order of the original document. Known sections the
//! original lacked are appended in [`DEFAULT_SECTION_ORDER`] when the resume has
//! content for them. Every string goes through [`clean`], so no empty or
//! null-like paragraph is ever emitted, and a section without body paragraphs
//! emits no heading.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::layout::sanitize::{clean, clean_opt};
use crate::layout::skills::normalize_skill_lines;
use crate::layout::style::{ParagraphRole, ParagraphStyle};
use crate::layout::wrap::{strip_bullet_prefix, BULLET_GLYPH};
use crate::models::{
    EducationEntry, ExperienceEntry, ProjectEntry, SectionKind, SourceLayout, SourceSection,
    TailoredResume,
};

pub const DEFAULT_SECTION_ORDER: [SectionKind; 4] = [
    SectionKind::Experience,
    SectionKind::Skills,
    SectionKind::Education,
    SectionKind::Projects,
];

pub const CONTACT_SEPARATOR: &str = " | ";

/// One typed block of printed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParagraphRole>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            role: None,
        }
    }

    pub fn skills_line(text: impl Into<String>) -> Self {
        Self {
            style: ParagraphStyle::Body,
            text: text.into(),
            role: Some(ParagraphRole::SkillsLine),
        }
    }

    pub fn is_skills_line(&self) -> bool {
        self.role == Some(ParagraphRole::SkillsLine)
    }
}

/// Joins the printable contact fields with `" | "`.
pub fn contact_line(fields: &[Option<&str>]) -> Option<String> {
    let parts: Vec<String> = fields.iter().filter_map(|f| clean_opt(*f)).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(CONTACT_SEPARATOR))
    }
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let parts: Vec<String> = [start, end].into_iter().filter_map(clean_opt).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter_map(|p| clean(p))
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn experience_header(entry: &ExperienceEntry) -> String {
    let mut header = join_present(&[&entry.title, &entry.company], ", ");
    if let Some(location) = clean_opt(entry.location.as_deref()) {
        header.push_str(&format!(" ({location})"));
    }
    if let Some(dates) = date_range(entry.start_date.as_deref(), entry.end_date.as_deref()) {
        header.push_str(&format!("  {dates}"));
    }
    header
}

pub fn education_header(entry: &EducationEntry) -> String {
    let mut header = join_present(&[&entry.degree, &entry.institution], ", ");
    if let Some(dates) = date_range(entry.start_date.as_deref(), entry.end_date.as_deref()) {
        header.push_str(&format!(" - {dates}"));
    }
    header
}

pub fn project_header(entry: &ProjectEntry) -> String {
    let technologies = entry
        .technologies
        .iter()
        .filter_map(|t| clean(t))
        .collect::<Vec<_>>()
        .join(", ");
    if technologies.is_empty() {
        entry.name.clone()
    } else {
        format!("{}: {}", entry.name, technologies)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Paragraph sink that drops anything that sanitizes to nothing.
#[derive(Default)]
struct Sink {
    paragraphs: Vec<Paragraph>,
}

impl Sink {
    fn push(&mut self, style: ParagraphStyle, text: &str) {
        if let Some(text) = clean(text) {
            self.paragraphs.push(Paragraph::new(style, text));
        }
    }

    fn push_skills(&mut self, text: &str) {
        if let Some(text) = clean(text) {
            self.paragraphs.push(Paragraph::skills_line(text));
        }
    }

    fn push_bullet(&mut self, text: &str) {
        if let Some(text) = clean(strip_bullet_prefix(text)) {
            self.paragraphs
                .push(Paragraph::new(ParagraphStyle::Bullet, format!("{BULLET_GLYPH} {text}")));
        }
    }

    fn push_raw_lines(&mut self, section: Option<&SourceSection>) {
        for line in section.map(|s| s.lines.as_slice()).unwrap_or(&[]) {
            self.push(ParagraphStyle::Body, line);
        }
    }
}

/// Builds the printed paragraph sequence for a resume snapshot.
pub fn build_paragraphs(resume: &TailoredResume, layout: &SourceLayout) -> Vec<Paragraph> {
    let mut out = Sink::default();
    out.push(ParagraphStyle::Name, &resume.name);
    if let Some(contact) = contact_line(&resume.contact.fields()) {
        out.push(ParagraphStyle::Contact, &contact);
    }

    let mut emitted: HashSet<SectionKind> = HashSet::new();
    for section in &layout.sections {
        // A repeated known kind only prints its raw lines.
        let kind = if section.kind == SectionKind::Custom || emitted.insert(section.kind) {
            section.kind
        } else {
            SectionKind::Custom
        };
        let heading = clean(&section.heading)
            .unwrap_or_else(|| section.kind.default_heading().to_string());
        emit_section(&mut out, resume, kind, &heading, Some(section));
    }

    for kind in DEFAULT_SECTION_ORDER {
        if !emitted.contains(&kind) && has_content(resume, kind) {
            emit_section(&mut out, resume, kind, kind.default_heading(), None);
        }
    }

    out.paragraphs
}

fn has_content(resume: &TailoredResume, kind: SectionKind) -> bool {
    match kind {
        SectionKind::Summary => clean_opt(resume.summary.as_deref()).is_some(),
        SectionKind::Skills => !normalize_skill_lines(&resume.skills).is_empty(),
        SectionKind::Experience => !resume.experience.is_empty(),
        SectionKind::Education => !resume.education.is_empty(),
        SectionKind::Projects => !resume.projects.is_empty(),
        SectionKind::Custom => false,
    }
}

fn emit_section(
    out: &mut Sink,
    resume: &TailoredResume,
    kind: SectionKind,
    heading: &str,
    source: Option<&SourceSection>,
) {
    let mut body = Sink::default();
    match kind {
        SectionKind::Summary => match clean_opt(resume.summary.as_deref()) {
            Some(summary) => body.push(ParagraphStyle::Body, &summary),
            None => body.push_raw_lines(source),
        },
        SectionKind::Skills => {
            let lines = normalize_skill_lines(&resume.skills);
            if lines.is_empty() {
                body.push_raw_lines(source);
            }
            for line in &lines {
                body.push_skills(line);
            }
        }
        SectionKind::Experience => {
            if resume.experience.is_empty() {
                body.push_raw_lines(source);
            }
            for entry in &resume.experience {
                body.push(ParagraphStyle::EntryHeader, &experience_header(entry));
                for bullet in &entry.bullets {
                    body.push_bullet(bullet);
                }
            }
        }
        SectionKind::Education => {
            if resume.education.is_empty() {
                body.push_raw_lines(source);
            }
            for (index, entry) in resume.education.iter().enumerate() {
                body.push(ParagraphStyle::EntryHeader, &education_header(entry));
                if let Some(gpa) = clean_opt(entry.gpa.as_deref()) {
                    body.push(ParagraphStyle::Body, &format!("GPA: {gpa}"));
                }
                if let Some(honors) = clean_opt(entry.honors.as_deref()) {
                    body.push(ParagraphStyle::Body, &honors);
                }
                for line in source.map(|s| s.detail_lines_for(index)).unwrap_or(&[]) {
                    body.push(ParagraphStyle::Body, line);
                }
            }
        }
        SectionKind::Projects => {
            if resume.projects.is_empty() {
                body.push_raw_lines(source);
            }
            for entry in &resume.projects {
                body.push(ParagraphStyle::EntryHeader, &project_header(entry));
                for bullet in &entry.bullets {
                    body.push_bullet(bullet);
                }
            }
        }
        SectionKind::Custom => body.push_raw_lines(source),
    }

    if body.paragraphs.is_empty() {
        return;
    }
    out.push(ParagraphStyle::SectionHeading, heading);
    out.paragraphs.append(&mut body.paragraphs);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::sanitize::sanitize;
    use crate::models::{ContactInfo, EducationDetail, SourceSection};

    fn make_resume() -> TailoredResume {
        TailoredResume {
            name: "Grace Hopper".to_string(),
            contact: ContactInfo {
                email: Some("grace@example.com".to_string()),
                phone: Some("n/a".to_string()),
                linkedin: None,
                github: Some("  github.com/grace ".to_string()),
                website: Some(String::new()),
            },
            summary: Some("Compiler pioneer —  builds   tools.".to_string()),
            skills: vec!["Languages: COBOL, FORTRAN".to_string()],
            experience: vec![ExperienceEntry {
                title: "Rear Admiral".to_string(),
                company: "US Navy".to_string(),
                location: Some("Arlington, VA".to_string()),
                start_date: Some("1967".to_string()),
                end_date: Some("1986".to_string()),
                bullets: vec![
                    "• Standardized COBOL across the fleet".to_string(),
                    "null".to_string(),
                    "Ran the programming languages group".to_string(),
                ],
            }],
            education: vec![EducationEntry {
                degree: "PhD Mathematics".to_string(),
                institution: "Yale".to_string(),
                start_date: None,
                end_date: Some("1934".to_string()),
                gpa: Some("undefined".to_string()),
                honors: Some("Sigma Xi".to_string()),
            }],
            projects: vec![],
        }
    }

    fn styles(paragraphs: &[Paragraph]) -> Vec<ParagraphStyle> {
        paragraphs.iter().map(|p| p.style).collect()
    }

    #[test]
    fn test_contact_line_drops_blank_and_null_fields() {
        assert_eq!(
            contact_line(&[Some(""), None, Some("linkedin.com/in/x")]),
            Some("linkedin.com/in/x".to_string())
        );
        assert_eq!(contact_line(&[None, Some("N/A"), Some("  ")]), None);
    }

    #[test]
    fn test_single_contact_field_yields_single_paragraph() {
        let resume = TailoredResume {
            name: "X".to_string(),
            contact: ContactInfo {
                email: Some(String::new()),
                phone: None,
                linkedin: Some("linkedin.com/in/x".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let paragraphs = build_paragraphs(&resume, &SourceLayout::default());
        let contacts: Vec<_> = paragraphs
            .iter()
            .filter(|p| p.style == ParagraphStyle::Contact)
            .collect();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].text, "linkedin.com/in/x");
    }

    #[test]
    fn test_default_order_without_layout() {
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let headings: Vec<&str> = paragraphs
            .iter()
            .filter(|p| p.style == ParagraphStyle::SectionHeading)
            .map(|p| p.text.as_str())
            .collect();
        // Summary is not part of the default order.
        assert_eq!(headings, vec!["Experience", "Skills", "Education"]);
        assert_eq!(paragraphs[0], Paragraph::new(ParagraphStyle::Name, "Grace Hopper"));
        assert_eq!(paragraphs[1].text, "grace@example.com | github.com/grace");
    }

    #[test]
    fn test_layout_order_and_headings_are_respected() {
        let layout = SourceLayout {
            sections: vec![
                SourceSection::new(SectionKind::Summary, "PROFILE"),
                SourceSection::new(SectionKind::Education, "Academic Background"),
                SourceSection::new(SectionKind::Experience, ""),
            ],
        };
        let paragraphs = build_paragraphs(&make_resume(), &layout);
        let headings: Vec<&str> = paragraphs
            .iter()
            .filter(|p| p.style == ParagraphStyle::SectionHeading)
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(
            headings,
            vec!["PROFILE", "Academic Background", "Experience", "Skills"]
        );
        let summary = &paragraphs[3];
        assert_eq!(summary.text, "Compiler pioneer - builds tools.");
    }

    #[test]
    fn test_experience_entry_paragraphs() {
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let header = paragraphs
            .iter()
            .find(|p| p.style == ParagraphStyle::EntryHeader)
            .unwrap();
        // The two-space separator collapses under sanitization.
        assert_eq!(header.text, "Rear Admiral, US Navy (Arlington, VA) 1967 - 1986");
        let bullets: Vec<&str> = paragraphs
            .iter()
            .filter(|p| p.style == ParagraphStyle::Bullet)
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(
            bullets,
            vec![
                "• Standardized COBOL across the fleet",
                "• Ran the programming languages group"
            ]
        );
    }

    #[test]
    fn test_education_with_details_from_layout() {
        let mut section = SourceSection::new(SectionKind::Education, "Education");
        section.education_details = vec![EducationDetail {
            entry_index: 0,
            lines: vec!["Thesis: New Types of Irreducibility Criteria".to_string()],
        }];
        let layout = SourceLayout {
            sections: vec![section],
        };
        let paragraphs = build_paragraphs(&make_resume(), &layout);
        let idx = paragraphs
            .iter()
            .position(|p| p.text == "PhD Mathematics, Yale - 1934")
            .unwrap();
        // GPA "undefined" is dropped.
        assert_eq!(paragraphs[idx + 1].text, "Sigma Xi");
        assert_eq!(
            paragraphs[idx + 2].text,
            "Thesis: New Types of Irreducibility Criteria"
        );
    }

    #[test]
    fn test_skills_lines_carry_role() {
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        let skills: Vec<&Paragraph> = paragraphs.iter().filter(|p| p.is_skills_line()).collect();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].text, "Languages: COBOL, FORTRAN");
        assert_eq!(skills[0].style, ParagraphStyle::Body);
    }

    #[test]
    fn test_fallback_to_raw_lines_when_resume_section_empty() {
        let resume = TailoredResume {
            name: "X".to_string(),
            ..Default::default()
        };
        let layout = SourceLayout {
            sections: vec![
                SourceSection::new(SectionKind::Experience, "Work")
                    .with_lines(["Acme 2020 - 2022", "", "Built widgets"]),
                SourceSection::new(SectionKind::Projects, "Projects"),
            ],
        };
        let paragraphs = build_paragraphs(&resume, &layout);
        assert_eq!(
            styles(&paragraphs),
            vec![
                ParagraphStyle::Name,
                ParagraphStyle::SectionHeading,
                ParagraphStyle::Body,
                ParagraphStyle::Body
            ]
        );
        // Project section had nothing to print, so no heading either.
        assert!(!paragraphs.iter().any(|p| p.text == "Projects"));
    }

    #[test]
    fn test_custom_section_lines_verbatim() {
        let lines: Vec<String> = (1..=7).map(|i| format!("Award number {i}")).collect();
        let layout = SourceLayout {
            sections: vec![SourceSection::new(SectionKind::Custom, "Awards").with_lines(lines.clone())],
        };
        let paragraphs = build_paragraphs(&make_resume(), &layout);
        let start = paragraphs.iter().position(|p| p.text == "Awards").unwrap();
        let body: Vec<&str> = paragraphs[start + 1..start + 8]
            .iter()
            .map(|p| {
                assert_eq!(p.style, ParagraphStyle::Body);
                p.text.as_str()
            })
            .collect();
        assert_eq!(body, lines.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_project_header_formats() {
        let with_tech = ProjectEntry {
            name: "Compiler".to_string(),
            technologies: vec!["A-0".to_string(), " ".to_string(), "FLOW-MATIC".to_string()],
            bullets: vec![],
        };
        assert_eq!(project_header(&with_tech), "Compiler: A-0, FLOW-MATIC");
        let bare = ProjectEntry {
            name: "Compiler".to_string(),
            ..Default::default()
        };
        assert_eq!(project_header(&bare), "Compiler");
    }

    #[test]
    fn test_every_paragraph_is_sanitized_and_non_empty() {
        let paragraphs = build_paragraphs(&make_resume(), &SourceLayout::default());
        for p in &paragraphs {
            assert!(!p.text.is_empty());
            assert_eq!(sanitize(&p.text), p.text);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let resume = make_resume();
        let layout = SourceLayout::default();
        assert_eq!(build_paragraphs(&resume, &layout), build_paragraphs(&resume, &layout));
    }
}
