//! Source layout extraction from the raw text of an uploaded resume.
//!
//! Lines before the first heading are the header block (name, contact) and
//! are skipped. Headings are recognized by keyword, or by the generic heading
//! shape (short all-caps line without terminal punctuation), which opens a
//! custom section once the header block is over. An all-caps line matching
//! the resume name never opens a section. In education sections, lines that start with a detail
//! keyword attach to the most recently named institution.

use regex::Regex;

use crate::layout::sanitize::sanitize;
use crate::models::{EducationDetail, SectionKind, SourceLayout, SourceSection, TailoredResume};

const MAX_HEADING_WORDS: usize = 5;

/// Compiled heading and detail patterns. Build once and share.
#[derive(Debug, Clone)]
pub struct SourceLayoutExtractor {
    keyword_headings: Vec<(SectionKind, Regex)>,
    generic_heading: Regex,
    education_detail: Regex,
}

impl SourceLayoutExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let keyword_headings = vec![
            (
                SectionKind::Summary,
                Regex::new(r"(?i)^(professional |career |executive )?(summary|profile|objective|about me)$")?,
            ),
            (
                SectionKind::Skills,
                Regex::new(r"(?i)^((technical |core |key )?skills( (&|and) (tools|technologies))?|technologies|core competencies)$")?,
            ),
            (
                SectionKind::Experience,
                Regex::new(r"(?i)^((professional |work |relevant )?experience|employment( history)?|work history|career history)$")?,
            ),
            (
                SectionKind::Education,
                Regex::new(r"(?i)^(education( (&|and) training)?|academic background)$")?,
            ),
            (
                SectionKind::Projects,
                Regex::new(r"(?i)^((personal |selected |academic |key )?projects)$")?,
            ),
        ];
        Ok(Self {
            keyword_headings,
            generic_heading: Regex::new(r"^[A-Z][A-Z0-9 &/,'-]{2,40}$")?,
            education_detail: Regex::new(
                r"(?i)^(relevant )?(coursework|research|thesis|publications?|activities|awards)\b",
            )?,
        })
    }

    /// Classifies a line as a section heading.
    pub fn heading_kind(&self, line: &str) -> Option<SectionKind> {
        let candidate = line.trim().trim_end_matches(':').trim();
        if candidate.is_empty() || candidate.split_whitespace().count() > MAX_HEADING_WORDS {
            return None;
        }
        self.keyword_headings
            .iter()
            .find(|(_, re)| re.is_match(candidate))
            .map(|(kind, _)| *kind)
            .or_else(|| {
                self.generic_heading
                    .is_match(candidate)
                    .then_some(SectionKind::Custom)
            })
    }

    pub fn extract(&self, raw_text: &str, resume: &TailoredResume) -> SourceLayout {
        let institutions: Vec<String> = resume
            .education
            .iter()
            .map(|e| e.institution.trim().to_lowercase())
            .collect();

        let name = resume.name.trim();
        let mut sections: Vec<SourceSection> = Vec::new();
        let mut current_entry: Option<usize> = None;

        for raw_line in raw_text.lines() {
            let line = sanitize(raw_line);
            if line.is_empty() {
                continue;
            }

            if let Some(kind) = self.heading_kind(&line) {
                let heading = line.trim_end_matches(':').trim();
                // Inside the header block only a keyword heading starts a section.
                let opens = kind != SectionKind::Custom
                    || (!sections.is_empty() && !heading.eq_ignore_ascii_case(name));
                if opens {
                    sections.push(SourceSection::new(kind, heading));
                    current_entry = None;
                    continue;
                }
            }

            let Some(section) = sections.last_mut() else {
                continue;
            };

            if section.kind == SectionKind::Education {
                let lowered = line.to_lowercase();
                if let Some(i) = institutions
                    .iter()
                    .position(|inst| !inst.is_empty() && lowered.contains(inst.as_str()))
                {
                    current_entry = Some(i);
                }
                if let (Some(entry_index), true) =
                    (current_entry, self.education_detail.is_match(&line))
                {
                    attach_detail(section, entry_index, line);
                    continue;
                }
            }
            section.lines.push(line);
        }

        SourceLayout { sections }
    }
}

fn attach_detail(section: &mut SourceSection, entry_index: usize, line: String) {
    match section
        .education_details
        .iter_mut()
        .find(|d| d.entry_index == entry_index)
    {
        Some(detail) => detail.lines.push(line),
        None => section.education_details.push(EducationDetail {
            entry_index,
            lines: vec![line],
        }),
    }
}
