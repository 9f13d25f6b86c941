use serde::{Deserialize, Serialize};

/// The kind of a section found in the original document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Custom,
}

impl SectionKind {
    /// Heading used when the original document did not supply one.
    pub fn default_heading(self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Skills => "Skills",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Projects => "Projects",
            SectionKind::Custom => "",
        }
    }
}

/// Freeform lines attached to one education entry (coursework, research, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EducationDetail {
    /// Index into `TailoredResume::education`.
    pub entry_index: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSection {
    pub kind: SectionKind,
    #[serde(default)]
    pub heading: String,
    /// Raw lines of the section body as they appeared in the upload.
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub education_details: Vec<EducationDetail>,
}

impl SourceSection {
    pub fn new(kind: SectionKind, heading: impl Into<String>) -> Self {
        Self {
            kind,
            heading: heading.into(),
            lines: Vec::new(),
            education_details: Vec::new(),
        }
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn detail_lines_for(&self, entry_index: usize) -> &[String] {
        self.education_details
            .iter()
            .find(|d| d.entry_index == entry_index)
            .map(|d| d.lines.as_slice())
            .unwrap_or(&[])
    }
}

/// Section structure of the original upload. Read-only for an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLayout {
    #[serde(default)]
    pub sections: Vec<SourceSection>,
}

impl SourceLayout {
    #[cfg(test)]
    pub fn section(&self, kind: SectionKind) -> Option<&SourceSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Number of raw lines in custom sections. These are never trimmed.
    pub fn custom_line_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::Custom)
            .map(|s| s.lines.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_kind_serde_snake_case() {
        let kind: SectionKind = serde_json::from_str(r#""experience""#).unwrap();
        assert_eq!(kind, SectionKind::Experience);
        assert_eq!(serde_json::to_string(&SectionKind::Custom).unwrap(), r#""custom""#);
    }

    #[test]
    fn test_detail_lines_for_unknown_entry_is_empty() {
        let section = SourceSection::new(SectionKind::Education, "Education");
        assert!(section.detail_lines_for(3).is_empty());
    }

    #[test]
    fn test_custom_line_count() {
        let layout = SourceLayout {
            sections: vec![
                SourceSection::new(SectionKind::Custom, "Awards").with_lines(["a", "b"]),
                SourceSection::new(SectionKind::Skills, "Skills").with_lines(["c"]),
                SourceSection::new(SectionKind::Custom, "Talks").with_lines(["d"]),
            ],
        };
        assert_eq!(layout.custom_line_count(), 3);
    }
}
