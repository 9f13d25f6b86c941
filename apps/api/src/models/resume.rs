use serde::{Deserialize, Serialize};

/// Contact fields printed under the name. Any field may be absent or blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

impl ContactInfo {
    /// Fields in print order.
    pub fn fields(&self) -> [Option<&str>; 5] {
        [
            self.email.as_deref(),
            self.phone.as_deref(),
            self.linkedin.as_deref(),
            self.github.as_deref(),
            self.website.as_deref(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default)]
    pub honors: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// The structured, editable resume.
///
/// Values are treated as snapshots: every edit or trim produces a new
/// `TailoredResume` rather than mutating a shared one, so plans and exports
/// can always be recomputed from a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TailoredResume {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

impl TailoredResume {
    /// Rejects structurally unusable input before it reaches the layout core.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("resume name cannot be empty".to_string());
        }
        if let Some(i) = self
            .experience
            .iter()
            .position(|e| e.title.trim().is_empty() && e.company.trim().is_empty())
        {
            return Err(format!("experience entry {i} needs a title or company"));
        }
        if let Some(i) = self
            .education
            .iter()
            .position(|e| e.degree.trim().is_empty() && e.institution.trim().is_empty())
        {
            return Err(format!("education entry {i} needs a degree or institution"));
        }
        if let Some(i) = self.projects.iter().position(|p| p.name.trim().is_empty()) {
            return Err(format!("project entry {i} needs a name"));
        }
        Ok(())
    }

    pub fn bullet_count(&self) -> usize {
        self.experience.iter().map(|e| e.bullets.len()).sum::<usize>()
            + self.projects.iter().map(|p| p.bullets.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_deserializes_with_missing_optional_sections() {
        let json = r#"{"name": "Ada Lovelace"}"#;
        let resume: TailoredResume = serde_json::from_str(json).unwrap();
        assert_eq!(resume.name, "Ada Lovelace");
        assert!(resume.summary.is_none());
        assert!(resume.experience.is_empty());
        assert!(resume.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let resume = TailoredResume {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(resume.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nameless_project() {
        let resume = TailoredResume {
            name: "Ada".to_string(),
            projects: vec![ProjectEntry::default()],
            ..Default::default()
        };
        let err = resume.validate().unwrap_err();
        assert!(err.contains("project entry 0"));
    }

    #[test]
    fn test_bullet_count_spans_experience_and_projects() {
        let resume = TailoredResume {
            name: "Ada".to_string(),
            experience: vec![ExperienceEntry {
                bullets: vec!["a".into(), "b".into()],
                ..Default::default()
            }],
            projects: vec![ProjectEntry {
                name: "p".into(),
                bullets: vec!["c".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(resume.bullet_count(), 3);
    }
}
