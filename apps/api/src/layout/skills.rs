//! Skills normalization and category-aware trimming.

use serde::{Deserialize, Serialize};

use crate::layout::sanitize::clean;

/// Skill categories, listed in the order they are trimmed (first goes first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Other,
    Tools,
    Frameworks,
    Cloud,
    Languages,
}

impl SkillCategory {
    pub const TRIM_ORDER: [SkillCategory; 5] = [
        SkillCategory::Other,
        SkillCategory::Tools,
        SkillCategory::Frameworks,
        SkillCategory::Cloud,
        SkillCategory::Languages,
    ];

    /// Items a category keeps during the first trimming pass.
    pub fn minimum_items(self) -> usize {
        match self {
            SkillCategory::Languages => 3,
            SkillCategory::Frameworks | SkillCategory::Cloud => 2,
            SkillCategory::Tools | SkillCategory::Other => 0,
        }
    }

    /// Classifies a line by its label (`"Languages: ..."`).
    pub fn of_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return SkillCategory::Other;
        };
        let label = label.to_lowercase();
        if label.contains("language") {
            SkillCategory::Languages
        } else if label.contains("framework") || label.contains("librar") {
            SkillCategory::Frameworks
        } else if label.contains("cloud")
            || label.contains("devops")
            || label.contains("infra")
            || label.contains("platform")
        {
            SkillCategory::Cloud
        } else if label.contains("tool") || label.contains("database") || label.contains("data") {
            SkillCategory::Tools
        } else {
            SkillCategory::Other
        }
    }
}

/// A normalized skills line: optional label plus comma-separated items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLine {
    pub label: Option<String>,
    pub items: Vec<String>,
}

impl SkillLine {
    pub fn parse(line: &str) -> Self {
        let (label, rest) = match line.split_once(':') {
            Some((label, rest)) => (clean(label), rest),
            None => (None, line),
        };
        let items = rest.split(',').filter_map(clean).collect();
        SkillLine { label, items }
    }

    pub fn category(&self) -> SkillCategory {
        SkillCategory::of_label(self.label.as_deref())
    }

    pub fn render(&self) -> String {
        let items = self.items.join(", ");
        match &self.label {
            Some(label) if items.is_empty() => format!("{label}:"),
            Some(label) => format!("{label}: {items}"),
            None => items,
        }
    }
}

/// Splits skills on newlines and `|`, collapses whitespace, and merges runs of
/// unlabeled items into one comma-separated line.
pub fn normalize_skill_lines(skills: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut loose: Vec<String> = Vec::new();
    for piece in skills
        .iter()
        .flat_map(|s| s.split(['\n', '|']))
        .filter_map(clean)
    {
        if piece.contains(':') {
            if !loose.is_empty() {
                lines.push(std::mem::take(&mut loose).join(", "));
            }
            lines.push(piece);
        } else {
            loose.push(piece);
        }
    }
    if !loose.is_empty() {
        lines.push(loose.join(", "));
    }
    lines
}

/// Removes one skill, lowest-value category first. Returns `None` once nothing
/// more can be removed.
///
/// Passes, in order: drop the last item of a line while its category stays
/// above its minimum; drop the last item of any line with two or more items;
/// drop a whole line.
pub fn remove_one_skill(skills: &[String]) -> Option<Vec<String>> {
    let mut lines: Vec<SkillLine> = skills.iter().map(|s| SkillLine::parse(s)).collect();

    let category_total = |lines: &[SkillLine], category: SkillCategory| -> usize {
        lines
            .iter()
            .filter(|l| l.category() == category)
            .map(|l| l.items.len())
            .sum()
    };

    let with_floor = SkillCategory::TRIM_ORDER.iter().find_map(|&category| {
        if category_total(&lines, category) <= category.minimum_items() {
            return None;
        }
        lines
            .iter()
            .rposition(|l| l.category() == category && l.items.len() >= 2)
    });

    let target = with_floor.or_else(|| {
        SkillCategory::TRIM_ORDER.iter().find_map(|&category| {
            lines
                .iter()
                .rposition(|l| l.category() == category && l.items.len() >= 2)
        })
    });

    match target {
        Some(idx) => {
            lines[idx].items.pop();
        }
        None => {
            let idx = SkillCategory::TRIM_ORDER.iter().find_map(|&category| {
                lines.iter().rposition(|l| l.category() == category)
            })?;
            lines.remove(idx);
        }
    }

    Some(lines.iter().map(SkillLine::render).collect())
}
