//! One-page compaction.
//!
//! A cheap character-count estimator decides what to cut; the real planner is
//! only consulted by the optional exact verification pass in
//! [`fit_to_one_page`]. Every trim produces a new resume value. The source
//! layout is never touched, so custom sections survive unchanged.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::content::{build_paragraphs, Paragraph};
use crate::layout::font_metrics::TextMeasurer;
use crate::layout::paginate::plan_pagination;
use crate::layout::skills::{normalize_skill_lines, remove_one_skill};
use crate::layout::style::{PageGeometry, ParagraphStyle, StyleTable};
use crate::models::{SourceLayout, TailoredResume};

pub const DEFAULT_LINE_BUDGET: usize = 58;
pub const CHARS_PER_LINE: usize = 100;
pub const BULLET_CHARS_PER_LINE: usize = 90;
/// Budget reduction per exact verification round.
pub const VERIFY_BUDGET_STEP: usize = 2;
pub const MAX_VERIFY_ROUNDS: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Estimator
// ────────────────────────────────────────────────────────────────────────────

pub fn estimate_paragraph_lines(paragraph: &Paragraph) -> usize {
    let per_line = if paragraph.style == ParagraphStyle::Bullet {
        BULLET_CHARS_PER_LINE
    } else {
        CHARS_PER_LINE
    };
    let wrapped = paragraph.text.chars().count().div_ceil(per_line).max(1);
    match paragraph.style {
        ParagraphStyle::Name | ParagraphStyle::SectionHeading => wrapped + 1,
        _ => wrapped,
    }
}

/// Estimated printed line count of `resume` laid out after `layout`.
pub fn estimate_lines(resume: &TailoredResume, layout: &SourceLayout) -> usize {
    build_paragraphs(resume, layout)
        .iter()
        .map(estimate_paragraph_lines)
        .sum()
}

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrimAction {
    NormalizeSkills,
    RemoveExperienceBullet { entry: usize },
    RemoveProjectBullet { entry: usize },
    RemoveSkill,
}

/// One applied reduction and the estimate right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionStep {
    #[serde(flatten)]
    pub action: TrimAction,
    pub estimated_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionResult {
    pub fits: bool,
    /// The reduced resume; best effort when `fits` is false.
    pub resume: TailoredResume,
    pub estimated_lines: usize,
    pub budget: usize,
    pub steps: Vec<CompactionStep>,
    /// Page count of the exact plan, when the verification pass ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_page_count: Option<u32>,
    /// User-presentable explanation when `fits` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Compaction loop
// ────────────────────────────────────────────────────────────────────────────

struct Compactor<'a> {
    layout: &'a SourceLayout,
    budget: usize,
    resume: TailoredResume,
    estimate: usize,
    steps: Vec<CompactionStep>,
}

impl<'a> Compactor<'a> {
    fn fits(&self) -> bool {
        self.estimate <= self.budget
    }

    /// Moves to `next` and records the step. Returns true once within budget.
    fn apply(&mut self, action: TrimAction, next: TailoredResume) -> bool {
        self.estimate = estimate_lines(&next, self.layout);
        self.resume = next;
        self.steps.push(CompactionStep {
            action,
            estimated_lines: self.estimate,
        });
        debug!(?action, estimate = self.estimate, budget = self.budget, "compaction step");
        self.fits()
    }

    fn normalize_skills(&mut self) -> bool {
        let skills = normalize_skill_lines(&self.resume.skills);
        if skills == self.resume.skills {
            return self.fits();
        }
        let next = TailoredResume {
            skills,
            ..self.resume.clone()
        };
        self.apply(TrimAction::NormalizeSkills, next)
    }

    fn trim_experience_bullets(&mut self) -> bool {
        loop {
            let mut changed = false;
            for entry in (0..self.resume.experience.len()).rev() {
                if self.resume.experience[entry].bullets.len() <= 1 {
                    continue;
                }
                let mut next = self.resume.clone();
                next.experience[entry].bullets.pop();
                changed = true;
                if self.apply(TrimAction::RemoveExperienceBullet { entry }, next) {
                    return true;
                }
            }
            if !changed {
                return false;
            }
        }
    }

    fn trim_project_bullets(&mut self) -> bool {
        loop {
            let mut changed = false;
            for entry in (0..self.resume.projects.len()).rev() {
                if self.resume.projects[entry].bullets.len() <= 1 {
                    continue;
                }
                let mut next = self.resume.clone();
                next.projects[entry].bullets.pop();
                changed = true;
                if self.apply(TrimAction::RemoveProjectBullet { entry }, next) {
                    return true;
                }
            }
            if !changed {
                return false;
            }
        }
    }

    fn trim_skills(&mut self) -> bool {
        loop {
            let skills = match remove_one_skill(&self.resume.skills) {
                // The last line stays so the section never disappears.
                Some(skills) if !skills.is_empty() && skills != self.resume.skills => skills,
                _ => return false,
            };
            let next = TailoredResume {
                skills,
                ..self.resume.clone()
            };
            if self.apply(TrimAction::RemoveSkill, next) {
                return true;
            }
        }
    }

    fn finish(self) -> CompactionResult {
        let fits = self.fits();
        let reason = (!fits).then(|| fit_conflict_reason(self.estimate, self.budget, self.layout));
        CompactionResult {
            fits,
            resume: self.resume,
            estimated_lines: self.estimate,
            budget: self.budget,
            steps: self.steps,
            verified_page_count: None,
            reason,
        }
    }
}

fn custom_section_note(layout: &SourceLayout) -> Option<String> {
    let custom = layout.custom_line_count();
    (custom > 0).then(|| {
        format!(
            " {custom} lines from custom sections of the original document are kept verbatim, \
             so a one-page fit conflicts with preserving all source content."
        )
    })
}

fn fit_conflict_reason(estimate: usize, budget: usize, layout: &SourceLayout) -> String {
    let mut reason = format!(
        "The resume still needs about {estimate} lines after trimming bullets and skills, \
         but one page holds {budget}."
    );
    if let Some(note) = custom_section_note(layout) {
        reason.push_str(&note);
    }
    reason
}

/// `budget` is the configured budget, never a tightened verification budget.
fn exact_spill_reason(pages: u32, budget: usize, layout: &SourceLayout) -> String {
    let mut reason = format!(
        "The trimmed resume still lays out on {pages} pages at exact glyph widths, \
         although its estimate is within the {budget}-line budget."
    );
    if let Some(note) = custom_section_note(layout) {
        reason.push_str(&note);
    }
    reason
}

/// Trims `resume` until the estimate fits `budget`, in order: skills
/// normalization, experience bullets, project bullets, skill items.
pub fn compact_to_budget(
    resume: &TailoredResume,
    layout: &SourceLayout,
    budget: usize,
) -> CompactionResult {
    let mut compactor = Compactor {
        layout,
        budget,
        resume: resume.clone(),
        estimate: estimate_lines(resume, layout),
        steps: Vec::new(),
    };

    let fitted = compactor.fits()
        || compactor.normalize_skills()
        || compactor.trim_experience_bullets()
        || (!compactor.resume.projects.is_empty() && compactor.trim_project_bullets())
        || compactor.trim_skills();

    let result = compactor.finish();
    if !fitted {
        warn!(
            estimate = result.estimated_lines,
            budget, "resume does not fit one page after compaction"
        );
    }
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Exact verification
// ────────────────────────────────────────────────────────────────────────────

/// What the exact verification pass plans with.
pub struct ExactFit<'a> {
    pub styles: &'a StyleTable,
    pub geometry: &'a PageGeometry,
    pub measurer: &'a dyn TextMeasurer,
}

/// Compacts against `budget`; with `exact`, also plans the result with the
/// real measurer and tightens the budget by [`VERIFY_BUDGET_STEP`] while the
/// plan still spills onto a second page. Giving up yields `fits: false` with
/// the last verified page count.
pub fn fit_to_one_page(
    resume: &TailoredResume,
    layout: &SourceLayout,
    budget: usize,
    exact: Option<&ExactFit<'_>>,
) -> CompactionResult {
    let Some(exact) = exact else {
        return compact_to_budget(resume, layout, budget);
    };

    let mut round_budget = budget;
    let mut result = compact_to_budget(resume, layout, round_budget);
    if !result.fits {
        return result;
    }
    for round in 0..MAX_VERIFY_ROUNDS {
        let plan = plan_pagination(
            build_paragraphs(&result.resume, layout),
            exact.styles,
            exact.geometry,
            exact.measurer,
        );
        result.verified_page_count = Some(plan.page_count);
        if plan.page_count == 1 {
            return result;
        }
        warn!(
            round,
            pages = plan.page_count,
            budget = round_budget,
            "estimate fits but exact plan spills; tightening budget"
        );
        if round + 1 == MAX_VERIFY_ROUNDS || round_budget <= VERIFY_BUDGET_STEP {
            break;
        }
        round_budget -= VERIFY_BUDGET_STEP;
        let next = compact_to_budget(resume, layout, round_budget);
        if !next.fits {
            // Keep the last verified result rather than the over-trimmed one.
            debug!(budget = round_budget, "tightened budget cannot be met");
            break;
        }
        result = next;
    }

    let pages = result.verified_page_count.unwrap_or(0);
    result.fits = false;
    result.reason = Some(exact_spill_reason(pages, budget, layout));
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
