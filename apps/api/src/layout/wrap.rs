//! Greedy line wrapping against exact glyph widths.
//!
//! # Rules
//! - Words are packed greedily with a single space separator.
//! - A word wider than a whole line is split into the longest character runs
//!   that fit. Every run takes at least one character, so wrapping always
//!   terminates even when a single glyph is wider than the line.
//! - Embedded newlines start a new logical paragraph; each one yields at least
//!   one (possibly empty) line.
//! - Only the very first output line uses `LineWidths::first`.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{StyleVariant, TextMeasurer};

/// Slack for float comparisons, in points.
pub const WIDTH_EPSILON: f32 = 0.01;
/// Width left after a skills label below which the value starts on its own line,
/// in widths of the digit `0`.
pub const SKILLS_MIN_VALUE_CHARS: f32 = 8.0;
/// Glyph drawn in front of bullet paragraphs.
pub const BULLET_GLYPH: char = '•';

/// Permitted widths in points for the first and all following lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineWidths {
    pub first: f32,
    pub rest: f32,
}

impl LineWidths {
    pub fn uniform(width: f32) -> Self {
        Self {
            first: width,
            rest: width,
        }
    }

    pub fn for_line(&self, index: usize) -> f32 {
        if index == 0 {
            self.first
        } else {
            self.rest
        }
    }
}

/// One wrapped line of a skills paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsRow {
    /// Bold label drawn before `text`, only on the label's row.
    pub label: Option<String>,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Plain wrapping
// ────────────────────────────────────────────────────────────────────────────

struct Wrapper<'a> {
    measurer: &'a dyn TextMeasurer,
    variant: StyleVariant,
    size: f32,
    widths: LineWidths,
    lines: Vec<String>,
    current: String,
}

impl<'a> Wrapper<'a> {
    fn width(&self, text: &str) -> f32 {
        self.measurer
            .width_of_text_at_size(text, self.variant, self.size)
    }

    fn limit(&self) -> f32 {
        self.widths.for_line(self.lines.len())
    }

    fn fits(&self, text: &str) -> bool {
        self.width(text) <= self.limit() + WIDTH_EPSILON
    }

    fn flush(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line);
    }

    fn push_word(&mut self, word: &str) {
        if !self.current.is_empty() {
            let candidate = format!("{} {}", self.current, word);
            if self.fits(&candidate) {
                self.current = candidate;
                return;
            }
            self.flush();
        }
        self.start_line_with(word);
    }

    /// Places `word` on an empty line, splitting it while it is too wide.
    fn start_line_with(&mut self, word: &str) {
        let mut rest = word;
        while !self.fits(rest) {
            let cut = self.longest_fitting_prefix(rest);
            if cut == rest.len() {
                break;
            }
            self.current = rest[..cut].to_string();
            self.flush();
            rest = &rest[cut..];
        }
        self.current = rest.to_string();
    }

    /// Byte length of the longest prefix of `word` that fits the current line,
    /// never less than one character.
    fn longest_fitting_prefix(&self, word: &str) -> usize {
        let limit = self.limit();
        let mut end = 0;
        for (idx, ch) in word.char_indices() {
            let next = idx + ch.len_utf8();
            if end > 0 && self.width(&word[..next]) > limit + WIDTH_EPSILON {
                break;
            }
            end = next;
        }
        end
    }

    fn finish(self) -> Vec<String> {
        self.lines
    }
}

/// Wraps `text` into lines no wider than `widths` (see module docs).
pub fn wrap_text(
    text: &str,
    measurer: &dyn TextMeasurer,
    variant: StyleVariant,
    size: f32,
    widths: LineWidths,
) -> Vec<String> {
    let mut wrapper = Wrapper {
        measurer,
        variant,
        size,
        widths,
        lines: Vec::new(),
        current: String::new(),
    };
    for logical in text.split('\n') {
        for word in logical.split_whitespace() {
            wrapper.push_word(word);
        }
        wrapper.flush();
    }
    wrapper.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Special paragraphs
// ────────────────────────────────────────────────────────────────────────────

/// Wraps a `"Label: value, value"` skills line.
///
/// The label is bold and followed by one space. When the width left beside it
/// is under [`SKILLS_MIN_VALUE_CHARS`] digit widths, the label gets a row of
/// its own and the value wraps at full width below it. Text without a colon
/// wraps like a body line.
pub fn wrap_skills_line(
    text: &str,
    measurer: &dyn TextMeasurer,
    value_variant: StyleVariant,
    size: f32,
    full_width: f32,
) -> Vec<SkillsRow> {
    let Some((raw_label, raw_value)) = text.split_once(':') else {
        return wrap_text(
            text,
            measurer,
            value_variant,
            size,
            LineWidths::uniform(full_width),
        )
        .into_iter()
        .map(|text| SkillsRow { label: None, text })
        .collect();
    };

    let label = format!("{}:", raw_label.trim());
    let value = raw_value.trim();
    let label_width = skills_label_width(&label, measurer, size);
    let remaining = full_width - label_width;
    let min_value_width =
        SKILLS_MIN_VALUE_CHARS * measurer.width_of_text_at_size("0", StyleVariant::Regular, size);

    if value.is_empty() {
        return vec![SkillsRow {
            label: Some(label),
            text: String::new(),
        }];
    }

    if remaining < min_value_width {
        let mut rows = vec![SkillsRow {
            label: Some(label),
            text: String::new(),
        }];
        rows.extend(
            wrap_text(
                value,
                measurer,
                value_variant,
                size,
                LineWidths::uniform(full_width),
            )
            .into_iter()
            .map(|text| SkillsRow { label: None, text }),
        );
        return rows;
    }

    let widths = LineWidths {
        first: remaining,
        rest: full_width,
    };
    wrap_text(value, measurer, value_variant, size, widths)
        .into_iter()
        .enumerate()
        .map(|(i, text)| SkillsRow {
            label: (i == 0).then(|| label.clone()),
            text,
        })
        .collect()
}

/// Width of a skills label plus the space that separates it from the value.
pub fn skills_label_width(label: &str, measurer: &dyn TextMeasurer, size: f32) -> f32 {
    measurer.width_of_text_at_size(&format!("{label} "), StyleVariant::Bold, size)
}

/// Removes a leading bullet glyph; the renderers draw their own marker.
pub fn strip_bullet_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    trimmed
        .strip_prefix(BULLET_GLYPH)
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{AverageWidthMeasurer, StandardFontMeasurer};

    /// Every character is exactly 5pt wide at size 10.
    fn fixed() -> AverageWidthMeasurer {
        AverageWidthMeasurer { em_per_char: 0.5 }
    }

    fn times() -> StandardFontMeasurer {
        StandardFontMeasurer::load().unwrap()
    }

    fn wrap_fixed(text: &str, first: f32, rest: f32) -> Vec<String> {
        wrap_text(
            text,
            &fixed(),
            StyleVariant::Regular,
            10.0,
            LineWidths { first, rest },
        )
    }

    // ── wrap_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_text_yields_one_empty_line() {
        assert_eq!(wrap_fixed("", 100.0, 100.0), vec![String::new()]);
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap_fixed("hello world", 100.0, 100.0), vec!["hello world"]);
    }

    #[test]
    fn test_greedy_packing_breaks_at_width() {
        // 10 chars per line at 50pt.
        let lines = wrap_fixed("aaa bbb ccc ddd", 50.0, 50.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_first_line_width_differs() {
        // First line fits 4 chars, rest fit 10.
        let lines = wrap_fixed("aaa bbb ccc ddd", 20.0, 50.0);
        assert_eq!(lines, vec!["aaa", "bbb ccc", "ddd"]);
    }

    #[test]
    fn test_long_word_is_split_into_fitting_runs() {
        let lines = wrap_fixed("abcdefghijklmnopqrstuvwxy", 50.0, 50.0);
        assert_eq!(lines, vec!["abcdefghij", "klmnopqrst", "uvwxy"]);
    }

    #[test]
    fn test_long_word_tail_accepts_following_words() {
        let lines = wrap_fixed("abcdefghijkl mn", 50.0, 50.0);
        assert_eq!(lines, vec!["abcdefghij", "kl mn"]);
    }

    #[test]
    fn test_split_always_advances_one_char() {
        // Line narrower than any glyph: one character per line, no infinite loop.
        let lines = wrap_fixed("abc", 1.0, 1.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_newlines_make_logical_paragraphs_with_blank_lines() {
        let lines = wrap_fixed("one\n\ntwo", 100.0, 100.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrapped_lines_fit_their_width_with_real_metrics() {
        let m = times();
        let text = "Led migration of forty-two legacy services to a Kubernetes platform, \
                    cutting deploy time from hours to minutes while keeping availability above \
                    four nines across every region we operated in";
        let widths = LineWidths {
            first: 180.0,
            rest: 240.0,
        };
        let lines = wrap_text(text, &m, StyleVariant::Regular, 10.0, widths);
        assert!(lines.len() > 2);
        for (i, line) in lines.iter().enumerate() {
            let width = m.width_of_text_at_size(line, StyleVariant::Regular, 10.0);
            assert!(
                width <= widths.for_line(i) + WIDTH_EPSILON,
                "line {i} {line:?} is {width}pt"
            );
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    // ── wrap_skills_line ────────────────────────────────────────────────────

    #[test]
    fn test_skills_label_shares_first_row() {
        let m = times();
        let rows = wrap_skills_line(
            "Languages: Go, Python, TypeScript, JavaScript, Java, C++",
            &m,
            StyleVariant::Regular,
            10.0,
            150.0,
        );
        assert!(rows.len() > 1, "value should wrap: {rows:?}");
        assert_eq!(rows[0].label.as_deref(), Some("Languages:"));
        assert!(!rows[0].text.is_empty(), "first row should carry part of the value");
        assert!(rows[1..].iter().all(|r| r.label.is_none()));

        let label_width = skills_label_width("Languages:", &m, 10.0);
        let first = m.width_of_text_at_size(&rows[0].text, StyleVariant::Regular, 10.0);
        assert!(first <= 150.0 - label_width + WIDTH_EPSILON);
    }

    #[test]
    fn test_skills_long_label_gets_own_row() {
        let m = times();
        let rows = wrap_skills_line(
            "Infrastructure and Observability Tooling: Grafana, Prometheus",
            &m,
            StyleVariant::Regular,
            10.0,
            200.0,
        );
        assert_eq!(
            rows[0].label.as_deref(),
            Some("Infrastructure and Observability Tooling:")
        );
        assert_eq!(rows[0].text, "");
        assert_eq!(rows[1].text, "Grafana, Prometheus");
        assert!(rows[1].label.is_none());
    }

    #[test]
    fn test_skills_without_colon_has_no_label() {
        let rows = wrap_skills_line("Rust, Go", &times(), StyleVariant::Regular, 10.0, 300.0);
        assert_eq!(
            rows,
            vec![SkillsRow {
                label: None,
                text: "Rust, Go".to_string()
            }]
        );
    }

    #[test]
    fn test_skills_with_empty_value_keeps_label() {
        let rows = wrap_skills_line("Tools:", &times(), StyleVariant::Regular, 10.0, 300.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("Tools:"));
    }

    // ── strip_bullet_prefix ─────────────────────────────────────────────────

    #[test]
    fn test_strip_bullet_prefix() {
        assert_eq!(strip_bullet_prefix("• Shipped it"), "Shipped it");
        assert_eq!(strip_bullet_prefix("  •Shipped"), "Shipped");
        assert_eq!(strip_bullet_prefix("No glyph"), "No glyph");
    }
}
