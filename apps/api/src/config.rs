use anyhow::{Context, Result};

use crate::layout::compaction::DEFAULT_LINE_BUDGET;

/// Application configuration loaded from environment variables.
/// Fails at startup if a present variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Without a key the tailoring endpoint answers 503; layout and export still work.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Estimated line budget for one-page compaction.
    pub page_line_budget: usize,
    /// Plan compacted resumes with the real measurer and keep trimming while
    /// they still spill onto a second page.
    pub verify_exact_fit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            page_line_budget: DEFAULT_LINE_BUDGET,
            verify_exact_fit: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            page_line_budget: parse_budget(optional_env("PAGE_LINE_BUDGET").as_deref())?,
            verify_exact_fit: parse_flag(optional_env("VERIFY_EXACT_FIT").as_deref())?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_budget(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LINE_BUDGET);
    };
    let budget = raw
        .trim()
        .parse::<usize>()
        .context("PAGE_LINE_BUDGET must be a positive integer")?;
    anyhow::ensure!(budget > 0, "PAGE_LINE_BUDGET must be a positive integer");
    Ok(budget)
}

fn parse_flag(raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(true),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("VERIFY_EXACT_FIT must be a boolean, got '{other}'"),
    }
}
