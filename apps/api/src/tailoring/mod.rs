//! Resume tailoring: the rewriting service behind a pluggable trait.
//!
//! `AppState` holds an `Option<Arc<dyn ResumeTailor>>`; without an API key the
//! tailoring endpoint is unavailable and the layout endpoints keep working.

pub mod extract;
pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::TailoredResume;
use crate::tailoring::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM};

/// Turns raw resume text plus a job description into a structured resume.
/// Treated as slow and fallible.
#[async_trait]
pub trait ResumeTailor: Send + Sync {
    async fn tailor(&self, resume_text: &str, jd_text: &str) -> Result<TailoredResume, AppError>;
}

pub fn build_tailor_prompt(resume_text: &str, jd_text: &str) -> String {
    TAILOR_PROMPT_TEMPLATE
        .replace("{factuality}", FACTUALITY_INSTRUCTION)
        .replace("{resume_text}", resume_text)
        .replace("{jd_text}", jd_text)
}

/// Tailor backed by the Messages API.
pub struct LlmResumeTailor {
    llm: LlmClient,
}

impl LlmResumeTailor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeTailor for LlmResumeTailor {
    async fn tailor(&self, resume_text: &str, jd_text: &str) -> Result<TailoredResume, AppError> {
        let prompt = build_tailor_prompt(resume_text, jd_text);
        let system = format!("{TAILOR_SYSTEM} {JSON_ONLY_SYSTEM}");
        let resume = self
            .llm
            .call_json::<TailoredResume>(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;
        resume
            .validate()
            .map_err(|e| AppError::Llm(format!("tailored resume is unusable: {e}")))?;
        info!(
            experience = resume.experience.len(),
            bullets = resume.bullet_count(),
            "resume tailored"
        );
        Ok(resume)
    }
}

/// Returns a fixed resume. Test fixture for handlers.
#[cfg(test)]
pub struct StaticResumeTailor(pub TailoredResume);

#[cfg(test)]
#[async_trait]
impl ResumeTailor for StaticResumeTailor {
    async fn tailor(&self, _resume_text: &str, _jd_text: &str) -> Result<TailoredResume, AppError> {
        Ok(self.0.clone())
    }
}
