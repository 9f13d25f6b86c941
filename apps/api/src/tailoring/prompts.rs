// Prompt constants for resume tailoring.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for tailoring. `JSON_ONLY_SYSTEM` is appended at call time.
pub const TAILOR_SYSTEM: &str = "You are an expert resume editor. \
    You tailor an existing resume to a job description by rewording bullets, \
    ordering skills by relevance, and tightening the summary.";

/// Tailoring prompt template. Replace `{resume_text}`, `{jd_text}` and
/// `{factuality}` before sending.
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"Tailor the resume below to the job description.

{factuality}

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Full Name",
  "contact": {
    "email": "name@example.com",
    "phone": null,
    "linkedin": "linkedin.com/in/name",
    "github": null,
    "website": null
  },
  "summary": "Two or three sentences, or null",
  "skills": ["Languages: Go, Python", "Cloud: AWS, GCP"],
  "experience": [
    {
      "title": "Senior Engineer",
      "company": "Acme",
      "location": "Remote",
      "start_date": "2021",
      "end_date": "Present",
      "bullets": ["One achievement per bullet, no leading bullet glyph"]
    }
  ],
  "education": [
    {
      "degree": "BS Computer Science",
      "institution": "State University",
      "start_date": null,
      "end_date": "2018",
      "gpa": null,
      "honors": null
    }
  ],
  "projects": [
    {"name": "Project", "technologies": ["Rust"], "bullets": ["What it does"]}
  ]
}

Group skills into "Category: item, item" lines. Keep every employer and degree.

RESUME:
{resume_text}

JOB DESCRIPTION:
{jd_text}
"#;
