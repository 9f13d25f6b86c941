// Cross-cutting prompt fragments shared by every rewriting prompt.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps rewrites grounded in the uploaded resume.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Only rephrase, reorder, or omit what the original resume states. \
    Do NOT invent employers, titles, dates, degrees, metrics, or technologies. \
    If the job description asks for something the resume does not support, leave it out.";
