//! Revision fingerprint of a `(resume, layout)` pair.
//!
//! Plans and exports are pure functions of this pair, so a cache keyed on the
//! fingerprint only regenerates when the pair actually changes.

use md5::{Digest, Md5};

use crate::models::{SourceLayout, TailoredResume};

/// Lowercase hex MD5 of the pair's JSON serialization.
pub fn revision_fingerprint(
    resume: &TailoredResume,
    layout: &SourceLayout,
) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(&(resume, layout))?;
    let digest = Md5::digest(&canonical);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
