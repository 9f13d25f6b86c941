pub mod layout;
pub mod resume;

pub use layout::{EducationDetail, SectionKind, SourceLayout, SourceSection};
pub use resume::{ContactInfo, EducationEntry, ExperienceEntry, ProjectEntry, TailoredResume};
