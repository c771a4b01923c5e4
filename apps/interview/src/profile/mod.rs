// Candidate profile intake: resume upload -> plain text -> heuristic fields.

pub mod document;
pub mod extractor;
pub mod handlers;
