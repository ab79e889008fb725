//! Relevance filtering: a keyword pre-screen followed by one Gemini call per
//! listing, turned into a [`Verdict`].

pub mod amount;
pub mod client;
pub mod error;
pub mod keywords;
pub mod prompt;
pub mod verdict;

pub use amount::parse_amount;
pub use client::RelevanceFilter;
pub use error::FilterError;
pub use keywords::keyword_score;
pub use verdict::{ExtractedFields, ModelAssessment, Verdict};
