pub mod cache;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use cache::ResponseCache;
pub use client::SearchClient;
pub use error::SearchError;
pub use normalize::{extract_funder, to_listing};
pub use types::{OrganicResult, SerpApiResponse};
