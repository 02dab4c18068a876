// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod acquire;
pub mod config;
pub mod enrich;
pub mod mediacloud;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use config::{RunConfig, Source};
pub use mediacloud::{ApiError, MediaCloudClient, SearchApi, Story};
pub use pipeline::RunReport;
pub use sentiment::{LexiconModel, Sentiment, SentimentModel};
