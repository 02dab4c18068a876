// src/mediacloud/mod.rs
//! The search-service boundary: a MediaCloud-style paged-query API consumed
//! as a black box behind the [`SearchApi`] trait.
//!
//! Four operations cover everything the pipeline needs: bounded page listing
//! ordered by a monotonic processing id, story counting, sampled word
//! counts, and tagged-entity counts. [`MediaCloudClient`] is the HTTP
//! implementation; tests substitute their own mocks.

pub mod client;
pub mod error;
pub mod types;

pub use client::{MediaCloudClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use types::{CountResult, Story, TagCount, WordCount};

use async_trait::async_trait;

/// Page-size bound the service accepts for story listing.
pub const DEFAULT_ROWS: u32 = 500;

/// CLIFF organizations tag taxonomy.
pub const TAG_SET_CLIFF_ORGS: u64 = 2388;
/// CLIFF people tag taxonomy.
pub const TAG_SET_CLIFF_PEOPLE: u64 = 2389;

/// Async surface of the remote search service.
///
/// `q` is a boolean/phrase expression in the service's query language and
/// `fq` the date-range filter clause (see [`crate::query`]). Every call is a
/// single bounded request; pagination state lives entirely in the caller.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Number of stories matching `q` within `fq`.
    async fn story_count(&self, q: &str, fq: &str) -> Result<CountResult>;

    /// One page of matching stories ordered by `processed_stories_id`,
    /// starting strictly after `last_processed_stories_id`. An empty page
    /// means the result set is exhausted.
    async fn story_page(
        &self,
        q: &str,
        fq: &str,
        last_processed_stories_id: u64,
        rows: u32,
    ) -> Result<Vec<Story>>;

    /// Most frequent terms over a bounded sentence sample.
    async fn word_count(&self, q: &str, fq: &str, sample_size: u32) -> Result<Vec<WordCount>>;

    /// Occurrence counts for the tags of one tag set.
    async fn tag_count(&self, q: &str, fq: &str, tag_sets_id: u64) -> Result<Vec<TagCount>>;
}
