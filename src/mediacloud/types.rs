// src/mediacloud/types.rs
use serde::{Deserialize, Serialize};

/// One matched document as the stories list endpoint returns it.
///
/// `processed_stories_id` is the pagination cursor key and strictly
/// increases in listing order. Identity within a run is the composite
/// (stories_id, media_id): different outlets may reuse story ids, so the
/// id alone is only unique per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub stories_id: u64,
    pub processed_stories_id: u64,
    pub media_id: u64,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub media_name: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// Count endpoints answer with a bare object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    pub count: u64,
}

/// One sampled term frequency from the word-count endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCount {
    pub term: String,
    #[serde(default)]
    pub stem: Option<String>,
    pub count: u64,
}

/// One tag occurrence count from the tag-count endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    #[serde(default)]
    pub tags_id: Option<u64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub count: u64,
}

impl TagCount {
    /// Human-readable name of the tag. The organizations taxonomy carries
    /// its canonical name in `description`; the people taxonomy fills
    /// `label` and leaves `description` empty.
    pub fn display_name(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.label.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
