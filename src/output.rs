// src/output.rs
//! CSV persistence.
//!
//! Each table is a fixed projection written through a temp file in the same
//! directory and renamed into place, so consumers never observe a partial
//! file. Headers are written explicitly from the column consts; an empty run
//! still produces a header-only file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::enrich::EnrichedStory;
use crate::report::LabelCount;

/// Story table columns, in order. External notebooks key on these names.
pub const STORY_COLUMNS: [&str; 10] = [
    "stories_id",
    "publish_date",
    "title",
    "url",
    "language",
    "media_id",
    "media_name",
    "media_url",
    "subjectivity",
    "polarity",
];

pub const TERM_COLUMNS: [&str; 4] = ["media_id", "media_name", "term", "count"];
pub const TAG_COLUMNS: [&str; 4] = ["media_id", "media_name", "label", "count"];

/// The story projection actually serialized. Everything else the service
/// returns about a story stays out of the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRow {
    pub stories_id: u64,
    /// Day only; empty string when the source timestamp did not parse.
    pub publish_date: String,
    pub title: String,
    pub url: String,
    pub language: String,
    pub media_id: u64,
    pub media_name: String,
    pub media_url: String,
    pub subjectivity: f64,
    pub polarity: f64,
}

impl From<&EnrichedStory> for StoryRow {
    fn from(e: &EnrichedStory) -> Self {
        let s = &e.story;
        Self {
            stories_id: s.stories_id,
            publish_date: e.publish_day.map(|d| d.to_string()).unwrap_or_default(),
            title: s.title.clone().unwrap_or_default(),
            url: s.url.clone().unwrap_or_default(),
            language: s.language.clone().unwrap_or_default(),
            media_id: s.media_id,
            media_name: s.media_name.clone().unwrap_or_default(),
            media_url: s.media_url.clone().unwrap_or_default(),
            subjectivity: e.sentiment.subjectivity,
            polarity: e.sentiment.polarity,
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_table<R: Serialize>(path: &Path, header: &[&str], rows: &[R]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let tmp = tmp_path(path);
    {
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        w.write_record(header)
            .with_context(|| format!("writing header of {}", path.display()))?;
        for row in rows {
            w.serialize(row)
                .with_context(|| format!("writing row of {}", path.display()))?;
        }
        w.flush()
            .with_context(|| format!("flushing {}", tmp.display()))?;
    }
    fs::rename(&tmp, path).with_context(|| format!("moving into place {}", path.display()))?;
    Ok(())
}

pub fn write_story_table(path: &Path, stories: &[EnrichedStory]) -> Result<()> {
    let rows: Vec<StoryRow> = stories.iter().map(StoryRow::from).collect();
    write_table(path, &STORY_COLUMNS, &rows)?;
    info!(path = %path.display(), rows = rows.len(), "story table written");
    Ok(())
}

pub fn write_term_table(path: &Path, rows: &[LabelCount]) -> Result<()> {
    write_table(path, &TERM_COLUMNS, rows)?;
    info!(path = %path.display(), rows = rows.len(), "term table written");
    Ok(())
}

pub fn write_tag_table(path: &Path, rows: &[LabelCount]) -> Result<()> {
    write_table(path, &TAG_COLUMNS, rows)?;
    info!(path = %path.display(), rows = rows.len(), "tag table written");
    Ok(())
}
