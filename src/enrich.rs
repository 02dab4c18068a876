// src/enrich.rs
//! Per-story feature computation, between acquisition and persistence.
//!
//! Pure functions only. Titles get a light cleanup (entity decode, tag strip,
//! whitespace collapse) before scoring; the stored story keeps the original
//! text. Publish timestamps collapse to a calendar day, unparseable ones
//! survive as `None` rather than dropping the story.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::mediacloud::Story;
use crate::sentiment::{Sentiment, SentimentModel};

/// A story plus everything this pipeline derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedStory {
    pub story: Story,
    /// `publish_date` truncated to a day, when it parsed.
    pub publish_day: Option<NaiveDate>,
    pub sentiment: Sentiment,
}

/// Cleanup applied to a title before scoring, never to stored output.
pub fn normalize_title(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Truncate a service timestamp to its day.
///
/// The service usually emits `YYYY-MM-DD HH:MM:SS`, sometimes with a
/// fractional second, a `T` separator, or a full RFC 3339 stamp. Anything
/// else is `None`.
pub fn truncate_publish_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn enrich_story(story: Story, model: &dyn SentimentModel) -> EnrichedStory {
    let title = story.title.as_deref().unwrap_or("");
    let sentiment = model.score(&normalize_title(title));
    let publish_day = story
        .publish_date
        .as_deref()
        .and_then(truncate_publish_date);
    EnrichedStory {
        story,
        publish_day,
        sentiment,
    }
}

pub fn enrich_stories(stories: Vec<Story>, model: &dyn SentimentModel) -> Vec<EnrichedStory> {
    stories
        .into_iter()
        .map(|s| enrich_story(s, model))
        .collect()
}
