// src/report.rs
//! Per-source coverage reporting: attention ratio, topic vocabulary, and
//! the organizations and people tagged in the coverage.
//!
//! Raw story volume is misleading on its own (a wire service dwarfs a city
//! paper), so the headline number is the ratio of topic stories to everything
//! the outlet published in the window. The list shapes are pure functions
//! over the service responses; only the fetch layer is async.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::config::Source;
use crate::mediacloud::{
    ApiError, SearchApi, TagCount, WordCount, TAG_SET_CLIFF_ORGS, TAG_SET_CLIFF_PEOPLE,
};
use crate::query::{self, DateRange};

/// Vocabulary rows kept per source.
pub const TOP_TERMS: usize = 20;
/// Organization rows kept per source.
pub const TOP_ORGS: usize = 20;
/// People rows kept per source.
pub const TOP_PEOPLE: usize = 10;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "report_sources_total",
            "Sources a coverage report was computed for."
        );
    });
}

/// Topic attention of one outlet: matching stories vs everything published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRatio {
    pub media_id: u64,
    pub media_name: String,
    pub relevant: u64,
    pub total: u64,
}

impl SourceRatio {
    /// Share of the outlet's output about the topic. An outlet with no
    /// stories at all reports 0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.relevant as f64 / self.total as f64
        }
    }
}

/// One labelled count attributed to a source; rows of the term and entity
/// tables. Field order is the tables' column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub media_id: u64,
    pub media_name: String,
    pub label: String,
    pub count: u64,
}

/// Everything the reporting pass produces, ratios plus the three top-N lists
/// concatenated across sources.
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub ratios: Vec<SourceRatio>,
    pub terms: Vec<LabelCount>,
    pub orgs: Vec<LabelCount>,
    pub people: Vec<LabelCount>,
}

/// Top `top_n` terms by count, descending. Ties keep service order.
pub fn terms_to_rows(source: &Source, mut words: Vec<WordCount>, top_n: usize) -> Vec<LabelCount> {
    words.sort_by(|a, b| b.count.cmp(&a.count));
    words.truncate(top_n);
    words
        .into_iter()
        .map(|w| LabelCount {
            media_id: source.id,
            media_name: source.name.clone(),
            label: w.term,
            count: w.count,
        })
        .collect()
}

/// Top `top_n` tags by count, descending. Nameless tags are dropped before
/// selection so the table never shows blank rows.
pub fn tags_to_rows(source: &Source, tags: Vec<TagCount>, top_n: usize) -> Vec<LabelCount> {
    let mut rows: Vec<LabelCount> = tags
        .into_iter()
        .filter_map(|t| {
            let label = t.display_name()?.to_string();
            Some(LabelCount {
                media_id: source.id,
                media_name: source.name.clone(),
                label,
                count: t.count,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows.truncate(top_n);
    rows
}

async fn source_ratio(
    api: &dyn SearchApi,
    source: &Source,
    topic: &str,
    fq: &str,
) -> Result<SourceRatio, ApiError> {
    let q = query::source_query(topic, source.id);
    let everything = query::media_query(source.id);
    let (relevant, total) = tokio::try_join!(
        api.story_count(&q, fq),
        api.story_count(&everything, fq)
    )?;
    Ok(SourceRatio {
        media_id: source.id,
        media_name: source.name.clone(),
        relevant: relevant.count,
        total: total.count,
    })
}

async fn top_terms(
    api: &dyn SearchApi,
    source: &Source,
    topic: &str,
    fq: &str,
    sample_size: u32,
) -> Result<Vec<LabelCount>, ApiError> {
    let q = query::source_query(topic, source.id);
    let words = api.word_count(&q, fq, sample_size).await?;
    Ok(terms_to_rows(source, words, TOP_TERMS))
}

async fn top_tags(
    api: &dyn SearchApi,
    source: &Source,
    topic: &str,
    fq: &str,
    tag_sets_id: u64,
    top_n: usize,
) -> Result<Vec<LabelCount>, ApiError> {
    let q = query::source_query(topic, source.id);
    let tags = api.tag_count(&q, fq, tag_sets_id).await?;
    Ok(tags_to_rows(source, tags, top_n))
}

/// Compute the full report for every source.
///
/// The four queries of one source run concurrently; sources themselves run
/// in configuration order, same as acquisition.
pub async fn run_reports(
    api: &dyn SearchApi,
    sources: &[Source],
    topic: &str,
    range: DateRange,
    sample_size: u32,
) -> Result<CoverageReport> {
    ensure_metrics_described();
    let fq = range.as_query_clause();
    let mut report = CoverageReport::default();

    for source in sources {
        let (ratio, terms, orgs, people) = tokio::try_join!(
            source_ratio(api, source, topic, &fq),
            top_terms(api, source, topic, &fq, sample_size),
            top_tags(api, source, topic, &fq, TAG_SET_CLIFF_ORGS, TOP_ORGS),
            top_tags(api, source, topic, &fq, TAG_SET_CLIFF_PEOPLE, TOP_PEOPLE),
        )
        .with_context(|| format!("coverage reports for media_id {}", source.id))?;

        debug!(
            media_id = source.id,
            relevant = ratio.relevant,
            total = ratio.total,
            "source reported"
        );
        report.ratios.push(ratio);
        report.terms.extend(terms);
        report.orgs.extend(orgs);
        report.people.extend(people);
    }

    counter!("report_sources_total").increment(sources.len() as u64);
    Ok(report)
}
