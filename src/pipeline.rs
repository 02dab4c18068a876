// src/pipeline.rs
//! One full run, wired together: acquire every source, enrich, persist the
//! story table, then compute and persist the coverage reports.
//!
//! All state flows through arguments and the returned [`RunReport`];
//! nothing here is global.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::acquire;
use crate::config::RunConfig;
use crate::enrich::{self, EnrichedStory};
use crate::mediacloud::SearchApi;
use crate::output;
use crate::report::{self, CoverageReport};
use crate::sentiment::SentimentModel;

/// What a completed run produced, and where it landed.
#[derive(Debug)]
pub struct RunReport {
    pub stories_written: usize,
    pub coverage: CoverageReport,
    pub story_table: PathBuf,
    pub term_table: PathBuf,
    pub entity_table: PathBuf,
    pub people_table: PathBuf,
}

pub async fn run(
    api: &dyn SearchApi,
    model: &dyn SentimentModel,
    cfg: &RunConfig,
) -> Result<RunReport> {
    let range = cfg.date_range();

    let stories = acquire::fetch_sources(
        api,
        &cfg.sources,
        &cfg.topic_query,
        range,
        cfg.page_size,
    )
    .await?;

    let enriched: Vec<EnrichedStory> = enrich::enrich_stories(stories, model);
    info!(stories = enriched.len(), "stories enriched");

    let story_table = cfg.story_table_path();
    output::write_story_table(&story_table, &enriched)
        .with_context(|| format!("writing {}", story_table.display()))?;

    let coverage = report::run_reports(
        api,
        &cfg.sources,
        &cfg.topic_query,
        range,
        cfg.word_sample_size,
    )
    .await?;

    let term_table = cfg.term_table_path();
    output::write_term_table(&term_table, &coverage.terms)
        .with_context(|| format!("writing {}", term_table.display()))?;
    let entity_table = cfg.entity_table_path();
    output::write_tag_table(&entity_table, &coverage.orgs)
        .with_context(|| format!("writing {}", entity_table.display()))?;
    let people_table = cfg.people_table_path();
    output::write_tag_table(&people_table, &coverage.people)
        .with_context(|| format!("writing {}", people_table.display()))?;

    for ratio in &coverage.ratios {
        info!(
            media_id = ratio.media_id,
            name = %ratio.media_name,
            relevant = ratio.relevant,
            total = ratio.total,
            ratio_pct = ratio.ratio() * 100.0,
            "topic share of coverage"
        );
    }

    Ok(RunReport {
        stories_written: enriched.len(),
        coverage,
        story_table,
        term_table,
        entity_table,
        people_table,
    })
}
