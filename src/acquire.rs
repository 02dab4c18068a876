// src/acquire.rs
//! Paged story acquisition across the configured outlets.
//!
//! The service pages by `processed_stories_id`: each request asks for rows
//! strictly after the largest id seen so far, and an empty page means the
//! result set is exhausted. The cursor lives here, not in the client, so the
//! client stays a thin stateless wrapper.

use std::time::Instant;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::config::Source;
use crate::mediacloud::{ApiError, SearchApi, Story};
use crate::query::{self, DateRange};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "acquire_pages_total",
            "Story pages fetched from the search service."
        );
        describe_counter!(
            "acquire_stories_total",
            "Stories accumulated across all sources."
        );
        describe_counter!(
            "acquire_fetch_errors_total",
            "Page fetches that failed and aborted the run."
        );
        describe_histogram!(
            "acquire_page_fetch_ms",
            "Wall time per page fetch in milliseconds."
        );
        describe_gauge!(
            "acquire_last_run_ts",
            "Unix ts when acquisition last completed."
        );
    });
}

/// Drain every page matching `q` within `fq`, in service order.
///
/// Returns every story exactly once. The final request always comes back
/// empty, that is the termination signal, so a result of n pages costs
/// n+1 calls.
pub async fn drain_stories(
    api: &dyn SearchApi,
    q: &str,
    fq: &str,
    rows: u32,
) -> Result<Vec<Story>, ApiError> {
    let mut last_processed_stories_id = 0u64;
    let mut stories = Vec::new();

    loop {
        let t0 = Instant::now();
        let page = api
            .story_page(q, fq, last_processed_stories_id, rows)
            .await?;
        histogram!("acquire_page_fetch_ms").record(t0.elapsed().as_millis() as f64);
        counter!("acquire_pages_total").increment(1);
        debug!(
            got = page.len(),
            last_processed_stories_id, "fetched story page"
        );

        match page.last() {
            Some(last) => {
                last_processed_stories_id = last.processed_stories_id;
                stories.extend(page);
            }
            None => break,
        }
    }

    Ok(stories)
}

/// Fetch the topic stories of every source, one source at a time.
///
/// Sources are independent result sets; order of the concatenation follows
/// the configuration. A failing source aborts the run, partial output is
/// worse than no output here.
pub async fn fetch_sources(
    api: &dyn SearchApi,
    sources: &[Source],
    topic: &str,
    range: DateRange,
    rows: u32,
) -> Result<Vec<Story>> {
    ensure_metrics_described();
    let fq = range.as_query_clause();
    let mut all = Vec::new();

    for source in sources {
        let q = query::source_query(topic, source.id);
        let stories = match drain_stories(api, &q, &fq, rows).await {
            Ok(stories) => stories,
            Err(err) => {
                counter!("acquire_fetch_errors_total").increment(1);
                return Err(err)
                    .with_context(|| format!("fetching stories for media_id {}", source.id));
            }
        };
        info!(
            media_id = source.id,
            name = %source.name,
            stories = stories.len(),
            running_total = all.len() + stories.len(),
            "source drained"
        );
        all.extend(stories);
    }

    counter!("acquire_stories_total").increment(all.len() as u64);
    gauge!("acquire_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    Ok(all)
}
