//! Coverage pipeline entrypoint.
//!
//! One invocation is one run: load config, drain every configured outlet,
//! enrich, write the four CSV tables, log the attention ratios, exit. The
//! whole run sits under a wall-clock deadline so a misbehaving remote can
//! never wedge a scheduled job.
//!
//! See `README.md` for quickstart.

use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use media_coverage_explorer::{config, pipeline, LexiconModel, MediaCloudClient};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so MC_API_KEY and the COVERAGE_* overrides are visible
    // to everything below. No-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = config::load_default()?;
    let key = config::api_key_from_env()?;

    let client = match &cfg.base_url {
        Some(url) => MediaCloudClient::with_base_url(key, url.as_str(), cfg.http_timeout())?,
        None => MediaCloudClient::new(key, cfg.http_timeout())?,
    };
    let model = LexiconModel::new();

    let t0 = Instant::now();
    let deadline = cfg.run_deadline();
    let report = tokio::time::timeout(deadline, pipeline::run(&client, &model, &cfg))
        .await
        .map_err(|_| anyhow!("run exceeded deadline of {}s", deadline.as_secs()))??;

    tracing::info!(
        stories = report.stories_written,
        sources = report.coverage.ratios.len(),
        elapsed_s = t0.elapsed().as_secs_f64(),
        story_table = %report.story_table.display(),
        term_table = %report.term_table.display(),
        entity_table = %report.entity_table.display(),
        people_table = %report.people_table.display(),
        "run complete"
    );
    Ok(())
}
