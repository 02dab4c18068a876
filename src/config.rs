// src/config.rs
//! Run configuration: what to search, where, and where output lands.
//!
//! Resolution order mirrors the rest of the tooling here:
//! 1) `$COVERAGE_CONFIG_PATH`
//! 2) `config/coverage.toml`
//! 3) embedded defaults (the Hong Kong protest study)
//!
//! The API key is never part of the file; it comes from `MC_API_KEY`,
//! usually via `.env`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::mediacloud::DEFAULT_ROWS;
use crate::query::DateRange;

pub const ENV_CONFIG_PATH: &str = "COVERAGE_CONFIG_PATH";
pub const ENV_API_KEY: &str = "MC_API_KEY";
pub const ENV_OUTPUT_DIR: &str = "COVERAGE_OUTPUT_DIR";
const DEFAULT_CONFIG_PATH: &str = "config/coverage.toml";

/// One monitored outlet: the service's media id plus the name used in
/// output tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Boolean topic expression in the service's query language.
    pub topic_query: String,
    /// Inclusive window, `YYYY-MM-DD` strings in the file.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sources: Vec<Source>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_word_sample_size")]
    pub word_sample_size: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,
    /// Alternate service endpoint, mostly for local stubs.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_page_size() -> u32 {
    DEFAULT_ROWS
}

fn default_word_sample_size() -> u32 {
    10_000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_run_deadline_secs() -> u64 {
    900
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("config needs at least one source");
        }
        if self.start_date > self.end_date {
            bail!(
                "start_date {} is after end_date {}",
                self.start_date,
                self.end_date
            );
        }
        if self.page_size == 0 {
            bail!("page_size must be positive");
        }
        if self.word_sample_size == 0 {
            bail!("word_sample_size must be positive");
        }
        Ok(())
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Output directory, with `$COVERAGE_OUTPUT_DIR` taking precedence over
    /// the file so one config can serve several runs.
    pub fn output_dir(&self) -> PathBuf {
        match env::var(ENV_OUTPUT_DIR) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => self.output_dir.clone(),
        }
    }

    pub fn story_table_path(&self) -> PathBuf {
        self.output_dir().join("story-list.csv")
    }

    pub fn term_table_path(&self) -> PathBuf {
        self.output_dir().join("term-counts.csv")
    }

    pub fn entity_table_path(&self) -> PathBuf {
        self.output_dir().join("entity-counts.csv")
    }

    pub fn people_table_path(&self) -> PathBuf {
        self.output_dir().join("people-counts.csv")
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }
}

/// Load and validate a config from an explicit path.
pub fn load_from(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: RunConfig =
        toml::from_str(&content).with_context(|| format!("parsing config at {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config using env var + fallbacks:
/// 1) `$COVERAGE_CONFIG_PATH`
/// 2) `config/coverage.toml`
/// 3) [`embedded_defaults`]
pub fn load_default() -> Result<RunConfig> {
    if let Ok(p) = env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to a non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return load_from(&default_p);
    }
    let cfg = embedded_defaults();
    cfg.validate()?;
    Ok(cfg)
}

/// The study this tool was built around: four outlets' coverage of the
/// 2019/2020 Hong Kong protests.
pub fn embedded_defaults() -> RunConfig {
    RunConfig {
        topic_query: concat!(
            r#""Hong Kong" AND (protest* OR unrest OR "Anti-Extradition" OR "#,
            r#""democracy movement" OR assembly OR demonstration* OR "human chain" OR rally)"#
        )
        .to_string(),
        start_date: NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date"),
        sources: vec![
            Source {
                id: 1,
                name: "New York Times".to_string(),
            },
            Source {
                id: 39590,
                name: "South China Morning Post".to_string(),
            },
            Source {
                id: 1094,
                name: "BBC".to_string(),
            },
            Source {
                id: 65173,
                name: "Peoples Daily".to_string(),
            },
        ],
        page_size: default_page_size(),
        word_sample_size: default_word_sample_size(),
        output_dir: default_output_dir(),
        http_timeout_secs: default_http_timeout_secs(),
        run_deadline_secs: default_run_deadline_secs(),
        base_url: None,
    }
}

/// API key lookup. Kept out of [`RunConfig`] so configs can be committed.
pub fn api_key_from_env() -> Result<String> {
    let key = env::var(ENV_API_KEY)
        .map_err(|_| anyhow!("missing {ENV_API_KEY} (set it in the environment or a .env file)"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("{ENV_API_KEY} is set but empty");
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
topic_query = '"Hong Kong" AND protest*'
start_date = "2019-01-01"
end_date = "2020-12-31"

[[sources]]
id = 1094
name = "BBC"
"#;

    #[test]
    fn minimal_toml_gets_the_defaults() {
        let cfg: RunConfig = toml::from_str(MINIMAL).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.page_size, 500);
        assert_eq!(cfg.word_sample_size, 10_000);
        assert_eq!(cfg.output_dir, PathBuf::from("data"));
        assert_eq!(cfg.http_timeout_secs, 30);
        assert_eq!(cfg.run_deadline_secs, 900);
        assert_eq!(cfg.base_url, None);
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.sources[0].id, 1094);
    }

    #[test]
    fn full_toml_overrides_every_default() {
        let toml = r#"
topic_query = "climate"
start_date = "2021-05-01"
end_date = "2021-05-02"
page_size = 100
word_sample_size = 1000
output_dir = "out"
http_timeout_secs = 5
run_deadline_secs = 60
base_url = "http://localhost:8080/api/v2"

[[sources]]
id = 1
name = "New York Times"

[[sources]]
id = 2
name = "Guardian"
"#;
        let cfg: RunConfig = toml::from_str(toml).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.base_url.as_deref(), Some("http://localhost:8080/api/v2"));
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(
            cfg.date_range().as_query_clause(),
            "publish_day:[2021-05-01T00:00:00Z TO 2021-05-02T00:00:00Z]"
        );
    }

    #[test]
    fn validation_rejects_bad_configs() {
        let mut cfg = embedded_defaults();
        cfg.sources.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = embedded_defaults();
        cfg.start_date = cfg.end_date.succ_opt().unwrap();
        assert!(cfg.validate().is_err());

        let mut cfg = embedded_defaults();
        cfg.page_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn embedded_defaults_cover_the_four_outlets() {
        let cfg = embedded_defaults();
        cfg.validate().unwrap();
        let ids: Vec<u64> = cfg.sources.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 39590, 1094, 65173]);
        assert!(cfg.topic_query.contains("Hong Kong"));
    }

    #[serial_test::serial]
    #[test]
    fn load_default_prefers_env_then_file_then_embedded() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // nothing on disk -> embedded
        let cfg = load_default().unwrap();
        assert_eq!(cfg.sources.len(), 4);

        // default path
        fs::create_dir_all("config").unwrap();
        fs::write(DEFAULT_CONFIG_PATH, MINIMAL).unwrap();
        let cfg = load_default().unwrap();
        assert_eq!(cfg.sources.len(), 1);

        // env wins over the default path
        let other = tmp.path().join("other.toml");
        fs::write(&other, MINIMAL.replace("1094", "39590")).unwrap();
        env::set_var(ENV_CONFIG_PATH, other.display().to_string());
        let cfg = load_default().unwrap();
        assert_eq!(cfg.sources[0].id, 39590);

        // env pointing nowhere is an error, not a fallback
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::set_current_dir(&old).unwrap();
    }

    #[serial_test::serial]
    #[test]
    fn output_dir_env_override_moves_every_table() {
        env::remove_var(ENV_OUTPUT_DIR);
        let cfg = embedded_defaults();
        assert_eq!(cfg.story_table_path(), PathBuf::from("data/story-list.csv"));

        env::set_var(ENV_OUTPUT_DIR, "elsewhere");
        assert_eq!(
            cfg.story_table_path(),
            PathBuf::from("elsewhere/story-list.csv")
        );
        assert_eq!(
            cfg.people_table_path(),
            PathBuf::from("elsewhere/people-counts.csv")
        );
        env::remove_var(ENV_OUTPUT_DIR);
    }

    #[serial_test::serial]
    #[test]
    fn api_key_must_be_present_and_non_empty() {
        env::remove_var(ENV_API_KEY);
        let err = api_key_from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));

        env::set_var(ENV_API_KEY, "   ");
        assert!(api_key_from_env().is_err());

        env::set_var(ENV_API_KEY, "k3y");
        assert_eq!(api_key_from_env().unwrap(), "k3y");
        env::remove_var(ENV_API_KEY);
    }
}
