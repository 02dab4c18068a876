// tests/pagination.rs
//
// Cursor-paging behavior of story acquisition against a synthetic backend:
// completeness, termination cost, and cursor monotonicity.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use media_coverage_explorer::acquire;
use media_coverage_explorer::mediacloud::{
    ApiError, CountResult, SearchApi, Story, TagCount, WordCount,
};

fn synth_story(n: u64) -> Story {
    Story {
        stories_id: n,
        // service-side ordering key; strictly larger than the story id
        processed_stories_id: n + 1,
        media_id: 1094,
        publish_date: Some("2019-06-12 10:30:15".to_string()),
        title: Some(format!("story {n}")),
        url: Some(format!("https://example.org/{n}")),
        language: Some("en".to_string()),
        media_name: Some("BBC".to_string()),
        media_url: Some("https://bbc.co.uk".to_string()),
    }
}

/// Serves `total` synthetic stories in processed order and records every
/// cursor value requested.
struct PagedBackend {
    total: u64,
    calls: AtomicUsize,
    cursors: Mutex<Vec<u64>>,
}

impl PagedBackend {
    fn new(total: u64) -> Self {
        Self {
            total,
            calls: AtomicUsize::new(0),
            cursors: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchApi for PagedBackend {
    async fn story_count(&self, _q: &str, _fq: &str) -> Result<CountResult, ApiError> {
        Ok(CountResult { count: self.total })
    }

    async fn story_page(
        &self,
        _q: &str,
        _fq: &str,
        last_processed_stories_id: u64,
        rows: u32,
    ) -> Result<Vec<Story>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors
            .lock()
            .unwrap()
            .push(last_processed_stories_id);
        // story n has processed id n+1, so "strictly after cursor k" is n >= k
        let page = (last_processed_stories_id..self.total)
            .take(rows as usize)
            .map(synth_story)
            .collect();
        Ok(page)
    }

    async fn word_count(
        &self,
        _q: &str,
        _fq: &str,
        _sample_size: u32,
    ) -> Result<Vec<WordCount>, ApiError> {
        Ok(Vec::new())
    }

    async fn tag_count(
        &self,
        _q: &str,
        _fq: &str,
        _tag_sets_id: u64,
    ) -> Result<Vec<TagCount>, ApiError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn drains_every_story_exactly_once() {
    for (total, rows) in [(0u64, 1u32), (1, 1), (5, 2), (500, 500), (1137, 500)] {
        let api = PagedBackend::new(total);
        let stories = acquire::drain_stories(&api, "q", "fq", rows).await.unwrap();

        let mut ids: Vec<u64> = stories.iter().map(|s| s.stories_id).collect();
        ids.sort_unstable();
        let expected: Vec<u64> = (0..total).collect();
        assert_eq!(ids, expected, "total={total} rows={rows}");
    }
}

#[tokio::test]
async fn termination_costs_exactly_one_empty_page() {
    for (total, rows) in [(0u64, 500u32), (1, 500), (500, 500), (501, 500), (1137, 500)] {
        let api = PagedBackend::new(total);
        acquire::drain_stories(&api, "q", "fq", rows).await.unwrap();

        let full_pages = (total + rows as u64 - 1) / rows as u64;
        let got = api.calls.load(Ordering::SeqCst) as u64;
        assert_eq!(got, full_pages + 1, "total={total} rows={rows}");
    }
}

#[tokio::test]
async fn cursor_starts_at_zero_and_strictly_increases() {
    let api = PagedBackend::new(1137);
    acquire::drain_stories(&api, "q", "fq", 500).await.unwrap();

    let cursors = api.cursors.lock().unwrap();
    assert_eq!(cursors[0], 0);
    for pair in cursors.windows(2) {
        assert!(pair[0] < pair[1], "cursor went backwards: {pair:?}");
    }
}

#[tokio::test]
async fn requested_page_size_is_honored() {
    let api = PagedBackend::new(10);
    acquire::drain_stories(&api, "q", "fq", 3).await.unwrap();
    // 4 full-ish pages (3+3+3+1) plus the empty terminator
    assert_eq!(api.calls.load(Ordering::SeqCst), 5);
}

/// Three outlets, one of them with no matching stories. Picks the corpus by
/// parsing the media id out of the query, the same way a reader of the
/// real service logs would.
struct MultiSourceBackend;

fn media_id_of(q: &str) -> u64 {
    q.rsplit("media_id:").next().unwrap().parse().unwrap()
}

#[async_trait]
impl SearchApi for MultiSourceBackend {
    async fn story_count(&self, _q: &str, _fq: &str) -> Result<CountResult, ApiError> {
        Ok(CountResult { count: 0 })
    }

    async fn story_page(
        &self,
        q: &str,
        _fq: &str,
        last_processed_stories_id: u64,
        rows: u32,
    ) -> Result<Vec<Story>, ApiError> {
        let media_id = media_id_of(q);
        let total = match media_id {
            1 => 3,
            1094 => 0,
            39590 => 2,
            _ => 0,
        };
        let page = (last_processed_stories_id..total)
            .take(rows as usize)
            .map(|n| {
                let mut s = synth_story(n);
                s.stories_id = media_id * 10_000 + n;
                s.media_id = media_id;
                s
            })
            .collect();
        Ok(page)
    }

    async fn word_count(
        &self,
        _q: &str,
        _fq: &str,
        _sample_size: u32,
    ) -> Result<Vec<WordCount>, ApiError> {
        Ok(Vec::new())
    }

    async fn tag_count(
        &self,
        _q: &str,
        _fq: &str,
        _tag_sets_id: u64,
    ) -> Result<Vec<TagCount>, ApiError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn empty_source_in_the_middle_does_not_stop_the_run() {
    use chrono::NaiveDate;
    use media_coverage_explorer::query::DateRange;
    use media_coverage_explorer::Source;

    let sources = vec![
        Source {
            id: 1,
            name: "New York Times".into(),
        },
        Source {
            id: 1094,
            name: "BBC".into(),
        },
        Source {
            id: 39590,
            name: "South China Morning Post".into(),
        },
    ];
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
    );

    let stories = acquire::fetch_sources(
        &MultiSourceBackend,
        &sources,
        r#""Hong Kong" AND protest*"#,
        range,
        500,
    )
    .await
    .unwrap();

    assert_eq!(stories.len(), 5);
    let media_order: Vec<u64> = stories.iter().map(|s| s.media_id).collect();
    assert_eq!(media_order, vec![1, 1, 1, 39590, 39590]);
}
