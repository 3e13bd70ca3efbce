//! The aggregation pipeline: playlists in, feed document out.
//!
//! Stages run strictly one after another, each owning its output until it
//! hands it to the next:
//!
//! 1. [`crawler`]: page through each playlist
//! 2. [`aggregate`]: merge ids across playlists, tracking membership
//! 3. [`metadata`]: batched metadata lookups
//! 4. [`window`]: keep videos published inside the trailing window
//! 5. [`crate::feed`]: sort, render and write the document
//!
//! Requests are issued one at a time in a fixed order. Any failure aborts
//! the run before the output file is touched.

pub mod aggregate;
pub mod crawler;
pub mod metadata;
pub mod window;

#[cfg(test)]
pub(crate) mod fake;

pub use aggregate::{aggregate, Membership};
pub use crawler::{crawl_playlist, PAGE_SIZE};
pub use metadata::{fetch_metadata, BATCH_SIZE};
pub use window::{filter_recent, parse_published_at, TimestampError, Window};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::feed::{assemble, render_rss, write_feed, FeedSettings};
use crate::model::{Collection, Feed};
use crate::youtube::VideoApi;

/// Everything a run needs besides the API client and the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub collections: Vec<Collection>,
    pub window_days: u32,
    pub feed: FeedSettings,
}

/// Counts reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub collections: usize,
    pub unique_videos: usize,
    pub fetched: usize,
    pub entries: usize,
}

/// Runs every stage up to (but not including) serialization.
///
/// `now` is used both for the window cutoff and as the feed's build date.
pub async fn build_feed<A: VideoApi>(
    api: &A,
    config: &PipelineConfig,
    now: DateTime<Utc>,
) -> Result<(Feed, RunSummary)> {
    let membership = aggregate(api, &config.collections)
        .await
        .context("Failed to crawl playlists")?;

    let mut summary = RunSummary {
        collections: config.collections.len(),
        unique_videos: membership.len(),
        ..RunSummary::default()
    };

    let videos = if membership.is_empty() {
        tracing::info!("No videos found; the feed will have no items");
        Vec::new()
    } else {
        let ids: Vec<String> = membership.ids().map(str::to_string).collect();
        fetch_metadata(api, &ids)
            .await
            .context("Failed to fetch video metadata")?
    };
    summary.fetched = videos.len();

    let window = Window::trailing(now, config.window_days);
    let recent = filter_recent(videos, &window)?;

    let feed = assemble(recent, &membership, &config.feed, now);
    summary.entries = feed.entries.len();

    tracing::info!(
        collections = summary.collections,
        unique_videos = summary.unique_videos,
        fetched = summary.fetched,
        entries = summary.entries,
        window_days = config.window_days,
        "Feed assembled"
    );

    Ok((feed, summary))
}

/// Builds the feed, renders it and replaces the file at `output`.
///
/// Nothing is written unless every stage succeeded.
pub async fn run<A: VideoApi>(
    api: &A,
    config: &PipelineConfig,
    output: &Path,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let (feed, summary) = build_feed(api, config, now).await?;

    let xml = render_rss(&feed).context("Failed to render feed")?;
    write_feed(output, &xml)
        .with_context(|| format!("Failed to write feed to '{}'", output.display()))?;

    tracing::info!(path = %output.display(), entries = summary.entries, "Wrote feed");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::DEFAULT_TTL_MINUTES;
    use crate::pipeline::fake::FakeApi;
    use chrono::{SecondsFormat, TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> String {
        (now() - TimeDelta::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn config(collections: Vec<Collection>) -> PipelineConfig {
        PipelineConfig {
            collections,
            window_days: 14,
            feed: FeedSettings {
                title: "Test".to_string(),
                description: "Test feed".to_string(),
                link: None,
                ttl_minutes: DEFAULT_TTL_MINUTES,
            },
        }
    }

    #[tokio::test]
    async fn test_multi_membership_scenario() {
        let api = FakeApi::new()
            .with_playlist("P1", &[&["v1", "v2"]])
            .with_playlist("P2", &[&["v1"]])
            .with_video("v1", &days_ago(3))
            .with_video("v2", &days_ago(20));
        let config = config(vec![Collection::new("A", "P1"), Collection::new("B", "P2")]);

        let (feed, summary) = build_feed(&api, &config, now()).await.unwrap();

        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].guid, "v1");
        assert_eq!(feed.entries[0].categories, vec!["A", "B"]);
        assert_eq!(
            summary,
            RunSummary {
                collections: 2,
                unique_videos: 2,
                fetched: 2,
                entries: 1,
            }
        );
        // Each unique id is looked up once
        assert_eq!(api.video_batches(), vec![vec!["v1", "v2"]]);
    }

    #[tokio::test]
    async fn test_missing_metadata_silently_dropped() {
        let api = FakeApi::new()
            .with_playlist("P1", &[&["gone", "kept"]])
            .with_video("kept", &days_ago(1));
        let config = config(vec![Collection::new("A", "P1")]);

        let (feed, summary) = build_feed(&api, &config, now()).await.unwrap();

        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].guid, "kept");
        assert_eq!(summary.unique_videos, 2);
        assert_eq!(summary.fetched, 1);
    }

    #[tokio::test]
    async fn test_empty_playlists_skip_metadata_lookup() {
        let api = FakeApi::new().with_playlist("P1", &[]);
        let config = config(vec![Collection::new("A", "P1")]);

        let (feed, _) = build_feed(&api, &config, now()).await.unwrap();

        assert!(feed.entries.is_empty());
        assert_eq!(feed.last_build_date, now());
        assert!(api.video_batches().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_inside_window_writes_empty_channel() {
        let dir = std::env::temp_dir().join("tubefeed_pipeline_test_all_old");
        let _ = std::fs::remove_dir_all(&dir);
        let output = dir.join("feed.xml");

        let api = FakeApi::new()
            .with_playlist("P1", &[&["old1", "old2"]])
            .with_video("old1", &days_ago(15))
            .with_video("old2", &days_ago(30));
        let config = config(vec![Collection::new("A", "P1")]);

        let summary = run(&api, &config, &output, now()).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                collections: 1,
                unique_videos: 2,
                fetched: 2,
                entries: 0,
            }
        );
        // Metadata was still looked up before the window emptied the feed
        assert_eq!(api.video_batches(), vec![vec!["old1", "old2"]]);

        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(xml.contains("<channel><title>Test</title>"));
        assert!(xml.contains("<ttl>30</ttl>"));
        assert!(!xml.contains("<item>"));
        assert!(xml.ends_with("</channel></rss>"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_malformed_timestamp_fails_run() {
        let api = FakeApi::new()
            .with_playlist("P1", &[&["v1"]])
            .with_video("v1", "yesterday");
        let config = config(vec![Collection::new("A", "P1")]);

        let err = build_feed(&api, &config, now()).await.unwrap_err();

        assert!(err.downcast_ref::<TimestampError>().is_some());
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let dir = std::env::temp_dir().join("tubefeed_pipeline_test_failure");
        let _ = std::fs::remove_dir_all(&dir);
        let output = dir.join("feed.xml");

        let api = FakeApi::new()
            .with_playlist("P1", &[&["v1"]])
            .with_video("v1", &days_ago(1))
            .failing_videos();
        let config = config(vec![Collection::new("A", "P1")]);

        let result = run(&api, &config, &output, now()).await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_run_writes_document() {
        let dir = std::env::temp_dir().join("tubefeed_pipeline_test_run");
        let _ = std::fs::remove_dir_all(&dir);
        let output = dir.join("public").join("feed.xml");

        let api = FakeApi::new()
            .with_playlist("P1", &[&["v1"], &["v2"]])
            .with_video("v1", &days_ago(2))
            .with_video("v2", &days_ago(1));
        let config = config(vec![Collection::new("A", "P1")]);

        let summary = run(&api, &config, &output, now()).await.unwrap();

        assert_eq!(summary.entries, 2);
        let xml = std::fs::read_to_string(&output).unwrap();
        let v1 = xml.find(">v1</guid>").unwrap();
        let v2 = xml.find(">v2</guid>").unwrap();
        assert!(v2 < v1, "newest entry must come first");

        std::fs::remove_dir_all(&dir).ok();
    }
}
