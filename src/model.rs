//! Typed records passed between pipeline stages.
//!
//! Every record is created and consumed within a single run. Wire formats
//! from the YouTube API are decoded elsewhere (see `youtube::types`) and only
//! cross into the pipeline once validated into these types.

use chrono::{DateTime, Utc};

/// A configured playlist and the display name used for its `<category>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub playlist_id: String,
}

impl Collection {
    pub fn new(name: impl Into<String>, playlist_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            playlist_id: playlist_id.into(),
        }
    }

    /// Public page of the playlist on youtube.com.
    pub fn playlist_url(&self) -> String {
        format!("https://www.youtube.com/playlist?list={}", self.playlist_id)
    }
}

/// A single playlist membership, as listed by the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub video_id: String,
}

/// One page of a playlist listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    pub items: Vec<RawItem>,
    /// Continuation token for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Video metadata as returned by a batch lookup.
///
/// `published_at` is kept in its RFC3339 wire form; it is parsed by the
/// window filter, which is the only stage that interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published_at: String,
}

/// Metadata that passed the window filter, with its parsed publish instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedVideo {
    pub metadata: VideoMetadata,
    pub published_at: DateTime<Utc>,
}

/// A single `<item>` of the output feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub published_at: DateTime<Utc>,
    /// Owning collection names, sorted and unique.
    pub categories: Vec<String>,
    pub description: String,
}

/// The complete output document for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub last_build_date: DateTime<Utc>,
    /// Suggested reader refresh interval in minutes.
    pub ttl: u32,
    pub entries: Vec<FeedEntry>,
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
