use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::model::{DatedVideo, VideoMetadata};

/// A video's `publishedAt` value was not valid RFC3339.
#[derive(Debug, Error)]
#[error("Invalid publish timestamp {value:?} for video {video_id}: {source}")]
pub struct TimestampError {
    pub video_id: String,
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// A trailing time window ending at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    cutoff: DateTime<Utc>,
}

impl Window {
    /// The window covering the `days` days before `now`.
    pub fn trailing(now: DateTime<Utc>, days: u32) -> Self {
        let cutoff = TimeDelta::try_days(i64::from(days))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { cutoff }
    }

    /// Oldest instant still inside the window.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Whether `instant` falls inside the window. The cutoff itself is included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.cutoff
    }
}

/// Parses an RFC3339 timestamp (`Z` or numeric offset) into a UTC instant.
pub fn parse_published_at(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

/// Keeps the videos published inside `window`, preserving input order.
///
/// Every timestamp is parsed, including those of videos that end up
/// outside the window: malformed upstream data fails the run.
pub fn filter_recent(
    videos: Vec<VideoMetadata>,
    window: &Window,
) -> Result<Vec<DatedVideo>, TimestampError> {
    let total = videos.len();
    let mut recent = Vec::with_capacity(total);

    for metadata in videos {
        let published_at =
            parse_published_at(&metadata.published_at).map_err(|source| TimestampError {
                video_id: metadata.video_id.clone(),
                value: metadata.published_at.clone(),
                source,
            })?;

        if window.contains(published_at) {
            recent.push(DatedVideo {
                metadata,
                published_at,
            });
        }
    }

    tracing::info!(
        cutoff = %window.cutoff().to_rfc3339(),
        total = total,
        recent = recent.len(),
        "Applied publish window"
    );

    Ok(recent)
}
