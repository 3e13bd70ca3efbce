use chrono::{DateTime, Utc};

use crate::model::{watch_url, DatedVideo, Feed, FeedEntry};
use crate::pipeline::Membership;
use crate::util::{strip_invalid_xml_chars, truncate_chars};

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Suggested reader refresh interval, in minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 30;

/// Channel-level fields of the generated feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub ttl_minutes: u32,
}

/// Builds the feed for one run.
///
/// Produces one entry per video, newest first. The sort is stable: videos
/// published at the same instant keep the order in which they were given.
/// Categories come from `membership`, already sorted and unique.
///
/// Every string that ends up in the document, including the configured
/// channel fields and collection names, has XML-forbidden characters removed.
pub fn assemble(
    videos: Vec<DatedVideo>,
    membership: &Membership,
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> Feed {
    let mut entries: Vec<FeedEntry> = videos
        .into_iter()
        .map(|video| to_entry(video, membership))
        .collect();

    // Vec::sort_by is stable
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    Feed {
        title: strip_invalid_xml_chars(&settings.title).into_owned(),
        link: settings
            .link
            .as_deref()
            .map(|link| strip_invalid_xml_chars(link).into_owned()),
        description: strip_invalid_xml_chars(&settings.description).into_owned(),
        last_build_date: now,
        ttl: settings.ttl_minutes,
        entries,
    }
}

fn to_entry(video: DatedVideo, membership: &Membership) -> FeedEntry {
    let DatedVideo {
        metadata,
        published_at,
    } = video;

    let categories = membership
        .collections_of(&metadata.video_id)
        .map(|names| {
            names
                .iter()
                .map(|name| strip_invalid_xml_chars(name).into_owned())
                .collect()
        })
        .unwrap_or_default();

    let description = strip_invalid_xml_chars(&metadata.description);
    let description = truncate_chars(&description, MAX_DESCRIPTION_CHARS).into_owned();

    FeedEntry {
        title: strip_invalid_xml_chars(&metadata.title).into_owned(),
        link: watch_url(&metadata.video_id),
        guid: metadata.video_id,
        published_at,
        categories,
        description,
    }
}
