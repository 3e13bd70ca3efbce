use futures::TryStreamExt;
use std::collections::{BTreeMap, BTreeSet};

use super::crawler::crawl_playlist;
use crate::model::Collection;
use crate::youtube::{ApiError, VideoApi};

/// Unique video ids across all crawled playlists, with the names of the
/// collections each one was found in.
///
/// Ids and collection names are kept in `BTree` collections so iteration
/// order is deterministic and category lists come out sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Membership {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `video_id` belongs to `collection`.
    ///
    /// Returns `true` if the pair was new. Re-adding a pair is a no-op.
    pub fn insert(&mut self, video_id: impl Into<String>, collection: &str) -> bool {
        self.entries
            .entry(video_id.into())
            .or_default()
            .insert(collection.to_string())
    }

    /// Unique video ids, in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Sorted collection names containing `video_id`.
    pub fn collections_of(&self, video_id: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(video_id)
    }

    /// Number of unique video ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Crawls every collection, in the given order, and merges their items.
///
/// All pages of the first collection are fetched before the second one is
/// started. The first failing request aborts the whole aggregation.
pub async fn aggregate<A: VideoApi>(
    api: &A,
    collections: &[Collection],
) -> Result<Membership, ApiError> {
    let mut membership = Membership::new();

    for collection in collections {
        let mut pages = std::pin::pin!(crawl_playlist(api, &collection.playlist_id));
        let mut listed = 0usize;

        while let Some(page) = pages.try_next().await? {
            listed += page.len();
            for item in page {
                membership.insert(item.video_id, &collection.name);
            }
        }

        tracing::info!(
            collection = %collection.name,
            playlist_id = %collection.playlist_id,
            items = listed,
            "Crawled playlist"
        );
    }

    Ok(membership)
}
