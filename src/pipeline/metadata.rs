use std::collections::HashSet;

use crate::model::VideoMetadata;
use crate::youtube::{ApiError, VideoApi};

/// Maximum ids per metadata lookup (the API limit).
pub const BATCH_SIZE: usize = 50;

/// Resolves video ids to metadata with batched lookups.
///
/// Issues one request per chunk of at most [`BATCH_SIZE`] ids, in order,
/// and returns the records in the order the API produced them.
///
/// Ids the API does not return (deleted, private, region-locked) are simply
/// missing from the result. Records for ids that were not requested, or a
/// second record for an id already seen, are dropped so each id yields at
/// most one record.
pub async fn fetch_metadata<A: VideoApi>(
    api: &A,
    ids: &[String],
) -> Result<Vec<VideoMetadata>, ApiError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(ids.len());
    let mut videos = Vec::with_capacity(ids.len());

    for (index, batch) in ids.chunks(BATCH_SIZE).enumerate() {
        let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();
        let found = api.videos(batch).await?;

        let mut kept = 0usize;
        for video in found {
            if !requested.contains(video.video_id.as_str()) {
                tracing::warn!(
                    video_id = %video.video_id,
                    "Ignoring metadata for a video that was not requested"
                );
                continue;
            }
            if seen.insert(video.video_id.clone()) {
                videos.push(video);
                kept += 1;
            }
        }

        tracing::debug!(
            batch = index,
            requested = batch.len(),
            found = kept,
            "Fetched metadata batch"
        );
        if kept < batch.len() {
            tracing::debug!(
                batch = index,
                missing = batch.len() - kept,
                "Videos unavailable (deleted or private), skipping"
            );
        }
    }

    Ok(videos)
}
