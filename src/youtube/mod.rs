//! Access to the YouTube Data API (v3).
//!
//! The pipeline only needs two operations from the platform:
//!
//! - **Playlist listing**: one page of a playlist's members, with a
//!   continuation token
//! - **Video lookup**: metadata for a batch of video ids
//!
//! Both are expressed by the [`VideoApi`] trait so the pipeline can be
//! driven by [`YouTubeClient`] in production and by in-memory fakes in
//! tests.

mod client;
mod types;

pub use client::{ApiError, YouTubeClient, DEFAULT_API_BASE};

use crate::model::{PlaylistPage, VideoMetadata};

/// The remote operations consumed by the pipeline.
#[allow(async_fn_in_trait)] // Used through generics only, never as `dyn`
pub trait VideoApi {
    /// Fetches one page of a playlist listing.
    ///
    /// `page_token` is `None` for the first page and the previous page's
    /// continuation token afterwards.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<PlaylistPage, ApiError>;

    /// Looks up metadata for a batch of video ids.
    ///
    /// Ids that are deleted, private or otherwise unavailable are simply
    /// missing from the result.
    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoMetadata>, ApiError>;
}
