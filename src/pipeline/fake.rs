//! In-memory [`VideoApi`] used by the pipeline unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::{PlaylistPage, RawItem, VideoMetadata};
use crate::youtube::{ApiError, VideoApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Page {
        playlist_id: String,
        page_token: Option<String>,
    },
    Videos(Vec<String>),
}

/// Serves playlists as pre-split pages and videos from a lookup table.
///
/// Page tokens have the form `{playlist_id}#{page_index}`.
#[derive(Default)]
pub(crate) struct FakeApi {
    playlists: HashMap<String, Vec<Vec<String>>>,
    videos: HashMap<String, VideoMetadata>,
    failing_page: Option<(String, usize)>,
    fail_videos: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(mut self, playlist_id: &str, pages: &[&[&str]]) -> Self {
        let pages = pages
            .iter()
            .map(|page| page.iter().map(|id| id.to_string()).collect())
            .collect();
        self.playlists.insert(playlist_id.to_string(), pages);
        self
    }

    pub fn with_video(self, video_id: &str, published_at: &str) -> Self {
        self.with_metadata(VideoMetadata {
            video_id: video_id.to_string(),
            title: format!("Title {video_id}"),
            description: format!("Description {video_id}"),
            published_at: published_at.to_string(),
        })
    }

    pub fn with_metadata(mut self, metadata: VideoMetadata) -> Self {
        self.videos.insert(metadata.video_id.clone(), metadata);
        self
    }

    pub fn failing_page(mut self, playlist_id: &str, page_index: usize) -> Self {
        self.failing_page = Some((playlist_id.to_string(), page_index));
        self
    }

    pub fn failing_videos(mut self) -> Self {
        self.fail_videos = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn video_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Videos(ids) => Some(ids),
                Call::Page { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VideoApi for FakeApi {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        _max_results: u32,
    ) -> Result<PlaylistPage, ApiError> {
        self.record(Call::Page {
            playlist_id: playlist_id.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let index = match page_token {
            None => 0,
            Some(token) => token
                .rsplit_once('#')
                .and_then(|(_, n)| n.parse().ok())
                .ok_or_else(|| ApiError::Malformed(format!("unknown page token {token}")))?,
        };

        if self.failing_page.as_ref() == Some(&(playlist_id.to_string(), index)) {
            return Err(ApiError::HttpStatus {
                status: 500,
                message: None,
            });
        }

        let pages = self.playlists.get(playlist_id).ok_or(ApiError::HttpStatus {
            status: 404,
            message: Some("playlistNotFound".to_string()),
        })?;

        let items = pages
            .get(index)
            .map(|ids| {
                ids.iter()
                    .map(|id| RawItem {
                        video_id: id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next_page_token =
            (index + 1 < pages.len()).then(|| format!("{}#{}", playlist_id, index + 1));

        Ok(PlaylistPage {
            items,
            next_page_token,
        })
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoMetadata>, ApiError> {
        self.record(Call::Videos(ids.to_vec()));

        if self.fail_videos {
            return Err(ApiError::HttpStatus {
                status: 503,
                message: None,
            });
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id).cloned())
            .collect())
    }
}
