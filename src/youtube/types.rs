//! Wire formats of the YouTube Data API responses.
//!
//! Only the fields the pipeline reads are declared. Required fields are
//! non-optional so a response missing them fails to decode instead of
//! leaking half-filled records into the pipeline.

use serde::Deserialize;

use super::ApiError;
use crate::model::{PlaylistPage, RawItem, VideoMetadata};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
}

/// Google's error envelope: `{"error": {"code": 403, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl TryFrom<PlaylistItemListResponse> for PlaylistPage {
    type Error = ApiError;

    fn try_from(response: PlaylistItemListResponse) -> Result<Self, Self::Error> {
        let items = response
            .items
            .into_iter()
            .map(|item| {
                let video_id = item.content_details.video_id.trim().to_string();
                if video_id.is_empty() {
                    return Err(ApiError::Malformed(
                        "playlist item without a video id".to_string(),
                    ));
                }
                Ok(RawItem { video_id })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // An empty token marks the last page just like an absent one
        let next_page_token = response.next_page_token.filter(|t| !t.is_empty());

        Ok(PlaylistPage {
            items,
            next_page_token,
        })
    }
}

impl VideoListResponse {
    /// Validates the decoded resources into pipeline records.
    pub(crate) fn into_videos(self) -> Result<Vec<VideoMetadata>, ApiError> {
        self.items
            .into_iter()
            .map(|video| {
                let video_id = video.id.trim().to_string();
                if video_id.is_empty() {
                    return Err(ApiError::Malformed("video without an id".to_string()));
                }
                Ok(VideoMetadata {
                    video_id,
                    title: video.snippet.title,
                    description: video.snippet.description,
                    published_at: video.snippet.published_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_playlist_page_decoding() {
        let json = r#"{
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "CDIQAA",
            "items": [
                {"contentDetails": {"videoId": "v1", "videoPublishedAt": "2024-01-01T00:00:00Z"}},
                {"contentDetails": {"videoId": "v2"}}
            ]
        }"#;

        let response: PlaylistItemListResponse = serde_json::from_str(json).unwrap();
        let page = PlaylistPage::try_from(response).unwrap();

        assert_eq!(
            page,
            PlaylistPage {
                items: vec![
                    RawItem {
                        video_id: "v1".into()
                    },
                    RawItem {
                        video_id: "v2".into()
                    },
                ],
                next_page_token: Some("CDIQAA".into()),
            }
        );
    }

    #[test]
    fn test_empty_page_token_means_last_page() {
        let json = r#"{"items": [], "nextPageToken": ""}"#;
        let response: PlaylistItemListResponse = serde_json::from_str(json).unwrap();
        let page = PlaylistPage::try_from(response).unwrap();
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_missing_items_is_empty_page() {
        let response: PlaylistItemListResponse = serde_json::from_str("{}").unwrap();
        let page = PlaylistPage::try_from(response).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_missing_video_id_fails_to_decode() {
        let json = r#"{"items": [{"contentDetails": {}}]}"#;
        assert!(serde_json::from_str::<PlaylistItemListResponse>(json).is_err());
    }

    #[test]
    fn test_blank_video_id_is_malformed() {
        let json = r#"{"items": [{"contentDetails": {"videoId": "  "}}]}"#;
        let response: PlaylistItemListResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            PlaylistPage::try_from(response),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_video_decoding_defaults_description() {
        let json = r#"{"items": [{
            "id": "v1",
            "snippet": {"title": "Hello", "publishedAt": "2024-03-01T12:00:00Z"}
        }]}"#;

        let response: VideoListResponse = serde_json::from_str(json).unwrap();
        let videos = response.into_videos().unwrap();

        assert_eq!(
            videos,
            vec![VideoMetadata {
                video_id: "v1".into(),
                title: "Hello".into(),
                description: String::new(),
                published_at: "2024-03-01T12:00:00Z".into(),
            }]
        );
    }

    #[test]
    fn test_video_without_published_at_fails_to_decode() {
        let json = r#"{"items": [{"id": "v1", "snippet": {"title": "Hello"}}]}"#;
        assert!(serde_json::from_str::<VideoListResponse>(json).is_err());
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"error": {"code": 403, "message": "quota exceeded", "errors": []}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.message, "quota exceeded");
    }
}
