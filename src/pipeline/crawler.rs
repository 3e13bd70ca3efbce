use futures::stream::{self, Stream};

use crate::model::RawItem;
use crate::youtube::{ApiError, VideoApi};

/// Items requested per playlist page (the API maximum).
pub const PAGE_SIZE: u32 = 50;

/// Position of a playlist crawl.
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Crawls a playlist page by page.
///
/// Returns a lazy stream yielding the items of each page in listing order.
/// Each poll issues at most one request, passing the previous page's
/// continuation token; the stream ends once a page carries no token.
///
/// A failed request is yielded as the stream's error. Callers are expected
/// to stop there: the crawl is neither retried nor resumable.
pub fn crawl_playlist<'a, A: VideoApi>(
    api: &'a A,
    playlist_id: &'a str,
) -> impl Stream<Item = Result<Vec<RawItem>, ApiError>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };

        let page = api
            .playlist_page(playlist_id, token.as_deref(), PAGE_SIZE)
            .await?;

        tracing::debug!(
            playlist_id = %playlist_id,
            items = page.items.len(),
            has_next = page.next_page_token.is_some(),
            "Fetched playlist page"
        );

        let next = match page.next_page_token {
            Some(token) => Cursor::Next(token),
            None => Cursor::Done,
        };

        Ok::<_, ApiError>(Some((page.items, next)))
    })
}
