//! RSS feed assembly and output.
//!
//! This module turns the videos that survived the publish window into the
//! final document:
//!
//! - **Assembly**: one entry per video, newest first, with sorted categories
//!   and truncated descriptions
//! - **Rendering**: RSS 2.0 serialization via `quick-xml`, escaping text and
//!   wrapping descriptions in CDATA
//! - **Output**: atomic replacement of the feed file on disk
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::{assemble, render_rss, write_feed};
//!
//! let feed = assemble(recent, &membership, &settings, now);
//! let xml = render_rss(&feed)?;
//! write_feed(Path::new("public/feed.xml"), &xml)?;
//! ```

mod assemble;
mod output;
mod rss;

pub use assemble::{assemble, FeedSettings, DEFAULT_TTL_MINUTES, MAX_DESCRIPTION_CHARS};
pub use output::{write_feed, DEFAULT_OUTPUT_PATH};
pub use rss::render_rss;
