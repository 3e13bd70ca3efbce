//! Builds a deduplicated, time-windowed RSS feed from YouTube playlists.
//!
//! The binary in `main.rs` wires these modules together; they are exposed
//! as a library so integration tests can drive the pipeline directly.

pub mod config;
pub mod feed;
pub mod model;
pub mod pipeline;
pub mod util;
pub mod youtube;
