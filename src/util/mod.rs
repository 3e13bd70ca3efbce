//! Utility functions for text handling.
//!
//! - **Truncation**: character-exact cuts for feed descriptions
//! - **XML hygiene**: removal of characters XML 1.0 cannot carry
//!
//! # Examples
//!
//! ```
//! use tubefeed::util::{strip_invalid_xml_chars, truncate_chars};
//!
//! let clean = strip_invalid_xml_chars("title\u{0}");
//! assert_eq!(clean, "title");
//!
//! let cut = truncate_chars("A long description", 6);
//! assert_eq!(cut, "A long");
//! ```

mod text;

pub use text::{strip_invalid_xml_chars, truncate_chars};
