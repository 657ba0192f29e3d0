//! Word counting over response bodies.
//!
//! Bodies are never buffered whole: [`WordMatcher`] reads them in fixed-size
//! chunks and carries a short tail between chunks, so memory stays bounded
//! no matter how large a page is.
//!
//! ```rust,ignore
//! let matcher = WordMatcher::new("go")?.with_chunk_size(8 * 1024);
//! let count = matcher.count(response)?;
//! ```
pub mod matcher;

pub use matcher::{MatchTally, WordMatcher, DEFAULT_CHUNK_SIZE};
