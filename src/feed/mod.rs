//! Upstream feed retrieval and parsing.
//!
//! - [`parser`] - RSS 2.0 parsing with `quick-xml` into [`Feed`] / [`Item`]
//! - [`fetcher`] - single-shot HTTP retrieval of the upstream document
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::FeedFetcher;
//!
//! let fetcher = FeedFetcher::new(client, "https://example.com/posts.rss", max_bytes);
//! let feed = fetcher.fetch().await?;
//! ```

mod fetcher;
mod parser;
mod types;

pub use fetcher::FeedFetcher;
pub use parser::{parse_feed, ParseError};
pub use types::{Feed, Item};
