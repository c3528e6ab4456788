//! Utility functions for common operations.
//!
//! This module provides the HTTP plumbing shared by the feed fetcher and the
//! image extractor:
//!
//! - **Client construction**: timeout and client-agent string applied once
//! - **Single-shot GET**: strict `200 OK` check and a bounded body read
//!
//! # Examples
//!
//! ```no_run
//! use feissari_rss::util::{build_client, default_user_agent, fetch_bytes, DEFAULT_TIMEOUT};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_client(&default_user_agent(), DEFAULT_TIMEOUT)?;
//! let _body = fetch_bytes(&client, "https://example.com/feed.rss", 1024 * 1024).await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{
    build_client, default_user_agent, fetch_bytes, FetchError, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_TIMEOUT,
};
