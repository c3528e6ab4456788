use crate::error::Error;
use crate::feed::parser::parse_feed;
use crate::feed::types::Feed;
use crate::util::fetch_bytes;

/// Retrieves and parses the upstream RSS feed.
///
/// The client carries the timeout and client-agent string, so tests can point
/// a fetcher at a local server with a tighter timeout.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    url: String,
    max_bytes: usize,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            client,
            url: url.into(),
            max_bytes,
        }
    }

    /// Fetches the feed with a single GET and parses it.
    ///
    /// # Errors
    ///
    /// - [`Error::Fetch`] - network failure, timeout, oversized body or any
    ///   status other than 200
    /// - [`Error::Parse`] - the body is not an RSS document
    ///
    /// Both are fatal for the run. Nothing is retried.
    pub async fn fetch(&self) -> Result<Feed, Error> {
        tracing::debug!(url = %self.url, "Fetching upstream feed");

        let bytes = fetch_bytes(&self.client, &self.url, self.max_bytes)
            .await
            .map_err(|source| Error::Fetch {
                url: self.url.clone(),
                source,
            })?;

        let feed = parse_feed(&bytes).map_err(|source| Error::Parse {
            url: self.url.clone(),
            source,
        })?;

        tracing::info!(
            url = %self.url,
            title = %feed.title,
            items = feed.items.len(),
            "Fetched upstream feed"
        );

        Ok(feed)
    }
}
