//! One run of the tool: fetch the feed, enrich every item, write the output.
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::content::{enrich, ImageExtractor};
use crate::error::{Error, Outcome};
use crate::feed::{Feed, FeedFetcher, Item};
use crate::output::{write_feed, OutputFormat};
use crate::util::build_client;

/// Fetches the upstream feed and enriches its items.
pub struct Pipeline {
    fetcher: FeedFetcher,
    extractor: ImageExtractor,
    concurrency: usize,
}

impl Pipeline {
    /// `concurrency` bounds how many item pages are fetched at once. `1`
    /// processes items strictly one after another.
    pub fn new(fetcher: FeedFetcher, extractor: ImageExtractor, concurrency: usize) -> Self {
        Self {
            fetcher,
            extractor,
            concurrency: concurrency.max(1),
        }
    }

    /// Builds the HTTP client and both components from `config`.
    ///
    /// # Errors
    ///
    /// [`Error::Client`] if the client cannot be built, [`Error::Config`] if
    /// the content selector is invalid.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = build_client(&config.user_agent(), config.timeout()).map_err(Error::Client)?;

        let fetcher = FeedFetcher::new(
            client.clone(),
            config.feed_url.clone(),
            config.max_response_bytes,
        );
        let extractor = ImageExtractor::new(
            client,
            config.image_base_url.clone(),
            &config.content_selector,
            config.max_response_bytes,
        )?;

        Ok(Self::new(fetcher, extractor, config.concurrency()))
    }

    /// Fetches the feed and replaces every item's description with its
    /// enriched version. Item order is preserved whatever the concurrency.
    ///
    /// # Errors
    ///
    /// Fatal errors only. A page that cannot be fetched leaves its item with
    /// no images and is logged.
    pub async fn run(&self) -> Result<Feed, Error> {
        let mut feed = self.fetcher.fetch().await?;
        let items = std::mem::take(&mut feed.items);
        let total = items.len();

        // `buffered` yields results in input order, unlike `buffer_unordered`.
        feed.items = stream::iter(items)
            .map(|item| self.enrich_item(item))
            .buffered(self.concurrency)
            .try_collect::<Vec<Item>>()
            .await?;

        tracing::info!(items = total, "Enriched items");
        Ok(feed)
    }

    async fn enrich_item(&self, mut item: Item) -> Result<Item, Error> {
        tracing::debug!(title = %item.title, url = %item.link, "Fetching images for item");

        let images = match Outcome::from(self.extractor.extract_images(&item.link).await) {
            Outcome::Success(images) => images,
            Outcome::Recoverable(e) => {
                tracing::warn!(
                    title = %item.title,
                    error = %e,
                    "Continuing without images for item"
                );
                Vec::new()
            }
            Outcome::Fatal(e) => return Err(e),
        };

        item.description = enrich(&item, &images);
        Ok(item)
    }
}

/// Runs the whole tool: fetch, enrich, then write `format` into `outdir`.
///
/// Nothing is written unless the feed was fetched and parsed. Returns the path
/// of the written file.
pub async fn generate(
    config: &Config,
    outdir: &Path,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, Error> {
    let pipeline = Pipeline::from_config(config)?;
    let feed = pipeline.run().await?;

    let emitter = format.emitter(&config.author);
    let path = write_feed(
        emitter.as_ref(),
        &feed,
        outdir,
        config.output_file.as_deref(),
        generated_at,
    )?;
    Ok(path)
}
