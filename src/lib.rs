//! Rebuilds an RSS feed with each item's post images embedded in its
//! description.
//!
//! A run is linear: [`feed::FeedFetcher`] retrieves the upstream RSS,
//! [`content::ImageExtractor`] scrapes each item's page, [`content::enrich`]
//! rewrites the description, and an [`output::Emitter`] serializes the result
//! as Atom or RSS. [`pipeline::generate`] strings the steps together.

pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod output;
pub mod pipeline;
pub mod util;

pub use error::{Error, Outcome, Severity};
