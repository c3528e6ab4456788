//! Serialization of the enriched feed and writing it to disk.
//!
//! The output format is a strategy: [`Emitter`] has one implementation per
//! format ([`RssEmitter`], [`AtomEmitter`]) and [`write_feed`] drives either.
//!
//! # Example
//!
//! ```ignore
//! use crate::output::{write_feed, OutputFormat};
//!
//! let emitter = OutputFormat::Atom.emitter("Feissarimokat");
//! let path = write_feed(emitter.as_ref(), &feed, Path::new("out"), None, Utc::now())?;
//! ```

mod atom;
mod rss;
mod xml;

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::Feed;

pub use atom::{AtomEmitter, DEFAULT_AUTHOR};
pub use rss::RssEmitter;

/// Errors that can occur while producing the output file.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to create output directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {format} feed: {message}")]
    Serialize {
        format: OutputFormat,
        message: String,
    },

    #[error("Failed to write output file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Atom 1.0
    #[default]
    Atom,
    /// RSS 2.0
    Rss,
}

impl OutputFormat {
    /// Returns the emitter for this format. `author` is only used by Atom,
    /// which requires one.
    pub fn emitter(self, author: &str) -> Box<dyn Emitter> {
        match self {
            OutputFormat::Atom => Box::new(AtomEmitter::new(author)),
            OutputFormat::Rss => Box::new(RssEmitter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Atom => f.write_str("atom"),
            OutputFormat::Rss => f.write_str("rss"),
        }
    }
}

/// Serializes a [`Feed`] into one output format.
pub trait Emitter {
    fn format(&self) -> OutputFormat;

    /// File name used when the configuration does not override it.
    fn default_file_name(&self) -> &'static str;

    /// Renders the full document, XML declaration included.
    ///
    /// `generated_at` is the only time-dependent input, so two renders of the
    /// same feed with the same timestamp are byte-identical.
    fn render(&self, feed: &Feed, generated_at: DateTime<Utc>) -> Result<String, EmitError>;
}

/// Renders `feed` and writes it into `outdir`, creating the directory if
/// needed. An existing file is overwritten in place.
///
/// Returns the path written.
///
/// # Errors
///
/// - [`EmitError::CreateDir`] if `outdir` cannot be created
/// - [`EmitError::Serialize`] if rendering fails
/// - [`EmitError::Write`] if the file cannot be written
pub fn write_feed(
    emitter: &dyn Emitter,
    feed: &Feed,
    outdir: &Path,
    file_name: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|source| EmitError::CreateDir {
        path: outdir.to_path_buf(),
        source,
    })?;

    let document = emitter.render(feed, generated_at)?;

    let path = outdir.join(file_name.unwrap_or_else(|| emitter.default_file_name()));
    std::fs::write(&path, document.as_bytes()).map_err(|source| EmitError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        format = %emitter.format(),
        items = feed.items.len(),
        bytes = document.len(),
        "Wrote feed"
    );

    Ok(path)
}
