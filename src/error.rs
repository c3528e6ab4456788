//! Crate-level error type and the severity split the pipeline acts on.
//!
//! Failures fetching a single item's page are isolated to that item. Every
//! other failure ends the run.
use thiserror::Error;

use crate::config::ConfigError;
use crate::feed::ParseError;
use crate::output::EmitError;
use crate::util::FetchError;

#[derive(Debug, Error)]
pub enum Error {
    /// The upstream feed could not be retrieved.
    #[error("Failed to fetch feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The upstream feed is not a usable RSS document.
    #[error("Failed to parse feed {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },

    /// An item's page could not be retrieved.
    #[error("Failed to extract images from {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Output directory creation, serialization or file write failed.
    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// How far an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged; the run continues with a fallback for the affected item.
    Recoverable,
    /// Aborts the run.
    Fatal,
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::Extract { .. } => Severity::Recoverable,
            Error::Fetch { .. }
            | Error::Parse { .. }
            | Error::Emit(_)
            | Error::Config(_)
            | Error::Client(_) => Severity::Fatal,
        }
    }
}

/// Result of a pipeline step, tagged by severity so callers can match on it.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Recoverable(Error),
    Fatal(Error),
}

impl<T> From<Result<T, Error>> for Outcome<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => match e.severity() {
                Severity::Recoverable => Outcome::Recoverable(e),
                Severity::Fatal => Outcome::Fatal(e),
            },
        }
    }
}
