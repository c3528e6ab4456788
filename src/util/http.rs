use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout for both the feed and the item pages.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on response bodies.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a single URL.
///
/// Shared by the feed fetcher and the image extractor. Whether a failure is
/// fatal is decided by the caller, not here.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// Any response other than 200 OK
    #[error("HTTP error: status {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e)
        }
    }
}

/// The client-agent string sent with every outbound request.
pub fn default_user_agent() -> String {
    format!(
        "FeissariRSS/{} (https://github.com/lepinkainen/feissari-rss)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Builds the HTTP client shared by the fetcher and the extractor.
///
/// The timeout covers the whole request, from connect to the last body byte.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Performs a single GET and returns the body.
///
/// No retries. Anything other than `200 OK` is an error, including other 2xx
/// codes.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    read_limited_bytes(response, max_bytes).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            // hyper fails the body stream when the peer closes before
            // Content-Length bytes arrived.
            Err(e) if e.is_body() && !e.is_timeout() => match expected_length {
                Some(expected) if (bytes.len() as u64) < expected => {
                    return Err(FetchError::IncompleteResponse {
                        expected,
                        received: bytes.len(),
                    });
                }
                _ => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        };
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
