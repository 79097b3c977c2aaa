use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use thiserror::Error;

const FETCHER_USER_AGENT: &str = "Mozilla/5.0 (compatible; MRNews-DataFetcher/1.1)";

/// Errors refreshing the snapshot files from upstream sources
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Snapshots can only be written to a local directory, not '{0}'")]
    RemoteBase(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed feed {url}: {message}")]
    Feed { url: String, message: String },
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shared client for the upstream rate API and news feeds
pub fn fetcher_client(timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/xml, application/xml;q=0.9, */*;q=0.8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(FETCHER_USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

pub async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(|e| FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(body.to_vec())
}
