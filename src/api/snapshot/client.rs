use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{NewsFile, Rates, SeriesFile, SiteConfig, SnapshotError};
use crate::models::Snapshot;

pub const CONFIG_PATH: &str = "config.json";
pub const FX_PATH: &str = "data/fx_latest.json";
pub const GOLD_PATH: &str = "data/gold_latest.json";
pub const NEWS_PATH: &str = "data/news_macro.json";
pub const RATES_PATH: &str = "data/rates.json";

#[derive(Debug, Clone)]
enum Source {
    Http { client: HttpClient, base_url: String },
    Directory(PathBuf),
}

/// Reads the dashboard's JSON snapshots from a web root or a local directory
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    source: Source,
}

impl SnapshotClient {
    const USER_AGENT: &'static str = "Mozilla/5.0 (compatible; MRNews-Dashboard/1.1)";

    /// Create a client for `base`: an `http(s)://` URL or a directory path
    pub fn new(base: &str, timeout: Duration) -> Result<Self, SnapshotError> {
        let base = base.trim();
        if base.is_empty() {
            return Err(SnapshotError::InvalidBase(base.to_string()));
        }

        if base.starts_with("http://") || base.starts_with("https://") {
            let client = HttpClient::builder()
                .user_agent(Self::USER_AGENT)
                .default_headers(Self::create_headers())
                .timeout(timeout)
                .build()
                .map_err(|e| SnapshotError::InvalidBase(format!("{}: {}", base, e)))?;
            Ok(Self {
                source: Source::Http {
                    client,
                    base_url: base.trim_end_matches('/').to_string(),
                },
            })
        } else {
            Ok(Self::from_dir(base))
        }
    }

    /// Create a client reading from a local directory
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Directory(dir.into()),
        }
    }

    /// Every request asks intermediaries for a fresh copy
    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, SnapshotError> {
        match &self.source {
            Source::Http { client, base_url } => {
                let url = format!("{}/{}", base_url, path);
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| SnapshotError::Request {
                        path: path.to_string(),
                        message: e.to_string(),
                    })?;

                if !response.status().is_success() {
                    return Err(SnapshotError::Status {
                        path: path.to_string(),
                        status: response.status().as_u16(),
                    });
                }

                let body = response.bytes().await.map_err(|e| SnapshotError::Request {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
                Ok(body.to_vec())
            }
            Source::Directory(dir) => tokio::fs::read(dir.join(path))
                .await
                .map_err(|source| SnapshotError::Io {
                    path: path.to_string(),
                    source,
                }),
        }
    }

    /// Fetch and decode one JSON resource
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SnapshotError> {
        let bytes = self.fetch_bytes(path).await?;
        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Fetch a resource, degrading any failure to `None`
    async fn fetch_optional<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.fetch_json::<T>(path).await {
            Ok(value) => {
                debug!("Loaded {}", path);
                Some(value)
            }
            Err(e) => {
                warn!("{} unavailable: {}", path, e);
                None
            }
        }
    }

    /// Fetch every snapshot resource concurrently and wait for all of them
    pub async fn load_all(&self) -> Snapshot {
        let (config, fx, gold, news, rates) = tokio::join!(
            self.fetch_optional::<SiteConfig>(CONFIG_PATH),
            self.fetch_optional::<SeriesFile>(FX_PATH),
            self.fetch_optional::<SeriesFile>(GOLD_PATH),
            self.fetch_optional::<NewsFile>(NEWS_PATH),
            self.fetch_optional::<Rates>(RATES_PATH),
        );

        Snapshot {
            config,
            fx: fx.map(SeriesFile::into_series),
            gold: gold.map(SeriesFile::into_series),
            news: news.map(|n| n.items),
            rates,
        }
    }
}
