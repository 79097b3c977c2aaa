use reqwest::Client;
use tracing::debug;

use super::parser::{parse_feed, FeedEntry};
use crate::api::http::{get_bytes, FetchError};

/// Download and parse one RSS or Atom feed
pub async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
    let body = get_bytes(client, url).await?;
    let entries = parse_feed(&body).map_err(|e| FetchError::Feed {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    debug!("{} entries in feed {}", entries.len(), url);
    Ok(entries)
}
