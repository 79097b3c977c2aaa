use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{LatestResponse, TimeseriesResponse};
use crate::api::http::{get_bytes, FetchError};
use crate::api::snapshot::RawPoint;

/// exchangerate.host style rate API
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let bytes = get_bytes(&self.client, url).await?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Daily `base`→`symbol` rates from `start` through `end`
    pub async fn timeseries(
        &self,
        base: &str,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawPoint>, FetchError> {
        let url = format!(
            "{}/timeseries?start_date={}&end_date={}&base={}&symbols={}",
            self.base_url, start, end, base, symbol
        );
        let response: TimeseriesResponse = self.get_json(&url).await?;
        let points = response.points(symbol);
        debug!("{} {}→{} daily rates from {}", points.len(), base, symbol, self.base_url);
        Ok(points)
    }

    /// Current `base`→`symbol` rate, if the API quotes one
    pub async fn latest(&self, base: &str, symbol: &str) -> Result<Option<f64>, FetchError> {
        let url = format!("{}/latest?base={}&symbols={}", self.base_url, base, symbol);
        let response: LatestResponse = self.get_json(&url).await?;
        Ok(response.rate(symbol))
    }
}
