use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{NewsItem, Sample, Series};
use crate::utils::parse_timestamp;

/// `config.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub modes: Vec<String>,
    pub categories: Vec<String>,
}

/// `data/fx_latest.json` and `data/gold_latest.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesFile {
    pub series: Vec<RawSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub points: Vec<RawPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub t: String,
    #[serde(default)]
    pub v: Option<f64>,
}

impl RawSeries {
    /// Decode into a domain series.
    /// Samples whose timestamp does not parse, or whose value is missing or
    /// not finite, are dropped.
    pub fn into_series(self) -> Series {
        let total = self.points.len();
        let points: Vec<Sample> = self
            .points
            .into_iter()
            .filter_map(|p| {
                let timestamp = parse_timestamp(&p.t)?;
                let value = p.v.filter(|v| v.is_finite())?;
                Some(Sample::new(timestamp, value))
            })
            .collect();

        if points.len() < total {
            warn!(
                "Dropped {} invalid sample(s) from series '{}'",
                total - points.len(),
                self.label
            );
        }

        Series {
            label: self.label,
            unit: self.unit,
            points,
        }
    }
}

impl SeriesFile {
    pub fn into_series(self) -> Vec<Series> {
        self.series.into_iter().map(RawSeries::into_series).collect()
    }
}

/// `data/news_macro.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsFile {
    pub items: Vec<NewsItem>,
}

/// `data/rates.json`: multipliers to the local currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "USD", default)]
    pub usd: Option<f64>,
    #[serde(rename = "EUR", default)]
    pub eur: Option<f64>,
}

/// Errors fetching or decoding one snapshot resource
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid data base '{0}'")]
    InvalidBase(String),
    #[error("Request for {path} failed: {message}")]
    Request { path: String, message: String },
    #[error("HTTP {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
