use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors, fatal at start-up
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `http(s)://` URL or local directory holding `config.json` and `data/`
    pub data_base: String,
    /// Where chart PNGs are written
    pub out_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub page_size: usize,
    pub http_timeout: Duration,
    /// Rate API used by `fetch`
    pub fx_api_base: String,
    /// RSS/Atom feeds used by `fetch`
    pub news_feeds: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_base: "./docs".to_string(),
            out_dir: PathBuf::from("./out"),
            chart_width: 1024,
            chart_height: 480,
            page_size: 10,
            http_timeout: Duration::from_secs(30),
            fx_api_base: "https://api.exchangerate.host".to_string(),
            news_feeds: vec![
                "https://feeds.bbci.co.uk/persian/rss.xml".to_string(),
                "https://www.reuters.com/world/rss".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_base = lookup("MRNEWS_DATA_BASE").unwrap_or(defaults.data_base);
        let out_dir = lookup("MRNEWS_OUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.out_dir);
        let chart_width = parse_positive(&lookup, "MRNEWS_CHART_WIDTH", defaults.chart_width as u64)? as u32;
        let chart_height = parse_positive(&lookup, "MRNEWS_CHART_HEIGHT", defaults.chart_height as u64)? as u32;
        let page_size = parse_positive(&lookup, "MRNEWS_PAGE_SIZE", defaults.page_size as u64)? as usize;
        let timeout_secs = parse_positive(&lookup, "MRNEWS_HTTP_TIMEOUT_SECS", defaults.http_timeout.as_secs())?;
        let fx_api_base = lookup("MRNEWS_FX_API").unwrap_or(defaults.fx_api_base);
        let news_feeds = match lookup("MRNEWS_NEWS_FEEDS") {
            Some(raw) => parse_list(&raw),
            None => defaults.news_feeds,
        };

        Ok(Self {
            data_base,
            out_dir,
            chart_width,
            chart_height,
            page_size,
            http_timeout: Duration::from_secs(timeout_secs),
            fx_api_base,
            news_feeds,
        })
    }
}

/// Comma-separated list, blanks dropped
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 && v <= u32::MAX as u64 => Ok(v),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}
