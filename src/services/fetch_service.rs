use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::api::exchangerate::ExchangeRateClient;
use crate::api::feeds::{self, FeedEntry};
use crate::api::http::{fetcher_client, FetchError};
use crate::api::snapshot::client::{FX_PATH, GOLD_PATH, NEWS_PATH};
use crate::api::snapshot::{NewsFile, RawPoint, RawSeries, SeriesFile};
use crate::config::AppConfig;
use crate::models::{NewsItem, LOCAL_UNIT};
use crate::utils::parse_timestamp;

/// Days of history requested for every rate series
pub const FETCH_DAYS: i64 = 30;
pub const SUMMARY_CHARS: usize = 280;
pub const MAX_NEWS_ITEMS: usize = 100;

/// Rates used when the API has neither history nor a current quote
const USD_IRR_FALLBACK: f64 = 600_000.0;
const EUR_IRR_FALLBACK: f64 = 650_000.0;
const XAU_USD_FALLBACK: f64 = 2_300.0;

/// What one fetch run wrote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub fx_points: usize,
    pub gold_points: usize,
    pub news_items: usize,
    /// Pairs written as flat series because no history was available
    pub flat_pairs: Vec<String>,
    pub news_placeholder: bool,
}

impl FetchReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Wrote {} fx points, {} gold points, {} news items",
            self.fx_points, self.gold_points, self.news_items
        );
        if !self.flat_pairs.is_empty() {
            summary.push_str(&format!(" (flat: {})", self.flat_pairs.join(", ")));
        }
        if self.news_placeholder {
            summary.push_str(" (news placeholder)");
        }
        summary
    }
}

/// Rebuilds `fx_latest.json`, `gold_latest.json` and `news_macro.json`
/// in a local data directory from the rate API and news feeds
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    rates: ExchangeRateClient,
    feeds: Vec<String>,
    data_dir: PathBuf,
}

impl Fetcher {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let base = config.data_base.trim();
        if base.starts_with("http://") || base.starts_with("https://") {
            return Err(FetchError::RemoteBase(base.to_string()));
        }

        let client = fetcher_client(config.http_timeout)?;
        Ok(Self {
            rates: ExchangeRateClient::new(client.clone(), &config.fx_api_base),
            client,
            feeds: config.news_feeds.clone(),
            data_dir: PathBuf::from(base),
        })
    }

    /// Fetch everything concurrently, then write the three snapshot files
    pub async fn run(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<FetchReport, FetchError> {
        let ((fx, fx_flat), (gold, gold_flat), (news, news_placeholder)) =
            tokio::join!(self.build_fx(today), self.build_gold(today), self.build_news(now));

        let report = FetchReport {
            fx_points: fx.iter().map(|s| s.points.len()).sum(),
            gold_points: gold.iter().map(|s| s.points.len()).sum(),
            news_items: news.len(),
            flat_pairs: fx_flat.into_iter().chain(gold_flat).collect(),
            news_placeholder,
        };

        write_json(&self.data_dir.join(FX_PATH), &SeriesFile { series: fx }).await?;
        write_json(&self.data_dir.join(GOLD_PATH), &SeriesFile { series: gold }).await?;
        write_json(&self.data_dir.join(NEWS_PATH), &NewsFile { items: news }).await?;

        info!("📥 {}", report.summary());
        Ok(report)
    }

    /// History for one pair; falls back to a flat series at the current
    /// quote, or at `fallback` when there is none. Returns whether it went flat.
    async fn rate_points(&self, base: &str, symbol: &str, fallback: f64, today: NaiveDate) -> (Vec<RawPoint>, bool) {
        let start = today - Duration::days(FETCH_DAYS);
        match self.rates.timeseries(base, symbol, start, today).await {
            Ok(points) if !points.is_empty() => return (points, false),
            Ok(_) => warn!("No {}→{} history returned", base, symbol),
            Err(e) => warn!("{}→{} history unavailable: {}", base, symbol, e),
        }

        let value = match self.rates.latest(base, symbol).await {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                warn!("{}→{} quote unavailable: {}", base, symbol, e);
                fallback
            }
        };
        (flat_series(today, FETCH_DAYS, value), true)
    }

    async fn build_fx(&self, today: NaiveDate) -> (Vec<RawSeries>, Vec<String>) {
        let ((usd, usd_flat), (eur, eur_flat)) = tokio::join!(
            self.rate_points("USD", LOCAL_UNIT, USD_IRR_FALLBACK, today),
            self.rate_points("EUR", LOCAL_UNIT, EUR_IRR_FALLBACK, today),
        );

        let mut flat = Vec::new();
        if usd_flat {
            flat.push(format!("USD→{}", LOCAL_UNIT));
        }
        if eur_flat {
            flat.push(format!("EUR→{}", LOCAL_UNIT));
        }

        let series = vec![
            raw_series(&format!("Dollar (USD→{})", LOCAL_UNIT), LOCAL_UNIT, usd),
            raw_series(&format!("Euro (EUR→{})", LOCAL_UNIT), LOCAL_UNIT, eur),
        ];
        (series, flat)
    }

    async fn build_gold(&self, today: NaiveDate) -> (Vec<RawSeries>, Vec<String>) {
        let (points, flat) = self.rate_points("XAU", "USD", XAU_USD_FALLBACK, today).await;
        let flat = if flat { vec!["XAU→USD".to_string()] } else { Vec::new() };
        (vec![raw_series("Gold (XAU→USD)", "USD", points)], flat)
    }

    /// Every configured feed, newest first. A single placeholder item stands in
    /// when no feed produced anything.
    async fn build_news(&self, now: DateTime<Utc>) -> (Vec<NewsItem>, bool) {
        let mut items = Vec::new();
        for url in &self.feeds {
            match feeds::fetch_feed(&self.client, url).await {
                Ok(entries) => items.extend(entries.into_iter().filter_map(|e| entry_to_item(e, now))),
                Err(e) => warn!("Feed skipped: {}", e),
            }
        }

        if items.is_empty() {
            warn!("No news feed produced items, writing a placeholder");
            return (vec![placeholder_item(now)], true);
        }
        (newest_first(items), false)
    }
}

fn raw_series(label: &str, unit: &str, points: Vec<RawPoint>) -> RawSeries {
    RawSeries {
        label: label.to_string(),
        unit: Some(unit.to_string()),
        points,
    }
}

fn iso_utc(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One constant point per day at 12:00 UTC from `end - days` through `end`
pub fn flat_series(end: NaiveDate, days: i64, value: f64) -> Vec<RawPoint> {
    let start = end - Duration::days(days.max(0));
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| RawPoint {
            t: format!("{}T12:00:00Z", day),
            v: Some(value),
        })
        .collect()
}

/// Normalise a feed entry. Entries without a title or link are dropped;
/// an unreadable date becomes `now`.
pub fn entry_to_item(entry: FeedEntry, now: DateTime<Utc>) -> Option<NewsItem> {
    if entry.title.is_empty() || entry.link.is_empty() {
        return None;
    }

    let published_at = parse_timestamp(&entry.published).unwrap_or(now);
    let source = Url::parse(&entry.link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| entry.kind.fallback_source().to_string());
    let summary: String = entry.summary.chars().take(SUMMARY_CHARS).collect();

    Some(NewsItem {
        title: entry.title,
        source: Some(source),
        published: iso_utc(&published_at),
        published_ts: Some(published_at.timestamp_millis()),
        url: Some(entry.link),
        summary: (!summary.is_empty()).then_some(summary),
        image: None,
    })
}

/// Sort by `published_ts` descending and keep the newest [`MAX_NEWS_ITEMS`]
pub fn newest_first(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_ts.cmp(&a.published_ts));
    items.truncate(MAX_NEWS_ITEMS);
    items
}

fn placeholder_item(now: DateTime<Utc>) -> NewsItem {
    NewsItem {
        title: "Sample item: news feeds unavailable".to_string(),
        source: Some("Demo".to_string()),
        published: iso_utc(&now),
        published_ts: Some(now.timestamp_millis()),
        url: Some("https://example.com/".to_string()),
        summary: Some("Placeholder written because no feed could be read.".to_string()),
        image: None,
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| FetchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(|source| FetchError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, body).await.map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::feeds::parser::FeedKind;
    use crate::api::snapshot::SnapshotClient;
    use chrono::TimeZone;
    use std::time::Duration as StdDuration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 6, 0, 0).unwrap()
    }

    fn entry(title: &str, link: &str, published: &str) -> FeedEntry {
        FeedEntry {
            kind: FeedKind::Rss,
            title: title.to_string(),
            link: link.to_string(),
            published: published.to_string(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_flat_series_covers_every_day() {
        let end = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let points = flat_series(end, 30, 2300.0);

        assert_eq!(points.len(), 31);
        assert_eq!(points[0].t, "2024-04-10T12:00:00Z");
        assert_eq!(points[30].t, "2024-05-10T12:00:00Z");
        assert!(points.iter().all(|p| p.v == Some(2300.0)));
    }

    #[test]
    fn test_entry_to_item() {
        let mut long = entry("Gold", "https://www.reuters.com/markets/gold", "Thu, 09 May 2024 20:00:00 GMT");
        long.summary = "x".repeat(400);
        let item = entry_to_item(long, now()).unwrap();

        assert_eq!(item.source.as_deref(), Some("www.reuters.com"));
        assert_eq!(item.published, "2024-05-09T20:00:00Z");
        assert_eq!(
            item.published_ts,
            Some(Utc.with_ymd_and_hms(2024, 5, 9, 20, 0, 0).unwrap().timestamp_millis())
        );
        assert_eq!(item.summary.map(|s| s.chars().count()), Some(SUMMARY_CHARS));

        let undated = entry_to_item(entry("Undated", "not-a-url", "whenever"), now()).unwrap();
        assert_eq!(undated.source.as_deref(), Some("RSS"));
        assert_eq!(undated.published_ts, Some(now().timestamp_millis()));
        assert_eq!(undated.summary, None);

        assert!(entry_to_item(entry("", "https://a.example/", ""), now()).is_none());
        assert!(entry_to_item(entry("No link", "", ""), now()).is_none());
    }

    #[test]
    fn test_newest_first_caps_the_list() {
        let items: Vec<NewsItem> = (0..150)
            .map(|i| NewsItem {
                title: format!("item {}", i),
                published_ts: Some(i),
                ..NewsItem::default()
            })
            .collect();

        let sorted = newest_first(items);
        assert_eq!(sorted.len(), MAX_NEWS_ITEMS);
        assert_eq!(sorted[0].published_ts, Some(149));
        assert_eq!(sorted[99].published_ts, Some(50));
    }

    #[test]
    fn test_fetcher_needs_local_directory() {
        let config = AppConfig {
            data_base: "https://example.org/docs".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(Fetcher::new(&config), Err(FetchError::RemoteBase(_))));
    }

    #[tokio::test]
    async fn test_unreachable_sources_write_fallback_snapshots() {
        let dir = std::env::temp_dir().join(format!(
            "mrnews_fetch_{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = AppConfig {
            data_base: dir.display().to_string(),
            fx_api_base: "http://127.0.0.1:9".to_string(),
            news_feeds: vec!["http://127.0.0.1:9/rss.xml".to_string()],
            http_timeout: StdDuration::from_secs(2),
            ..AppConfig::default()
        };

        let report = Fetcher::new(&config).unwrap().run(now().date_naive(), now()).await.unwrap();
        assert_eq!(report.fx_points, 62);
        assert_eq!(report.gold_points, 31);
        assert_eq!(report.flat_pairs.len(), 3);
        assert!(report.news_placeholder);

        let snapshot = SnapshotClient::from_dir(&dir).load_all().await;
        let fx = snapshot.fx.unwrap();
        assert_eq!(fx.len(), 2);
        assert!(fx[0].points.iter().all(|p| p.value == USD_IRR_FALLBACK));
        assert_eq!(snapshot.gold.unwrap()[0].points[0].value, XAU_USD_FALLBACK);
        let news = snapshot.news.unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].source.as_deref(), Some("Demo"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
