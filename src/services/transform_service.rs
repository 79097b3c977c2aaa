use chrono::Duration;
use tracing::{debug, warn};

use crate::api::snapshot::Rates;
use crate::models::{Sample, Series, LOCAL_UNIT};
use super::align_service::convert_series;

/// Parse timeframe string to duration
/// Supported: 1d, 2d, 4d, 7d, 14d, 30d, 90d, 1w, 2w, 4w, 1M, 3M, 1y, all
pub fn parse_chart_timeframe(timeframe: &str) -> Result<Option<Duration>, String> {
    match timeframe.to_lowercase().as_str() {
        "1d" => Ok(Some(Duration::days(1))),
        "2d" => Ok(Some(Duration::days(2))),
        "4d" => Ok(Some(Duration::days(4))),
        "7d" => Ok(Some(Duration::days(7))),
        "14d" => Ok(Some(Duration::days(14))),
        "30d" => Ok(Some(Duration::days(30))),
        "90d" => Ok(Some(Duration::days(90))),
        "1w" => Ok(Some(Duration::weeks(1))),
        "2w" => Ok(Some(Duration::weeks(2))),
        "4w" => Ok(Some(Duration::weeks(4))),
        "1m" | "1month" => Ok(Some(Duration::days(30))),
        "3m" | "3months" => Ok(Some(Duration::days(90))),
        "1y" | "1year" => Ok(Some(Duration::days(365))),
        "all" => Ok(None), // None means no time filter
        _ => Err(format!(
            "❌ Unknown timeframe: '{}'. Supported: 1d, 2d, 4d, 7d, 14d, 30d, 90d, 1w, 2w, 4w, 1M, 3M, 1y, all",
            timeframe
        )),
    }
}

/// Keep each series' samples within `range` of that series' latest sample.
/// Snapshots can be days old, so the window is anchored on the data, not on now.
pub fn slice_range(series: &[Series], range: Option<Duration>) -> Vec<Series> {
    let Some(range) = range else {
        return series.to_vec();
    };

    series
        .iter()
        .map(|s| {
            let Some(latest) = s.last().map(|p| p.timestamp) else {
                return s.clone();
            };
            let cutoff = latest - range;
            Series {
                label: s.label.clone(),
                unit: s.unit.clone(),
                points: s.points.iter().copied().filter(|p| p.timestamp >= cutoff).collect(),
            }
        })
        .collect()
}

/// The fx series quoting USD in the local currency, if the snapshot has one
pub fn find_usd_rate(fx: &[Series]) -> Option<&Series> {
    fx.iter().find(|s| {
        !s.is_empty()
            && s.label.to_uppercase().contains("USD")
            && s.unit.as_deref().map_or(true, |u| u.eq_ignore_ascii_case(LOCAL_UNIT))
    })
}

/// Convert gold quotes to the local currency.
///
/// Uses the USD fx series as a step-held rate; without one, falls back to the
/// constant `USD` multiplier from `rates.json`. With neither, returns no series.
pub fn gold_in_local(gold: &[Series], fx: &[Series], rates: Option<&Rates>) -> Vec<Series> {
    let rate_series = match find_usd_rate(fx) {
        Some(series) => {
            debug!("Converting gold through fx series '{}'", series.label);
            series.clone()
        }
        None => match rates.and_then(|r| r.usd) {
            Some(usd) => {
                debug!("Converting gold through constant USD rate {}", usd);
                let start = gold
                    .iter()
                    .filter_map(|s| s.sorted_points().first().map(|p| p.timestamp))
                    .min();
                match start {
                    Some(start) => Series::new("USD (rates.json)", Some(LOCAL_UNIT), vec![Sample::new(start, usd)]),
                    None => return Vec::new(),
                }
            }
            None => {
                warn!("No USD rate available, gold cannot be shown in {}", LOCAL_UNIT);
                return Vec::new();
            }
        },
    };

    gold.iter()
        .map(|s| {
            let label = format!("{} → {}", s.label, LOCAL_UNIT);
            convert_series(s, &rate_series, &label, Some(LOCAL_UNIT))
        })
        .collect()
}
