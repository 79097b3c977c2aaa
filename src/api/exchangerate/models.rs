use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::api::snapshot::RawPoint;

/// `GET /timeseries`: one map of symbol rates per ISO day
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimeseriesResponse {
    #[serde(deserialize_with = "crate::utils::null_as_default")]
    pub rates: BTreeMap<String, HashMap<String, Option<f64>>>,
}

/// `GET /latest`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LatestResponse {
    #[serde(deserialize_with = "crate::utils::null_as_default")]
    pub rates: HashMap<String, Option<f64>>,
}

pub fn round_rate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

impl TimeseriesResponse {
    /// Daily points at 12:00 UTC, oldest first; days without a finite rate are skipped
    pub fn points(&self, symbol: &str) -> Vec<RawPoint> {
        self.rates
            .iter()
            .filter_map(|(day, rates)| {
                let value = rates.get(symbol).copied().flatten().filter(|v| v.is_finite())?;
                Some(RawPoint {
                    t: format!("{}T12:00:00Z", day),
                    v: Some(round_rate(value)),
                })
            })
            .collect()
    }
}

impl LatestResponse {
    pub fn rate(&self, symbol: &str) -> Option<f64> {
        self.rates
            .get(symbol)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
            .map(round_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeseries_points_sorted_and_filtered() {
        let json = r#"{"success":true,"rates":{
            "2024-05-03":{"IRR":42100.1234567},
            "2024-05-01":{"IRR":42000},
            "2024-05-02":{"IRR":null},
            "2024-05-04":{"EUR":0.9}
        }}"#;
        let response: TimeseriesResponse = serde_json::from_str(json).unwrap();
        let points = response.points("IRR");

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].t, "2024-05-01T12:00:00Z");
        assert_eq!(points[1].v, Some(42100.123457));
    }

    #[test]
    fn test_error_payloads_decode_as_empty() {
        let response: TimeseriesResponse =
            serde_json::from_str(r#"{"success":false,"error":{"code":101},"rates":null}"#).unwrap();
        assert!(response.points("IRR").is_empty());

        let latest: LatestResponse = serde_json::from_str(r#"{"rates":{"USD":2301.5}}"#).unwrap();
        assert_eq!(latest.rate("USD"), Some(2301.5));
        assert_eq!(latest.rate("IRR"), None);
    }
}
