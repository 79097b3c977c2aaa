use crate::models::{sorted_copy, Sample, Series};

/// Multiply every primary sample by the rate in effect at its timestamp.
///
/// The rate in effect is the latest rate sample at or before the primary
/// timestamp; primary samples older than every rate use the first rate.
/// Both inputs are sorted on local copies, then joined in one forward sweep.
/// Returns one sample per primary sample, or nothing if either input is empty.
pub fn align_series(primary: &[Sample], rates: &[Sample]) -> Vec<Sample> {
    if primary.is_empty() || rates.is_empty() {
        return Vec::new();
    }

    let primary = sorted_copy(primary);
    let rates = sorted_copy(rates);

    let mut rate_idx = 0;
    primary
        .iter()
        .map(|sample| {
            while rate_idx + 1 < rates.len() && rates[rate_idx + 1].timestamp <= sample.timestamp {
                rate_idx += 1;
            }
            Sample::new(sample.timestamp, sample.value * rates[rate_idx].value)
        })
        .collect()
}

/// Derive a converted series, e.g. gold in USD times USD→IRR
pub fn convert_series(primary: &Series, rates: &Series, label: &str, unit: Option<&str>) -> Series {
    Series::new(label, unit, align_series(&primary.points, &rates.points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn samples(raw: &[(i64, f64)]) -> Vec<Sample> {
        raw.iter().map(|&(t, v)| Sample::new(at(t), v)).collect()
    }

    #[test]
    fn test_first_rate_used_before_any_rate_sample() {
        let aligned = align_series(&samples(&[(0, 10.0), (10, 20.0)]), &samples(&[(5, 2.0)]));
        assert_eq!(aligned, samples(&[(0, 20.0), (10, 40.0)]));
    }

    #[test]
    fn test_latest_rate_is_forward_filled() {
        let aligned = align_series(
            &samples(&[(0, 1.0), (20, 1.0)]),
            &samples(&[(0, 1.0), (10, 3.0)]),
        );
        assert_eq!(aligned, samples(&[(0, 1.0), (20, 3.0)]));
    }

    #[test]
    fn test_empty_inputs_give_empty_output() {
        assert!(align_series(&[], &samples(&[(0, 2.0)])).is_empty());
        assert!(align_series(&samples(&[(0, 2.0)]), &[]).is_empty());
    }

    #[test]
    fn test_rate_equal_timestamp_takes_effect() {
        let aligned = align_series(
            &samples(&[(10, 1.0), (15, 1.0), (30, 1.0)]),
            &samples(&[(0, 2.0), (10, 5.0), (20, 7.0), (30, 11.0)]),
        );
        assert_eq!(aligned, samples(&[(10, 5.0), (15, 5.0), (30, 11.0)]));
    }

    #[test]
    fn test_matches_brute_force_rate_lookup() {
        let primary = samples(&[(1, 3.0), (4, 2.0), (9, 5.0), (9, 6.0), (17, 1.5), (40, 2.0)]);
        let rates = samples(&[(30, 0.5), (2, 10.0), (9, 4.0), (16, 8.0)]);
        let sorted_rates = sorted_copy(&rates);

        let aligned = align_series(&primary, &rates);

        assert_eq!(aligned.len(), primary.len());
        for (out, input) in aligned.iter().zip(primary.iter()) {
            assert_eq!(out.timestamp, input.timestamp);
            let rate = sorted_rates
                .iter()
                .rev()
                .find(|r| r.timestamp <= input.timestamp)
                .unwrap_or(&sorted_rates[0])
                .value;
            assert_eq!(out.value, input.value * rate);
        }
    }

    #[test]
    fn test_caller_slices_are_not_reordered() {
        let rates = samples(&[(10, 3.0), (0, 1.0)]);
        let _ = align_series(&samples(&[(5, 1.0)]), &rates);
        assert_eq!(rates[0].value, 3.0);
    }

    #[test]
    fn test_convert_series_sets_label_and_unit() {
        let gold = Series::new("Gold", Some("USD"), samples(&[(0, 2000.0)]));
        let usd = Series::new("USD", Some("IRR"), samples(&[(0, 500.0)]));

        let local = convert_series(&gold, &usd, "Gold (IRR)", Some("IRR"));
        assert_eq!(local.label, "Gold (IRR)");
        assert_eq!(local.unit.as_deref(), Some("IRR"));
        assert_eq!(local.points[0].value, 1_000_000.0);
    }
}
