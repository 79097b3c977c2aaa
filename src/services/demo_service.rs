use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;

use crate::models::{Sample, Series, LOCAL_UNIT};

pub const DEMO_DAYS: i64 = 30;
/// Largest relative move between two consecutive demo samples
const MAX_STEP: f64 = 0.015;

/// One sample per day at 12:00 UTC from `end - days` through `end`,
/// walking randomly around `base` and kept within ±50 % of it
pub fn demo_series<R: Rng + ?Sized>(
    rng: &mut R,
    label: &str,
    unit: &str,
    end: NaiveDate,
    days: i64,
    base: f64,
) -> Series {
    let start = end - Duration::days(days.max(0));
    let (floor, ceiling) = (base * 0.5, base * 1.5);

    let mut value = base;
    let mut points = Vec::with_capacity(days.max(0) as usize + 1);
    let mut day = start;
    while day <= end {
        if let Some(noon) = day.and_hms_opt(12, 0, 0) {
            points.push(Sample::new(DateTime::<Utc>::from_naive_utc_and_offset(noon, Utc), value));
        }
        value = (value * (1.0 + rng.gen_range(-MAX_STEP..=MAX_STEP))).clamp(floor, ceiling);
        day += Duration::days(1);
    }

    Series::new(format!("{} (demo)", label), Some(unit), points)
}

/// Stand-in for `fx_latest.json`
pub fn demo_fx<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Vec<Series> {
    vec![
        demo_series(rng, "Dollar (USD→IRR)", LOCAL_UNIT, today, DEMO_DAYS, 600_000.0),
        demo_series(rng, "Euro (EUR→IRR)", LOCAL_UNIT, today, DEMO_DAYS, 650_000.0),
    ]
}

/// Stand-in for `gold_latest.json`
pub fn demo_gold<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Vec<Series> {
    vec![demo_series(rng, "Gold (XAU→USD)", "USD", today, DEMO_DAYS, 2_300.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_demo_series_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = demo_series(&mut rng, "Gold", "USD", today(), 30, 2300.0);

        assert_eq!(series.len(), 31);
        assert_eq!(series.label, "Gold (demo)");
        assert_eq!(series.points[0].value, 2300.0);
        assert_eq!(series.points[30].timestamp.date_naive(), today());
        assert!(series.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(series.points.iter().all(|p| p.value >= 1150.0 && p.value <= 3450.0));
    }

    #[test]
    fn test_seeded_walk_is_repeatable() {
        let a = demo_fx(&mut StdRng::seed_from_u64(42), today());
        let b = demo_fx(&mut StdRng::seed_from_u64(42), today());

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_ne!(a[0].points, a[1].points);
    }
}
