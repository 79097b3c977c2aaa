use chrono::{Duration, NaiveDate};
use rand::Rng;
use tracing::{info, warn};

use crate::api::snapshot::SiteConfig;
use crate::models::{ChartData, Controls, Dashboard, DisplayUnit, Series, Snapshot, LOCAL_UNIT};
use crate::utils::{format_value, Table};
use super::{chart_service, demo_service, transform_service};

/// Series ready to hand to the renderer for one chart
#[derive(Debug, Clone)]
pub struct ChartInput {
    pub caption: String,
    pub unit: Option<String>,
    pub series: Vec<Series>,
}

fn has_samples(series: &Option<Vec<Series>>) -> bool {
    series.as_ref().is_some_and(|s| s.iter().any(|x| !x.is_empty()))
}

/// Apply fallbacks to a freshly loaded snapshot.
/// Charts whose resource is absent or empty get demo series and are flagged degraded.
pub fn prepare<R: Rng + ?Sized>(snapshot: Snapshot, today: NaiveDate, rng: &mut R) -> Dashboard {
    let fx = if has_samples(&snapshot.fx) {
        ChartData {
            series: snapshot.fx.unwrap_or_default(),
            degraded: false,
        }
    } else {
        warn!("⚠️ FX data unavailable, showing demo series");
        ChartData {
            series: demo_service::demo_fx(rng, today),
            degraded: true,
        }
    };

    let gold = if has_samples(&snapshot.gold) {
        ChartData {
            series: snapshot.gold.unwrap_or_default(),
            degraded: false,
        }
    } else {
        warn!("⚠️ Gold data unavailable, showing demo series");
        ChartData {
            series: demo_service::demo_gold(rng, today),
            degraded: true,
        }
    };

    let site = snapshot.config.unwrap_or_else(|| {
        warn!("config.json unavailable, using default controls");
        SiteConfig::default()
    });

    let news = snapshot.news.unwrap_or_default();
    info!(
        "Snapshot ready: {} fx series, {} gold series, {} news items",
        fx.series.len(),
        gold.series.len(),
        news.len()
    );

    Dashboard {
        site,
        fx,
        gold,
        news,
        rates: snapshot.rates,
    }
}

fn caption(title: &str, controls: &Controls, degraded: bool) -> String {
    format!(
        "{} · {} · {}{}",
        title,
        controls.mode,
        controls.range,
        if degraded { " · DEMO" } else { "" }
    )
}

/// Run the control-driven transforms for the fx chart
pub fn fx_input(dashboard: &Dashboard, controls: &Controls, range: Option<Duration>) -> ChartInput {
    ChartInput {
        caption: caption("FX", controls, dashboard.fx.degraded),
        unit: Some(LOCAL_UNIT.to_string()),
        series: transform_service::slice_range(&dashboard.fx.series, range),
    }
}

/// Run the control-driven transforms for the gold chart
pub fn gold_input(dashboard: &Dashboard, controls: &Controls, range: Option<Duration>) -> ChartInput {
    let gold = transform_service::slice_range(&dashboard.gold.series, range);
    let degraded = dashboard.gold.degraded;

    match controls.unit {
        DisplayUnit::Usd => ChartInput {
            caption: caption("Gold", controls, degraded),
            unit: Some("USD".to_string()),
            series: gold,
        },
        DisplayUnit::Local => ChartInput {
            caption: caption("Gold", controls, degraded || dashboard.fx.degraded),
            unit: Some(LOCAL_UNIT.to_string()),
            series: transform_service::gold_in_local(&gold, &dashboard.fx.series, dashboard.rates.as_ref()),
        },
    }
}

/// Legend lines for one chart
pub fn format_legend(chart_id: &str, input: &ChartInput, degraded: bool) -> String {
    let mut table = Table::new(vec!["Hue", "Series", "Unit", "Points", "Last"]).with_max_width(40);
    for (index, series) in input.series.iter().enumerate() {
        let hue = format!("{:.0}°", chart_service::series_hue(index));
        let points = series.len().to_string();
        let last = series.last().map(|p| format_value(p.value)).unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            hue.as_str(),
            series.label.as_str(),
            series.unit.as_deref().unwrap_or("-"),
            points.as_str(),
            last.as_str(),
        ]);
    }

    let mut output = format!("{}{}\n", chart_id, if degraded { "  [DEMO - live data unavailable]" } else { "" });
    output.push_str(&table.render());
    output
}
