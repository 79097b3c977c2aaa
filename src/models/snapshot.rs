//! Loaded snapshot and the prepared dashboard built from it

use crate::api::snapshot::{Rates, SiteConfig};
use super::news::NewsItem;
use super::series::Series;

/// Whatever arrived in one load cycle; absent parts failed to load
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub config: Option<SiteConfig>,
    pub fx: Option<Vec<Series>>,
    pub gold: Option<Vec<Series>>,
    pub news: Option<Vec<NewsItem>>,
    pub rates: Option<Rates>,
}

/// Series for one chart and whether they are synthetic
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub series: Vec<Series>,
    pub degraded: bool,
}

/// Snapshot after fallbacks are applied, ready for the transforms
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub site: SiteConfig,
    pub fx: ChartData,
    pub gold: ChartData,
    pub news: Vec<NewsItem>,
    pub rates: Option<Rates>,
}
