//! Data models for the dashboard
//!
//! Plain data shared between the snapshot client, the services and the commands.

pub mod chart;
pub mod controls;
pub mod news;
pub mod series;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use chart::{ChartGeometry, ChartPhase, ChartState, HoverHit, PlotRect, Tooltip};
pub use controls::{Controls, DisplayUnit, LOCAL_UNIT};
pub use news::{DatedNewsItem, NewsItem};
pub use series::{sorted_copy, Sample, Series};
pub use snapshot::{ChartData, Dashboard, Snapshot};
