pub mod client;
pub mod models;

pub use client::SnapshotClient;
pub use models::{NewsFile, RawPoint, RawSeries, Rates, SeriesFile, SiteConfig};
