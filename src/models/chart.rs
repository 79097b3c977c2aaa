//! Chart rendering models

use chrono::{DateTime, Utc};

use super::series::{Sample, Series};

/// Pixel region inside the chart margins where data is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PlotRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Inclusive on all four edges
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Coordinate mapping derived from one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub width: u32,
    pub height: u32,
    pub plot: PlotRect,
    /// Time domain in epoch milliseconds
    pub t_min: i64,
    pub t_max: i64,
    /// Value domain, already padded
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartGeometry {
    fn t_span(&self) -> f64 {
        let span = (self.t_max - self.t_min) as f64;
        if span == 0.0 { 1.0 } else { span }
    }

    fn y_span(&self) -> f64 {
        let span = self.y_max - self.y_min;
        if span == 0.0 { 1.0 } else { span }
    }

    /// Epoch millis to pixel-x
    pub fn x_of(&self, t_ms: i64) -> f64 {
        self.plot.left as f64 + (t_ms - self.t_min) as f64 / self.t_span() * self.plot.width() as f64
    }

    /// Value to pixel-y (y grows downward)
    pub fn y_of(&self, value: f64) -> f64 {
        self.plot.bottom as f64 - (value - self.y_min) / self.y_span() * self.plot.height() as f64
    }

    /// Pixel-x back to epoch millis
    pub fn time_at(&self, x: f64) -> i64 {
        let width = if self.plot.width() == 0 { 1.0 } else { self.plot.width() as f64 };
        self.t_min + ((x - self.plot.left as f64) / width * self.t_span()).round() as i64
    }

    pub fn point_of(&self, sample: &Sample) -> (i32, i32) {
        (
            self.x_of(sample.millis()).round() as i32,
            self.y_of(sample.value).round() as i32,
        )
    }
}

/// Rendering state of one chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPhase {
    Idle,
    Rendered,
    Hovering { x: i32, y: i32 },
}

/// Everything one chart keeps between render passes.
/// Owned by the caller and handed to the render/hover functions.
#[derive(Debug, Clone)]
pub struct ChartState {
    pub id: String,
    pub caption: String,
    pub unit: Option<String>,
    pub width: u32,
    pub height: u32,
    pub phase: ChartPhase,
    pub geometry: Option<ChartGeometry>,
    /// Sorted copies of the series drawn by the last render
    pub series: Vec<Series>,
}

impl ChartState {
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            caption: String::new(),
            unit: None,
            width,
            height,
            phase: ChartPhase::Idle,
            geometry: None,
            series: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Nearest sample of one series to a hovered timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct HoverHit {
    pub series_index: usize,
    pub label: String,
    pub unit: Option<String>,
    pub sample: Sample,
}

/// Floating tooltip box in pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub hovered_at: DateTime<Utc>,
    pub lines: Vec<String>,
}
