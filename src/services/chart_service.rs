use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ChartGeometry, ChartPhase, ChartState, HoverHit, PlotRect, Sample, Series, Tooltip};
use crate::utils::{format_day, format_minute, format_value};

pub const MARGIN_LEFT: i32 = 80;
pub const MARGIN_RIGHT: i32 = 100;
pub const MARGIN_TOP: i32 = 36;
pub const MARGIN_BOTTOM: i32 = 36;
/// Horizontal gridlines, including the top and bottom of the value domain
pub const GRID_LINES: usize = 5;
pub const TICK_DAYS: i64 = 5;

const DAY_MS: i64 = 86_400_000;
const TOOLTIP_OFFSET: i32 = 14;
const TOOLTIP_PADDING: i32 = 8;
const TOOLTIP_LINE_HEIGHT: i32 = 16;
const TOOLTIP_CHAR_WIDTH: i32 = 7;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to draw {what}: {message}")]
    Drawing { what: &'static str, message: String },
}

fn drawing_err<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> ChartError {
    move |e| ChartError::Drawing {
        what,
        message: e.to_string(),
    }
}

/// Plot rectangle for a canvas of the given size
pub fn plot_rect(width: u32, height: u32) -> PlotRect {
    let left = MARGIN_LEFT;
    let top = MARGIN_TOP;
    PlotRect {
        left,
        top,
        right: (width as i32 - MARGIN_RIGHT).max(left + 1),
        bottom: (height as i32 - MARGIN_BOTTOM).max(top + 1),
    }
}

/// Shared time/value domains for every sample of every series.
/// Returns `None` when there is nothing to plot.
pub fn compute_geometry(series: &[Series], width: u32, height: u32) -> Option<ChartGeometry> {
    let mut samples = series.iter().flat_map(|s| s.points.iter());
    let first = samples.next()?;

    let (mut t_min, mut t_max) = (first.millis(), first.millis());
    let (mut v_min, mut v_max) = (first.value, first.value);
    for sample in samples {
        t_min = t_min.min(sample.millis());
        t_max = t_max.max(sample.millis());
        v_min = v_min.min(sample.value);
        v_max = v_max.max(sample.value);
    }

    let range = v_max - v_min;
    let padding = if range == 0.0 { 1.0 } else { range * 0.1 };

    Some(ChartGeometry {
        width,
        height,
        plot: plot_rect(width, height),
        t_min,
        t_max,
        y_min: v_min - padding,
        y_max: v_max + padding,
    })
}

/// Hue in degrees for the series at `index`
pub fn series_hue(index: usize) -> f64 {
    ((index * 67) % 360) as f64
}

pub fn series_color(index: usize) -> HSLColor {
    HSLColor(series_hue(index) / 360.0, 0.65, 0.42)
}

/// Sample closest in time to `t_ms`; ties go to the earlier sample
pub fn nearest_sample(points: &[Sample], t_ms: i64) -> Option<&Sample> {
    points.iter().min_by_key(|p| (p.millis() - t_ms).unsigned_abs())
}

/// Nearest sample of every non-empty series
pub fn nearest_samples(series: &[Series], t_ms: i64) -> Vec<HoverHit> {
    series
        .iter()
        .enumerate()
        .filter_map(|(index, s)| {
            nearest_sample(&s.points, t_ms).map(|sample| HoverHit {
                series_index: index,
                label: s.label.clone(),
                unit: s.unit.clone(),
                sample: *sample,
            })
        })
        .collect()
}

/// Periodic tick times after the start of the domain, strictly before its end
pub fn time_ticks(geometry: &ChartGeometry) -> Vec<i64> {
    let step = TICK_DAYS * DAY_MS;
    let mut ticks = Vec::new();
    let mut t = geometry.t_min + step;
    while t < geometry.t_max {
        ticks.push(t);
        t += step;
    }
    ticks
}

fn to_datetime(t_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(t_ms).single().unwrap_or_default()
}

/// Lay out the tooltip at cursor + offset, flipped to the other side of the
/// cursor on any axis where it would leave the canvas
pub fn build_tooltip(
    x: i32,
    y: i32,
    hovered_at: DateTime<Utc>,
    hits: &[HoverHit],
    canvas_width: u32,
    canvas_height: u32,
) -> Tooltip {
    let mut lines = vec![format_minute(&hovered_at)];
    for hit in hits {
        let unit = hit.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
        lines.push(format!("{}: {}{}", hit.label, format_value(hit.sample.value), unit));
    }

    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    let width = longest * TOOLTIP_CHAR_WIDTH + 2 * TOOLTIP_PADDING;
    let height = lines.len() as i32 * TOOLTIP_LINE_HEIGHT + 2 * TOOLTIP_PADDING;

    let mut left = x + TOOLTIP_OFFSET;
    if left + width > canvas_width as i32 {
        left = x - TOOLTIP_OFFSET - width;
    }
    let mut top = y + TOOLTIP_OFFSET;
    if top + height > canvas_height as i32 {
        top = y - TOOLTIP_OFFSET - height;
    }

    Tooltip {
        x: left.max(0),
        y: top.max(0),
        width,
        height,
        hovered_at,
        lines,
    }
}

/// Draw text; a missing font only costs the label, never the chart
fn draw_label<DB: DrawingBackend, C: Color>(
    root: &DrawingArea<DB, Shift>,
    text: &str,
    pos: (i32, i32),
    size: f64,
    color: &C,
    anchor: Pos,
) {
    let style = ("sans-serif", size).into_font().color(color).pos(anchor);
    if let Err(e) = root.draw_text(text, &style, pos) {
        debug!("Skipping label '{}': {}", text, e);
    }
}

fn paint_placeholder<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, state: &ChartState) -> Result<(), ChartError> {
    let (width, height) = root.dim_in_pixel();
    let (w, h) = (width as i32, height as i32);
    root.draw(&Rectangle::new(
        [(4, 4), ((w - 5).max(4), (h - 5).max(4))],
        BLACK.mix(0.2).stroke_width(1),
    ))
    .map_err(drawing_err("placeholder"))?;
    if !state.caption.is_empty() {
        draw_label(root, &state.caption, (12, 10), 16.0, &BLACK, Pos::new(HPos::Left, VPos::Top));
    }
    draw_label(root, "no data", (w / 2, h / 2), 18.0, &BLACK.mix(0.5), Pos::new(HPos::Center, VPos::Center));
    Ok(())
}

/// Paint axes, gridlines, labels and every cached series
fn paint_base<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, state: &ChartState) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(drawing_err("background"))?;

    let Some(g) = state.geometry else {
        return paint_placeholder(root, state);
    };
    let plot = g.plot;

    if !state.caption.is_empty() {
        draw_label(root, &state.caption, (plot.left, 10), 16.0, &BLACK, Pos::new(HPos::Left, VPos::Top));
    }
    if let Some(unit) = &state.unit {
        draw_label(root, unit, (plot.left - 8, plot.top - 6), 12.0, &BLACK.mix(0.6), Pos::new(HPos::Right, VPos::Bottom));
    }

    // Value gridlines
    for i in 0..GRID_LINES {
        let value = g.y_min + (g.y_max - g.y_min) * i as f64 / (GRID_LINES - 1) as f64;
        let y = g.y_of(value).round() as i32;
        root.draw(&PathElement::new(
            vec![(plot.left, y), (plot.right, y)],
            BLACK.mix(0.12).stroke_width(1),
        ))
        .map_err(drawing_err("gridline"))?;
        draw_label(root, &format_value(value), (plot.left - 8, y), 12.0, &BLACK, Pos::new(HPos::Right, VPos::Center));
    }

    root.draw(&Rectangle::new(
        [(plot.left, plot.top), (plot.right, plot.bottom)],
        BLACK.mix(0.4).stroke_width(1),
    ))
    .map_err(drawing_err("frame"))?;

    // Time labels: both ends of the domain plus periodic ticks
    let label_y = plot.bottom + 8;
    draw_label(root, &format_day(&to_datetime(g.t_min)), (plot.left, label_y), 12.0, &BLACK, Pos::new(HPos::Left, VPos::Top));
    if g.t_max != g.t_min {
        draw_label(root, &format_day(&to_datetime(g.t_max)), (plot.right, label_y), 12.0, &BLACK, Pos::new(HPos::Right, VPos::Top));
    }
    let ticks = time_ticks(&g);
    for &t in &ticks {
        let x = g.x_of(t).round() as i32;
        root.draw(&PathElement::new(
            vec![(x, plot.bottom), (x, plot.bottom + 4)],
            BLACK.mix(0.6).stroke_width(1),
        ))
        .map_err(drawing_err("time tick"))?;
        draw_label(root, &format_day(&to_datetime(t)), (x, label_y), 12.0, &BLACK, Pos::new(HPos::Center, VPos::Top));
    }

    for (index, series) in state.series.iter().enumerate() {
        let color = series_color(index);

        if series.points.len() >= 2 {
            let path: Vec<(i32, i32)> = series.points.iter().map(|p| g.point_of(p)).collect();
            root.draw(&PathElement::new(path, color.stroke_width(2)))
                .map_err(drawing_err("series line"))?;
        }

        for &t in &ticks {
            if let Some(sample) = nearest_sample(&series.points, t) {
                root.draw(&Circle::new(g.point_of(sample), 2, color.filled()))
                    .map_err(drawing_err("tick marker"))?;
            }
        }

        if let Some(last) = series.points.last() {
            let (x, y) = g.point_of(last);
            root.draw(&Circle::new((x, y), 4, color.filled()))
                .map_err(drawing_err("final marker"))?;
            draw_label(root, &format_value(last.value), (x + 7, y), 12.0, &color, Pos::new(HPos::Left, VPos::Center));
        }
    }

    Ok(())
}

fn paint_overlay<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    g: &ChartGeometry,
    x: i32,
    hits: &[HoverHit],
    tooltip: &Tooltip,
) -> Result<(), ChartError> {
    // Dashed guide: 4px on, 4px off
    let mut y = g.plot.top;
    while y < g.plot.bottom {
        let end = (y + 4).min(g.plot.bottom);
        root.draw(&PathElement::new(vec![(x, y), (x, end)], BLACK.mix(0.55).stroke_width(1)))
            .map_err(drawing_err("hover guide"))?;
        y += 8;
    }

    for hit in hits {
        let point = g.point_of(&hit.sample);
        root.draw(&Circle::new(point, 5, series_color(hit.series_index).filled()))
            .map_err(drawing_err("hover marker"))?;
        root.draw(&Circle::new(point, 5, BLACK.stroke_width(1)))
            .map_err(drawing_err("hover marker"))?;
    }

    let corner = (tooltip.x + tooltip.width, tooltip.y + tooltip.height);
    root.draw(&Rectangle::new([(tooltip.x, tooltip.y), corner], WHITE.mix(0.92).filled()))
        .map_err(drawing_err("tooltip"))?;
    root.draw(&Rectangle::new([(tooltip.x, tooltip.y), corner], BLACK.mix(0.5).stroke_width(1)))
        .map_err(drawing_err("tooltip"))?;
    for (i, line) in tooltip.lines.iter().enumerate() {
        let pos = (
            tooltip.x + TOOLTIP_PADDING,
            tooltip.y + TOOLTIP_PADDING + i as i32 * TOOLTIP_LINE_HEIGHT,
        );
        draw_label(root, line, pos, 13.0, &BLACK, Pos::new(HPos::Left, VPos::Top));
    }

    Ok(())
}

/// Render `series` onto `root`, replacing whatever the chart showed before.
///
/// Series are sorted on local copies; the caller's data is not reordered.
/// The geometry and sorted copies are cached in `state` for hover lookups,
/// and any hover state is discarded.
pub fn render<DB: DrawingBackend>(
    state: &mut ChartState,
    root: &DrawingArea<DB, Shift>,
    series: &[Series],
    caption: &str,
    unit: Option<&str>,
) -> Result<(), ChartError> {
    let (width, height) = root.dim_in_pixel();
    let sorted: Vec<Series> = series.iter().map(Series::sorted).collect();

    state.width = width;
    state.height = height;
    state.caption = caption.to_string();
    state.unit = unit.map(|u| u.to_string());
    state.geometry = compute_geometry(&sorted, width, height);
    state.series = sorted;

    paint_base(root, state)?;
    state.phase = ChartPhase::Rendered;

    debug!(
        "Rendered chart {} with {} series ({} points)",
        state.id,
        state.series.len(),
        state.series.iter().map(Series::len).sum::<usize>()
    );
    Ok(())
}

/// Handle a pointer move at pixel `(x, y)`.
///
/// Inside the plot rectangle this repaints the base chart with the hover
/// overlay and returns the tooltip; outside it behaves like a pointer leave.
/// Charts without geometry (never rendered, or no data) ignore the pointer.
pub fn pointer_move<DB: DrawingBackend>(
    state: &mut ChartState,
    root: &DrawingArea<DB, Shift>,
    x: i32,
    y: i32,
) -> Result<Option<Tooltip>, ChartError> {
    let Some(geometry) = state.geometry else {
        return Ok(None);
    };

    if !geometry.plot.contains(x, y) {
        pointer_leave(state, root)?;
        return Ok(None);
    }

    let t_ms = geometry.time_at(x as f64);
    let hits = nearest_samples(&state.series, t_ms);
    let tooltip = build_tooltip(x, y, to_datetime(t_ms), &hits, geometry.width, geometry.height);

    paint_base(root, state)?;
    paint_overlay(root, &geometry, x, &hits, &tooltip)?;
    state.phase = ChartPhase::Hovering { x, y };

    Ok(Some(tooltip))
}

/// Drop any hover overlay and repaint the plain chart
pub fn pointer_leave<DB: DrawingBackend>(
    state: &mut ChartState,
    root: &DrawingArea<DB, Shift>,
) -> Result<(), ChartError> {
    if state.phase == ChartPhase::Idle || state.geometry.is_none() {
        return Ok(());
    }
    paint_base(root, state)?;
    state.phase = ChartPhase::Rendered;
    Ok(())
}

/// Render to a PNG file at the chart's current size
pub fn render_png(
    state: &mut ChartState,
    path: &Path,
    series: &[Series],
    caption: &str,
    unit: Option<&str>,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (state.width, state.height)).into_drawing_area();
    render(state, &root, series, caption, unit)?;
    root.present().map_err(drawing_err("chart file"))?;
    info!("📈 Chart {} written to {}", state.id, path.display());
    Ok(())
}

/// Pointer move against a chart previously written with [`render_png`].
/// The file is repainted at the size it was rendered at, whatever `state.width`
/// says now; a new size only applies from the next render.
pub fn hover_png(state: &mut ChartState, path: &Path, x: i32, y: i32) -> Result<Option<Tooltip>, ChartError> {
    let Some(geometry) = state.geometry else {
        return Ok(None);
    };
    let root = BitMapBackend::new(path, (geometry.width, geometry.height)).into_drawing_area();
    let tooltip = pointer_move(state, &root, x, y)?;
    root.present().map_err(drawing_err("chart file"))?;
    Ok(tooltip)
}

/// Pointer leave against a chart previously written with [`render_png`]
pub fn leave_png(state: &mut ChartState, path: &Path) -> Result<(), ChartError> {
    let Some(geometry) = state.geometry else {
        return Ok(());
    };
    if state.phase == ChartPhase::Idle {
        return Ok(());
    }
    let root = BitMapBackend::new(path, (geometry.width, geometry.height)).into_drawing_area();
    pointer_leave(state, &root)?;
    root.present().map_err(drawing_err("chart file"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 400;
    const H: u32 = 300;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn series(label: &str, raw: &[(i64, f64)]) -> Series {
        Series::new(label, Some("IRR"), raw.iter().map(|&(t, v)| Sample::new(at(t), v)).collect())
    }

    fn two_series() -> Vec<Series> {
        vec![
            series("USD", &[(0, 100.0), (10 * DAY_MS, 200.0), (20 * DAY_MS, 150.0)]),
            series("EUR", &[(20 * DAY_MS, 120.0), (0, 110.0), (12 * DAY_MS, 180.0)]),
        ]
    }

    fn render_buffer(state: &mut ChartState, data: &[Series], pointer: &[(i32, i32)]) -> (Vec<u8>, Option<Tooltip>) {
        let mut buf = vec![0u8; (W * H * 3) as usize];
        let mut tooltip = None;
        {
            let root = BitMapBackend::with_buffer(&mut buf, (W, H)).into_drawing_area();
            render(state, &root, data, "FX", Some("IRR")).unwrap();
            for &(x, y) in pointer {
                tooltip = pointer_move(state, &root, x, y).unwrap();
            }
            root.present().unwrap();
        }
        (buf, tooltip)
    }

    fn pixel(buf: &[u8], x: u32, y: u32) -> (u8, u8, u8) {
        let i = ((y * W + x) * 3) as usize;
        (buf[i], buf[i + 1], buf[i + 2])
    }

    #[test]
    fn test_value_domain_padded_by_ten_percent() {
        let g = compute_geometry(&[series("a", &[(0, 100.0), (5, 200.0)])], W, H).unwrap();
        assert!((g.y_min - 90.0).abs() < 1e-9);
        assert!((g.y_max - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_still_has_value_padding() {
        let g = compute_geometry(&[series("a", &[(0, 5.0), (10, 5.0)])], W, H).unwrap();
        assert_eq!((g.y_min, g.y_max), (4.0, 6.0));
        assert!(g.y_of(5.0).is_finite());
        assert_eq!(g.y_of(g.y_min), g.plot.bottom as f64);
        assert_eq!(g.y_of(g.y_max), g.plot.top as f64);
    }

    #[test]
    fn test_single_timestamp_maps_to_left_edge() {
        let g = compute_geometry(&[series("a", &[(1_000, 1.0), (1_000, 3.0)])], W, H).unwrap();
        assert_eq!(g.t_min, g.t_max);
        assert_eq!(g.x_of(1_000), g.plot.left as f64);
        assert_eq!(g.time_at(g.plot.right as f64), 1_001);
    }

    #[test]
    fn test_time_mapping_round_trips_through_pixels() {
        let g = compute_geometry(&two_series(), W, H).unwrap();
        assert_eq!(g.x_of(g.t_min), g.plot.left as f64);
        assert_eq!(g.x_of(g.t_max), g.plot.right as f64);

        let t = 7 * DAY_MS;
        let back = g.time_at(g.x_of(t));
        assert!((back - t).abs() <= 1);
    }

    #[test]
    fn test_no_samples_means_no_geometry() {
        assert!(compute_geometry(&[], W, H).is_none());
        assert!(compute_geometry(&[series("empty", &[])], W, H).is_none());
    }

    #[test]
    fn test_nearest_sample_prefers_earlier_on_ties() {
        let s = series("a", &[(0, 1.0), (10, 2.0), (20, 3.0)]);
        assert_eq!(nearest_sample(&s.points, 14).map(|p| p.value), Some(2.0));
        assert_eq!(nearest_sample(&s.points, 15).map(|p| p.value), Some(2.0));
        assert_eq!(nearest_sample(&s.points, 1_000).map(|p| p.value), Some(3.0));
        assert!(nearest_sample(&[], 0).is_none());
    }

    #[test]
    fn test_hues_are_distinct_and_repeatable() {
        let hues: Vec<f64> = (0..6).map(series_hue).collect();
        assert_eq!(hues, vec![0.0, 67.0, 134.0, 201.0, 268.0, 335.0]);
        assert_eq!(series_hue(7), series_hue(7));
    }

    #[test]
    fn test_ticks_every_five_days() {
        let g = compute_geometry(&two_series(), W, H).unwrap();
        assert_eq!(time_ticks(&g), vec![5 * DAY_MS, 10 * DAY_MS, 15 * DAY_MS]);
    }

    #[test]
    fn test_tooltip_flips_near_edges() {
        let hits = vec![HoverHit {
            series_index: 0,
            label: "USD".to_string(),
            unit: Some("IRR".to_string()),
            sample: Sample::new(at(0), 612_000.0),
        }];

        let near_origin = build_tooltip(100, 100, at(0), &hits, W, H);
        assert_eq!((near_origin.x, near_origin.y), (100 + TOOLTIP_OFFSET, 100 + TOOLTIP_OFFSET));
        assert_eq!(near_origin.lines[1], "USD: 612,000 IRR");

        let corner = build_tooltip(390, 290, at(0), &hits, W, H);
        assert_eq!(corner.x, 390 - TOOLTIP_OFFSET - corner.width);
        assert_eq!(corner.y, 290 - TOOLTIP_OFFSET - corner.height);
        assert!(corner.x + corner.width <= W as i32);
    }

    #[test]
    fn test_single_sample_renders_one_point() {
        let mut state = ChartState::new("chart-gold", W, H);
        let (buf, _) = render_buffer(&mut state, &[series("Gold", &[(0, 2300.0)])], &[]);

        let g = state.geometry.unwrap();
        let (x, y) = g.point_of(&state.series[0].points[0]);
        assert_eq!((x, y), (g.plot.left, (g.plot.top + g.plot.bottom) / 2));

        let (r, gr, b) = pixel(&buf, (x + 1) as u32, (y + 1) as u32);
        assert!(r > gr + 60 && r > b + 60, "expected series colour, got {:?}", (r, gr, b));
    }

    #[test]
    fn test_hover_outside_matches_plain_render() {
        let data = two_series();
        let (plain, _) = render_buffer(&mut ChartState::new("chart-fx", W, H), &data, &[]);

        let mut state = ChartState::new("chart-fx", W, H);
        let (after_leave, tooltip) = render_buffer(&mut state, &data, &[(200, 150), (5, 5)]);

        assert!(tooltip.is_none());
        assert_eq!(state.phase, ChartPhase::Rendered);
        assert!(plain == after_leave);
    }

    #[test]
    fn test_hover_inside_shows_nearest_points() {
        let data = two_series();
        let (plain, _) = render_buffer(&mut ChartState::new("chart-fx", W, H), &data, &[]);

        let mut state = ChartState::new("chart-fx", W, H);
        let g = compute_geometry(&data, W, H).unwrap();
        let x = g.x_of(11 * DAY_MS).round() as i32;
        let (hovered, tooltip) = render_buffer(&mut state, &data, &[(x, 150)]);

        let tooltip = tooltip.expect("tooltip inside plot");
        assert_eq!(state.phase, ChartPhase::Hovering { x, y: 150 });
        assert_eq!(tooltip.lines.len(), 3);
        assert!(tooltip.lines[1].starts_with("USD: 200.00"));
        assert!(tooltip.lines[2].starts_with("EUR: 180.00"));
        assert!(plain != hovered);
    }

    #[test]
    fn test_render_resets_hover_and_keeps_caller_order() {
        let data = two_series();
        let mut state = ChartState::new("chart-fx", W, H);
        render_buffer(&mut state, &data, &[(200, 150)]);
        assert!(matches!(state.phase, ChartPhase::Hovering { .. }));

        render_buffer(&mut state, &data, &[]);
        assert_eq!(state.phase, ChartPhase::Rendered);
        assert_eq!(data[1].points[0].value, 120.0);
        assert_eq!(state.series[1].points[0].value, 110.0);
    }

    #[test]
    fn test_empty_chart_ignores_pointer() {
        let mut state = ChartState::new("chart-gold", W, H);
        let (_, tooltip) = render_buffer(&mut state, &[], &[(200, 150)]);

        assert!(tooltip.is_none());
        assert!(state.geometry.is_none());
        assert_eq!(state.phase, ChartPhase::Rendered);
    }
}
