use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::api::snapshot::SnapshotClient;
use crate::config::AppConfig;
use crate::models::{ChartState, Controls, Dashboard, DatedNewsItem, DisplayUnit, Snapshot, Tooltip};
use crate::services::dashboard_service::{self, ChartInput};
use crate::services::news_service::{self, NewsFilter};
use crate::services::fetch_service::Fetcher;
use crate::services::{chart_service, transform_service};
use crate::utils::{Generation, Page, Ticket};

pub const FX_CHART: &str = "chart-fx";
pub const GOLD_CHART: &str = "chart-gold";

/// Which of the two charts a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartId {
    Fx,
    Gold,
}

impl ChartId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::Fx => FX_CHART,
            ChartId::Gold => GOLD_CHART,
        }
    }
}

impl FromStr for ChartId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fx" | "chart-fx" => Ok(ChartId::Fx),
            "gold" | "chart-gold" => Ok(ChartId::Gold),
            _ => Err(format!("❌ Unknown chart: '{}'. Use: fx, gold", s)),
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one load cycle, tagged with the ticket it was started under
#[derive(Debug)]
pub struct LoadResult {
    pub ticket: Ticket,
    pub snapshot: Snapshot,
}

/// Everything the dashboard keeps between commands
pub struct Session {
    pub config: AppConfig,
    client: SnapshotClient,
    loads: UnboundedSender<LoadResult>,
    generation: Generation,
    pub controls: Controls,
    dashboard: Option<Dashboard>,
    /// Set once the user picks a mode; until then the first offered mode applies
    mode_chosen: bool,
    fx_chart: ChartState,
    gold_chart: ChartState,
    fx_input: Option<ChartInput>,
    gold_input: Option<ChartInput>,
    news: Page<DatedNewsItem>,
}

impl Session {
    pub fn new(config: AppConfig, client: SnapshotClient, loads: UnboundedSender<LoadResult>) -> Self {
        let (width, height) = (config.chart_width, config.chart_height);
        let page_size = config.page_size;
        Self {
            config,
            client,
            loads,
            generation: Generation::new(),
            controls: Controls::default(),
            dashboard: None,
            mode_chosen: false,
            fx_chart: ChartState::new(FX_CHART, width, height),
            gold_chart: ChartState::new(GOLD_CHART, width, height),
            fx_input: None,
            gold_input: None,
            news: Page::new(Vec::new(), page_size),
        }
    }

    /// Start a new load cycle in the background; earlier cycles become stale
    pub fn start_load(&mut self) -> Ticket {
        let ticket = self.spawn_cycle(None);
        info!("🔄 Load cycle #{} started", ticket.0);
        ticket
    }

    /// Rebuild the snapshot files from upstream, then load them as a new cycle
    pub fn start_fetch(&mut self) -> Result<Ticket, String> {
        let fetcher = Fetcher::new(&self.config).map_err(|e| format!("❌ {}", e))?;
        let ticket = self.spawn_cycle(Some(fetcher));
        info!("📥 Fetch cycle #{} started", ticket.0);
        Ok(ticket)
    }

    fn spawn_cycle(&mut self, fetcher: Option<Fetcher>) -> Ticket {
        let ticket = self.generation.begin();
        let client = self.client.clone();
        let loads = self.loads.clone();

        tokio::spawn(async move {
            if let Some(fetcher) = fetcher {
                let now = Utc::now();
                if let Err(e) = fetcher.run(now.date_naive(), now).await {
                    error!("Fetch #{} failed, loading existing snapshots: {}", ticket.0, e);
                }
            }
            let snapshot = client.load_all().await;
            if loads.send(LoadResult { ticket, snapshot }).is_err() {
                debug!("Load #{} finished after shutdown", ticket.0);
            }
        });

        ticket
    }

    /// Apply a finished load. Returns `false` when a newer cycle has started since.
    pub fn apply_load(&mut self, result: LoadResult) -> Result<bool, String> {
        if !self.generation.is_current(result.ticket) {
            debug!(
                "Discarding stale load #{} (latest is #{})",
                result.ticket.0,
                self.generation.latest()
            );
            return Ok(false);
        }

        let dashboard = dashboard_service::prepare(result.snapshot, Utc::now().date_naive(), &mut rand::thread_rng());
        self.sync_controls(&dashboard);
        self.dashboard = Some(dashboard);

        self.rebuild_news()?;
        self.render_charts()?;
        Ok(true)
    }

    /// Keep mode and category valid for the options config.json offers
    fn sync_controls(&mut self, dashboard: &Dashboard) {
        let modes = &dashboard.site.modes;
        let offered = modes.contains(&self.controls.mode);
        if !modes.is_empty() && (!offered || !self.mode_chosen) {
            if self.mode_chosen {
                warn!("Mode '{}' no longer offered, resetting to {}", self.controls.mode, modes[0]);
            }
            self.controls.mode = modes[0].clone();
        }
        let categories = &dashboard.site.categories;
        if self.controls.category != "all" && !categories.contains(&self.controls.category) {
            warn!("Category '{}' no longer offered, resetting to all", self.controls.category);
            self.controls.category = "all".to_string();
        }
    }

    pub fn has_data(&self) -> bool {
        self.dashboard.is_some()
    }

    pub fn chart_path(&self, chart: ChartId) -> PathBuf {
        self.config.out_dir.join(format!("{}.png", chart.as_str()))
    }

    /// Re-run the transforms and repaint both charts from the current snapshot
    pub fn render_charts(&mut self) -> Result<(), String> {
        let fx_path = self.chart_path(ChartId::Fx);
        let gold_path = self.chart_path(ChartId::Gold);
        let range = transform_service::parse_chart_timeframe(&self.controls.range)?;

        let dashboard = self.dashboard.as_ref().ok_or("⏳ No data loaded yet")?;
        let fx = dashboard_service::fx_input(dashboard, &self.controls, range);
        let gold = dashboard_service::gold_input(dashboard, &self.controls, range);

        chart_service::render_png(&mut self.fx_chart, &fx_path, &fx.series, &fx.caption, fx.unit.as_deref())
            .map_err(|e| format!("❌ {}", e))?;
        chart_service::render_png(&mut self.gold_chart, &gold_path, &gold.series, &gold.caption, gold.unit.as_deref())
            .map_err(|e| format!("❌ {}", e))?;

        self.fx_input = Some(fx);
        self.gold_input = Some(gold);
        Ok(())
    }

    /// Re-filter the news list; always returns to the first page
    pub fn rebuild_news(&mut self) -> Result<(), String> {
        let range = transform_service::parse_chart_timeframe(&self.controls.range)?;
        let items = self.dashboard.as_ref().map(|d| d.news.as_slice()).unwrap_or_default();
        let filter = NewsFilter {
            category: Some(self.controls.category.clone()),
            range,
            now: Utc::now(),
        };
        let filtered = news_service::filter_and_sort(items, &filter);
        debug!("{} of {} news items pass the filters", filtered.len(), items.len());
        self.news = news_service::paginate(filtered, self.config.page_size);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), String> {
        let modes = self.dashboard.as_ref().map(|d| d.site.modes.clone()).unwrap_or_default();
        if !modes.is_empty() && !modes.iter().any(|m| m == mode) {
            return Err(format!("❌ Unknown mode '{}'. Available: {}", mode, modes.join(", ")));
        }
        self.controls.mode = mode.to_string();
        self.mode_chosen = true;
        self.refresh_view()
    }

    pub fn set_category(&mut self, category: &str) -> Result<(), String> {
        let categories = self.dashboard.as_ref().map(|d| d.site.categories.clone()).unwrap_or_default();
        if !category.eq_ignore_ascii_case("all") && !categories.iter().any(|c| c == category) {
            return Err(format!(
                "❌ Unknown category '{}'. Available: all{}{}",
                category,
                if categories.is_empty() { "" } else { ", " },
                categories.join(", ")
            ));
        }
        self.controls.category = if category.eq_ignore_ascii_case("all") {
            "all".to_string()
        } else {
            category.to_string()
        };
        self.refresh_view()
    }

    pub fn set_unit(&mut self, unit: DisplayUnit) -> Result<(), String> {
        self.controls.unit = unit;
        self.refresh_view()
    }

    pub fn set_range(&mut self, range: &str) -> Result<(), String> {
        transform_service::parse_chart_timeframe(range)?;
        self.controls.range = range.to_lowercase();
        self.refresh_view()
    }

    /// Control changes repaint from the snapshot already in memory
    fn refresh_view(&mut self) -> Result<(), String> {
        self.rebuild_news()?;
        if self.has_data() {
            self.render_charts()?;
        }
        Ok(())
    }

    /// New canvas size; like a window resize, this starts a fresh load cycle.
    /// Charts are repainted at the new size straight away from the data in
    /// memory, so hover never works against geometry of the old canvas.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Ticket, String> {
        self.config.chart_width = width;
        self.config.chart_height = height;
        self.fx_chart.resize(width, height);
        self.gold_chart.resize(width, height);
        if self.has_data() {
            self.render_charts()?;
        }
        Ok(self.start_load())
    }

    fn chart_mut(&mut self, chart: ChartId) -> &mut ChartState {
        match chart {
            ChartId::Fx => &mut self.fx_chart,
            ChartId::Gold => &mut self.gold_chart,
        }
    }

    pub fn chart(&self, chart: ChartId) -> &ChartState {
        match chart {
            ChartId::Fx => &self.fx_chart,
            ChartId::Gold => &self.gold_chart,
        }
    }

    pub fn hover(&mut self, chart: ChartId, x: i32, y: i32) -> Result<Option<Tooltip>, String> {
        let path = self.chart_path(chart);
        chart_service::hover_png(self.chart_mut(chart), &path, x, y).map_err(|e| format!("❌ {}", e))
    }

    pub fn leave(&mut self, chart: ChartId) -> Result<(), String> {
        let path = self.chart_path(chart);
        chart_service::leave_png(self.chart_mut(chart), &path).map_err(|e| format!("❌ {}", e))
    }

    pub fn news(&self) -> &Page<DatedNewsItem> {
        &self.news
    }

    pub fn news_mut(&mut self) -> &mut Page<DatedNewsItem> {
        &mut self.news
    }

    pub fn legends(&self) -> String {
        let Some(dashboard) = &self.dashboard else {
            return "⏳ No data loaded yet\n".to_string();
        };
        let mut output = String::new();
        if let Some(fx) = &self.fx_input {
            output.push_str(&dashboard_service::format_legend(FX_CHART, fx, dashboard.fx.degraded));
        }
        if let Some(gold) = &self.gold_input {
            let degraded = dashboard.gold.degraded
                || (self.controls.unit == DisplayUnit::Local && dashboard.fx.degraded);
            output.push('\n');
            output.push_str(&dashboard_service::format_legend(GOLD_CHART, gold, degraded));
        }
        output
    }

    pub fn status(&self) -> String {
        let degraded = self
            .dashboard
            .as_ref()
            .map(|d| {
                let mut charts = Vec::new();
                if d.fx.degraded {
                    charts.push(FX_CHART);
                }
                if d.gold.degraded {
                    charts.push(GOLD_CHART);
                }
                if charts.is_empty() { "none".to_string() } else { charts.join(", ") }
            })
            .unwrap_or_else(|| "-".to_string());

        format!(
            "Mode: {} | Category: {} | Unit: {} | Range: {}\n\
             Load cycle: #{} | Data: {} | Demo charts: {}\n\
             Charts: {} ({:?}), {} ({:?}) at {}x{}\n",
            self.controls.mode,
            self.controls.category,
            self.controls.unit,
            self.controls.range,
            self.generation.latest(),
            if self.has_data() { "loaded" } else { "waiting" },
            degraded,
            self.chart_path(ChartId::Fx).display(),
            self.fx_chart.phase,
            self.chart_path(ChartId::Gold).display(),
            self.gold_chart.phase,
            self.config.chart_width,
            self.config.chart_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::snapshot::client::{CONFIG_PATH, FX_PATH, GOLD_PATH, NEWS_PATH};
    use crate::models::ChartPhase;
    use std::fs;
    use tokio::sync::mpsc;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mrnews_session_{}_{}",
            name,
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        fs::create_dir_all(dir.join("site/data")).unwrap();
        fs::create_dir_all(dir.join("out")).unwrap();
        dir
    }

    fn write_site(dir: &PathBuf) {
        let site = dir.join("site");
        let today = Utc::now().date_naive();
        let day = |offset: i64| (today - chrono::Duration::days(offset)).format("%Y-%m-%dT12:00:00Z").to_string();

        fs::write(site.join(CONFIG_PATH), r#"{"modes":["daily","weekly"],"categories":["gold","rates"]}"#).unwrap();
        fs::write(
            site.join(FX_PATH),
            format!(
                r#"{{"series":[{{"label":"Dollar (USD→IRR)","unit":"IRR","points":[{{"t":"{}","v":600000}},{{"t":"{}","v":610000}}]}}]}}"#,
                day(3),
                day(1)
            ),
        )
        .unwrap();
        fs::write(
            site.join(GOLD_PATH),
            format!(
                r#"{{"series":[{{"label":"Gold (XAU→USD)","unit":"USD","points":[{{"t":"{}","v":2300}},{{"t":"{}","v":2310}}]}}]}}"#,
                day(2),
                day(1)
            ),
        )
        .unwrap();
        fs::write(
            site.join(NEWS_PATH),
            format!(
                r#"{{"items":[{{"title":"Gold rallies","published":"{}"}},{{"title":"Bad date","published":"??"}}]}}"#,
                day(1)
            ),
        )
        .unwrap();
    }

    fn session_for(dir: &PathBuf) -> (Session, mpsc::UnboundedReceiver<LoadResult>) {
        let config = AppConfig {
            data_base: dir.join("site").display().to_string(),
            out_dir: dir.join("out"),
            chart_width: 320,
            chart_height: 240,
            ..AppConfig::default()
        };
        let client = SnapshotClient::from_dir(dir.join("site"));
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(config, client, tx), rx)
    }

    #[test]
    fn test_chart_id_parsing() {
        assert_eq!("fx".parse::<ChartId>(), Ok(ChartId::Fx));
        assert_eq!("chart-gold".parse::<ChartId>(), Ok(ChartId::Gold));
        assert!("btc".parse::<ChartId>().is_err());
    }

    #[tokio::test]
    async fn test_stale_load_is_discarded() {
        let dir = temp_dir("stale");
        write_site(&dir);
        let (mut session, mut rx) = session_for(&dir);

        let first = session.start_load();
        let second = session.start_load();
        assert_ne!(first, second);

        let mut results = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        results.sort_by_key(|r| r.ticket);
        let newest = results.pop().unwrap();
        let stale = results.pop().unwrap();

        assert_eq!(session.apply_load(stale), Ok(false));
        assert!(!session.has_data());

        assert_eq!(session.apply_load(newest), Ok(true));
        assert!(session.has_data());
        assert!(session.chart_path(ChartId::Fx).exists());
        assert!(session.chart_path(ChartId::Gold).exists());
        assert_eq!(session.chart(ChartId::Fx).phase, ChartPhase::Rendered);
        assert_eq!(session.news().total_items(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_controls_drive_rerender() {
        let dir = temp_dir("controls");
        write_site(&dir);
        let (mut session, mut rx) = session_for(&dir);

        session.start_load();
        let result = rx.recv().await.unwrap();
        session.apply_load(result).unwrap();

        assert!(session.set_mode("monthly").is_err());
        session.set_mode("weekly").unwrap();
        assert!(session.set_category("sports").is_err());
        session.set_category("rates").unwrap();
        assert_eq!(session.news().total_items(), 0);
        session.set_category("ALL").unwrap();
        assert_eq!(session.controls.category, "all");

        session.set_unit(DisplayUnit::Local).unwrap();
        let gold = session.chart(ChartId::Gold);
        assert_eq!(gold.unit.as_deref(), Some("IRR"));
        assert_eq!(gold.series[0].points[0].value, 2300.0 * 600000.0);

        assert!(session.set_range("forever").is_err());
        session.set_range("1D").unwrap();
        assert_eq!(session.controls.range, "1d");
        assert_eq!(session.chart(ChartId::Fx).series[0].len(), 1);

        let g = session.chart(ChartId::Fx).geometry.unwrap();
        let tooltip = session.hover(ChartId::Fx, g.plot.left + 1, g.plot.top + 1).unwrap();
        assert!(tooltip.is_some());
        assert!(matches!(session.chart(ChartId::Fx).phase, ChartPhase::Hovering { .. }));
        session.leave(ChartId::Fx).unwrap();
        assert_eq!(session.chart(ChartId::Fx).phase, ChartPhase::Rendered);

        assert!(session.legends().contains("Dollar (USD→IRR)"));
        assert!(session.status().contains("Mode: weekly"));

        let _ = fs::remove_dir_all(&dir);
    }

    fn png_size(path: &PathBuf) -> (u32, u32) {
        let bytes = fs::read(path).unwrap();
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (width, height)
    }

    async fn loaded(session: &mut Session, rx: &mut mpsc::UnboundedReceiver<LoadResult>) {
        session.start_load();
        let result = rx.recv().await.unwrap();
        assert_eq!(session.apply_load(result), Ok(true));
    }

    #[tokio::test]
    async fn test_hover_after_resize_matches_new_canvas() {
        let dir = temp_dir("resize");
        write_site(&dir);
        let (mut session, mut rx) = session_for(&dir);
        loaded(&mut session, &mut rx).await;

        session.resize(640, 360).unwrap();

        // The reload started by the resize has not been applied yet
        let g = session.chart(ChartId::Fx).geometry.unwrap();
        assert_eq!((g.width, g.height), (640, 360));
        assert!(g.plot.contains(400, 150));
        assert_eq!(png_size(&session.chart_path(ChartId::Fx)), (640, 360));

        let tooltip = session.hover(ChartId::Fx, 400, 150).unwrap();
        assert!(tooltip.is_some());
        assert_eq!(png_size(&session.chart_path(ChartId::Fx)), (640, 360));

        session.leave(ChartId::Fx).unwrap();
        assert_eq!(png_size(&session.chart_path(ChartId::Fx)), (640, 360));

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_first_offered_mode_applies_unless_chosen() {
        let dir = temp_dir("modes");
        write_site(&dir);
        fs::write(dir.join("site").join(CONFIG_PATH), r#"{"modes":["weekly","daily"],"categories":[]}"#).unwrap();

        let (mut session, mut rx) = session_for(&dir);
        loaded(&mut session, &mut rx).await;
        assert_eq!(session.controls.mode, "weekly");

        let (mut chosen, mut chosen_rx) = session_for(&dir);
        chosen.set_mode("daily").unwrap();
        loaded(&mut chosen, &mut chosen_rx).await;
        assert_eq!(chosen.controls.mode, "daily");

        let (mut unknown, mut unknown_rx) = session_for(&dir);
        unknown.set_mode("hourly").unwrap();
        loaded(&mut unknown, &mut unknown_rx).await;
        assert_eq!(unknown.controls.mode, "weekly");

        let _ = fs::remove_dir_all(&dir);
    }
}
