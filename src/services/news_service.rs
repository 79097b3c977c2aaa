use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{DatedNewsItem, NewsItem};
use crate::utils::{format_minute, parse_timestamp, Page, Table};

const TITLE_WIDTH: usize = 70;

/// Which items the news list shows
#[derive(Debug, Clone)]
pub struct NewsFilter {
    /// `None` or `all` matches everything
    pub category: Option<String>,
    /// Only items published within this window before `now`
    pub range: Option<Duration>,
    pub now: DateTime<Utc>,
}

impl NewsFilter {
    fn matches_category(&self, item: &NewsItem) -> bool {
        let Some(category) = self.category.as_deref() else {
            return true;
        };
        if category.is_empty() || category.eq_ignore_ascii_case("all") {
            return true;
        }
        let needle = category.to_lowercase();
        [Some(item.title.as_str()), item.summary.as_deref(), item.source.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filter, date and sort news items, newest first.
///
/// Items whose `published` string fails every parse strategy are dropped,
/// however recent they may actually be.
pub fn filter_and_sort(items: &[NewsItem], filter: &NewsFilter) -> Vec<DatedNewsItem> {
    let cutoff = filter.range.map(|range| filter.now - range);

    let mut dated: Vec<DatedNewsItem> = items
        .iter()
        .filter_map(|item| {
            let Some(published_at) = parse_timestamp(&item.published) else {
                debug!("Skipping news item with unparseable date: {:?}", item.published);
                return None;
            };
            Some(DatedNewsItem {
                published_at,
                item: item.clone(),
            })
        })
        .filter(|d| cutoff.map_or(true, |c| d.published_at >= c))
        .filter(|d| filter.matches_category(&d.item))
        .collect();

    dated.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    dated
}

/// Paginate filtered news
pub fn paginate(items: Vec<DatedNewsItem>, page_size: usize) -> Page<DatedNewsItem> {
    Page::new(items, page_size)
}

/// Render the current page as a table followed by the pager line
pub fn format_news_page(page: &Page<DatedNewsItem>) -> String {
    if page.total_items() == 0 {
        return "No news items match the current filters.\n".to_string();
    }

    let mut table = Table::new(vec!["Published", "Source", "Title"]).with_max_width(TITLE_WIDTH);
    for entry in page.current() {
        let published = format_minute(&entry.published_at);
        table.add_row(vec![
            published.as_str(),
            entry.item.source_or_default(),
            entry.item.title.as_str(),
        ]);
    }

    let mut output = table.render();
    output.push_str(&page.pager_line());
    output.push('\n');
    output
}
