//! View state for the dashboard: filters, the current page, and the derived
//! view computed from one snapshot.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{
    CategoryCount, DateRange, count_by_category, filter_by_date_range, most_common_category,
    paginate,
};
use crate::category::Category;
use crate::event::{Snapshot, WasteEvent};

/// Rows shown per page of the activity listing.
pub const PAGE_SIZE: usize = 10;

/// Filters and pagination chosen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    range: DateRange,
    page: usize,
    page_size: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            range: DateRange::all(),
            page: 1,
            page_size: PAGE_SIZE,
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Replaces the date filter from `YYYY-MM-DD` strings. Any change to the
    /// effective range sends the viewer back to page 1.
    pub fn set_date_range(&mut self, start: Option<&str>, end: Option<&str>) {
        let range = DateRange::parse(start, end);
        if range != self.range {
            debug!(?range, "Date range changed, resetting to first page");
            self.range = range;
            self.page = 1;
        }
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page.saturating_sub(1), total_pages);
    }

    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.page = clamp_page(page, total_pages);
    }

    /// Recomputes every derived view from `snapshot`.
    ///
    /// The stored page is clamped into the new page range first, so a
    /// shrinking listing never leaves the viewer past the last page.
    pub fn view(&mut self, snapshot: &Snapshot) -> Result<DashboardView> {
        let counts = count_by_category(&snapshot.events, &Category::ALL);
        let most_common = most_common_category(&counts).map(|c| MostCommon {
            category: c.category,
            count: c.count,
        });

        let filtered = filter_by_date_range(&snapshot.events, &self.range);
        let total_pages = filtered.len().div_ceil(self.page_size);
        self.page = clamp_page(self.page, total_pages);

        let page = paginate(&filtered, self.page, self.page_size)?;

        Ok(DashboardView {
            total_items: snapshot.len(),
            counts,
            most_common,
            filtered_total: filtered.len(),
            recent: page.items.into_iter().map(ActivityRow::from_event).collect(),
            current_page: self.page,
            total_pages: page.total_pages,
            last_updated: snapshot.received_at,
        })
    }
}

/// Keeps `page` inside `[1, total_pages]`; an empty listing still sits on page 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MostCommon {
    pub category: Category,
    pub count: usize,
}

/// One line of the activity listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    pub id: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub color: Option<&'static str>,
}

impl ActivityRow {
    pub fn from_event(event: &WasteEvent) -> Self {
        let (date, time) = match event.recorded_at() {
            Some(at) => (
                at.format("%Y-%m-%d").to_string(),
                at.format("%H:%M:%S").to_string(),
            ),
            None => (String::new(), String::new()),
        };

        Self {
            id: event.id.clone(),
            date,
            time,
            category: event.category.clone(),
            color: event.known_category().map(Category::color),
        }
    }
}

/// Everything the presentation layer renders for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// All events in the snapshot, recognized or not.
    pub total_items: usize,
    pub counts: Vec<CategoryCount>,
    pub most_common: Option<MostCommon>,
    /// Events that passed the date filter, across all pages.
    pub filtered_total: usize,
    pub recent: Vec<ActivityRow>,
    pub current_page: usize,
    pub total_pages: usize,
    pub last_updated: DateTime<Utc>,
}
