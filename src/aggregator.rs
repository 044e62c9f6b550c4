//! Derived views over a snapshot of waste events.
//!
//! Every function here is pure: it borrows the events, never mutates them,
//! and recomputes from scratch on each call.

use anyhow::{Result, ensure};
use chrono::NaiveDate;
use serde::Serialize;

use crate::category::Category;
use crate::event::WasteEvent;

/// Seconds from midnight to the last second of the same day.
const LAST_SECOND_OF_DAY: i64 = 86_399;

/// Number of events of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
    pub color: &'static str,
}

/// Counts events per known category, in the order of `known`.
///
/// Every category in `known` is present even when nothing matched it.
/// Events with unrecognized labels are skipped.
pub fn count_by_category(events: &[WasteEvent], known: &[Category]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = known
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: 0,
            color: category.color(),
        })
        .collect();

    for event in events {
        let Some(category) = event.known_category() else {
            continue;
        };
        if let Some(entry) = counts.iter_mut().find(|c| c.category == category) {
            entry.count += 1;
        }
    }

    counts
}

/// Returns the entry with the largest count.
///
/// Ties go to the earliest entry, so an all-zero input yields the first
/// category with a count of 0. Only an empty slice yields `None`.
pub fn most_common_category(counts: &[CategoryCount]) -> Option<&CategoryCount> {
    counts
        .iter()
        .reduce(|best, current| if current.count > best.count { current } else { best })
}

/// Inclusive calendar-day bounds for the activity listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// No bounds: every timestamped event passes.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a range from `YYYY-MM-DD` strings.
    ///
    /// Empty or malformed strings leave that side unbounded.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.and_then(parse_day),
            end: end.and_then(parse_day),
        }
    }

    /// Midnight UTC of the start day.
    pub fn start_boundary(&self) -> Option<i64> {
        self.start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
    }

    /// Last second (23:59:59 UTC) of the end day.
    pub fn end_boundary(&self) -> Option<i64> {
        self.end
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp() + LAST_SECOND_OF_DAY)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        let after_start = self.start_boundary().is_none_or(|start| timestamp >= start);
        let before_end = self.end_boundary().is_none_or(|end| timestamp <= end);
        after_start && before_end
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Keeps the events inside `range`, most recent first.
///
/// Events without a usable timestamp never pass. Events sharing a timestamp
/// keep their input order.
pub fn filter_by_date_range<'a>(events: &'a [WasteEvent], range: &DateRange) -> Vec<&'a WasteEvent> {
    let mut kept: Vec<&WasteEvent> = events
        .iter()
        .filter(|e| e.timestamp.is_some_and(|ts| range.contains(ts)))
        .collect();

    // `sort_by` is stable
    kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    kept
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Slices out page `page_number` (1-based) of `items`.
///
/// Pages outside `[1, total_pages]` come back empty. The page number is not
/// clamped here; that is the caller's job.
///
/// # Errors
///
/// Returns an error if `page_size` is zero.
pub fn paginate<T: Clone>(items: &[T], page_number: usize, page_size: usize) -> Result<Page<T>> {
    ensure!(page_size >= 1, "page size must be at least 1, got {page_size}");

    let total_pages = items.len().div_ceil(page_size);

    let slice: &[T] = match page_number.checked_sub(1) {
        Some(index) => {
            let start = index.saturating_mul(page_size).min(items.len());
            let end = start.saturating_add(page_size).min(items.len());
            &items[start..end]
        }
        None => &[],
    };

    Ok(Page {
        items: slice.to_vec(),
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-01T00:00:00Z
    const JAN_1: i64 = 1_735_689_600;

    fn ev(id: &str, category: &str, ts: i64) -> WasteEvent {
        WasteEvent::new(id, category, Some(ts))
    }

    fn counts_of(metal: usize, wet: usize, dry: usize) -> Vec<CategoryCount> {
        [(Category::Metal, metal), (Category::Wet, wet), (Category::Dry, dry)]
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category,
                count,
                color: category.color(),
            })
            .collect()
    }

    #[test]
    fn test_count_by_category_empty() {
        let counts = count_by_category(&[], &Category::ALL);
        assert_eq!(counts, counts_of(0, 0, 0));
    }

    #[test]
    fn test_count_by_category_skips_unknown() {
        let events = vec![
            ev("1", "Metal", 1),
            ev("2", "Metal", 2),
            ev("3", "Dry", 3),
            ev("4", "Plastic", 4),
            ev("5", "wet", 5),
        ];
        let counts = count_by_category(&events, &Category::ALL);
        assert_eq!(counts, counts_of(2, 0, 1));

        let total: usize = counts.iter().map(|c| c.count).sum();
        assert!(total < events.len());
    }

    #[test]
    fn test_count_by_category_sum_equals_len_when_all_known() {
        let events = vec![ev("1", "Wet", 1), ev("2", "Dry", 2), ev("3", "Wet", 3)];
        let counts = count_by_category(&events, &Category::ALL);
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, events.len());
    }

    #[test]
    fn test_count_by_category_counts_duplicates() {
        let events = vec![ev("1", "Wet", 1), ev("1", "Wet", 1)];
        let counts = count_by_category(&events, &Category::ALL);
        assert_eq!(counts, counts_of(0, 2, 0));
    }

    #[test]
    fn test_count_by_category_order_independent() {
        let mut events = vec![
            ev("1", "Metal", 1),
            ev("2", "Dry", 2),
            ev("3", "Wet", 3),
            ev("4", "Dry", 4),
            ev("5", "Glass", 5),
        ];
        let forward = count_by_category(&events, &Category::ALL);
        events.reverse();
        let backward = count_by_category(&events, &Category::ALL);
        events.rotate_left(2);
        let rotated = count_by_category(&events, &Category::ALL);

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_count_by_category_uses_known_order() {
        let known = [Category::Dry, Category::Metal];
        let counts = count_by_category(&[ev("1", "Wet", 1), ev("2", "Dry", 2)], &known);
        let cats: Vec<_> = counts.iter().map(|c| (c.category, c.count)).collect();
        assert_eq!(cats, vec![(Category::Dry, 1), (Category::Metal, 0)]);
    }

    #[test]
    fn test_most_common_strict_max() {
        let counts = counts_of(1, 4, 2);
        assert_eq!(most_common_category(&counts).unwrap().category, Category::Wet);
    }

    #[test]
    fn test_most_common_tie_goes_to_first_declared() {
        let counts = counts_of(2, 2, 0);
        let top = most_common_category(&counts).unwrap();
        assert_eq!(top.category, Category::Metal);
        assert_eq!(top.count, 2);

        let counts = counts_of(0, 3, 3);
        assert_eq!(most_common_category(&counts).unwrap().category, Category::Wet);
    }

    #[test]
    fn test_most_common_all_zero_is_first_category() {
        let counts = counts_of(0, 0, 0);
        let top = most_common_category(&counts).unwrap();
        assert_eq!(top.category, Category::Metal);
        assert_eq!(top.count, 0);
    }

    #[test]
    fn test_most_common_empty() {
        assert!(most_common_category(&[]).is_none());
    }

    #[test]
    fn test_date_range_parse_malformed_is_unbounded() {
        assert_eq!(DateRange::parse(Some(""), Some("not-a-date")), DateRange::all());
        assert_eq!(DateRange::parse(Some("2025-13-01"), None), DateRange::all());

        let range = DateRange::parse(Some("2025-01-01"), Some("garbage"));
        assert_eq!(range.start_boundary(), Some(JAN_1));
        assert_eq!(range.end_boundary(), None);
    }

    #[test]
    fn test_date_range_boundaries() {
        let range = DateRange::parse(Some("2025-01-01"), Some("2025-01-01"));
        assert_eq!(range.start_boundary(), Some(JAN_1));
        assert_eq!(range.end_boundary(), Some(JAN_1 + 86_399));
    }

    #[test]
    fn test_filter_no_bounds_returns_all_sorted_desc() {
        let events = vec![ev("a", "Metal", 10), ev("b", "Wet", 30), ev("c", "Glass", 20)];
        let filtered = filter_by_date_range(&events, &DateRange::all());
        let ids: Vec<_> = filtered.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_filter_end_day_is_inclusive() {
        let events = vec![
            ev("last-second", "Metal", JAN_1 + 86_399),
            ev("next-day", "Metal", JAN_1 + 86_400),
            ev("midnight", "Dry", JAN_1),
            ev("day-before", "Dry", JAN_1 - 1),
        ];
        let range = DateRange::parse(Some("2025-01-01"), Some("2025-01-01"));
        let ids: Vec<_> = filter_by_date_range(&events, &range)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["last-second", "midnight"]);
    }

    #[test]
    fn test_filter_single_sided_bounds() {
        let events = vec![ev("old", "Wet", JAN_1 - 10), ev("new", "Wet", JAN_1 + 10)];

        let from = DateRange::parse(Some("2025-01-01"), None);
        let ids: Vec<_> = filter_by_date_range(&events, &from).iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["new"]);

        let until = DateRange::parse(None, Some("2024-12-31"));
        let ids: Vec<_> = filter_by_date_range(&events, &until).iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["old"]);
    }

    #[test]
    fn test_filter_excludes_missing_timestamps() {
        let events = vec![WasteEvent::new("x", "Metal", None), ev("y", "Metal", 1)];
        let filtered = filter_by_date_range(&events, &DateRange::all());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "y");
    }

    #[test]
    fn test_filter_ties_keep_input_order() {
        let events = vec![
            ev("first", "Metal", 100),
            ev("older", "Dry", 50),
            ev("second", "Wet", 100),
            ev("third", "Dry", 100),
        ];
        let ids: Vec<_> = filter_by_date_range(&events, &DateRange::all())
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second", "third", "older"]);
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let events = vec![ev("a", "Metal", 1), ev("b", "Metal", 2)];
        let before = events.clone();
        let _ = filter_by_date_range(&events, &DateRange::all());
        assert_eq!(events, before);
    }

    #[test]
    fn test_paginate_25_items() {
        let items: Vec<usize> = (0..25).collect();

        let first = paginate(&items, 1, 10).unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());

        let third = paginate(&items, 3, 10).unwrap();
        assert_eq!(third.items, (20..25).collect::<Vec<_>>());

        let fourth = paginate(&items, 4, 10).unwrap();
        assert!(fourth.items.is_empty());
        assert_eq!(fourth.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u8>(&[], 1, 10).unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_paginate_page_zero_is_empty() {
        let page = paginate(&[1, 2, 3], 0, 2).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_paginate_huge_page_number() {
        let page = paginate(&[1, 2, 3], usize::MAX, 2).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_paginate_zero_page_size_is_error() {
        assert!(paginate(&[1, 2, 3], 1, 0).is_err());
    }

    #[test]
    fn test_filter_then_single_page_is_whole_listing() {
        let events = vec![ev("a", "Metal", 3), ev("b", "Wet", 1), ev("c", "Dry", 2)];
        let filtered = filter_by_date_range(&events, &DateRange::all());

        let page = paginate(&filtered, 1, filtered.len()).unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items, filtered);
    }
}
