use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::Category;

/// One sorting action recorded by a bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteEvent {
    /// Key assigned by the database.
    pub id: String,
    /// Label exactly as stored; may name an unknown category.
    pub category: String,
    /// Seconds since the Unix epoch, `None` when the stored value was unusable.
    pub timestamp: Option<i64>,
}

impl WasteEvent {
    pub fn new(id: impl Into<String>, category: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            timestamp,
        }
    }

    /// The recognized category, if the label matches one.
    pub fn known_category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Every event at one instant, as delivered by a data source.
///
/// Snapshots replace each other wholesale; nothing is merged.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub events: Vec<WasteEvent>,
    pub received_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(events: Vec<WasteEvent>) -> Self {
        Self {
            events,
            received_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True when both snapshots hold the same events, ignoring arrival time.
    pub fn same_contents(&self, other: &Snapshot) -> bool {
        self.events == other.events
    }
}
