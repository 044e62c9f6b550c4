//! The closed set of waste categories reported by the sorting bins.

use serde::Serialize;
use std::fmt;

/// A waste category recognized by the dashboard.
///
/// The declaration order is significant: counts are reported in this order
/// and ties for the most common category resolve to the earliest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Metal,
    Wet,
    Dry,
}

impl Category {
    /// Every known category, in declared order.
    pub const ALL: [Category; 3] = [Category::Metal, Category::Wet, Category::Dry];

    /// The label stored in the database for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Metal => "Metal",
            Category::Wet => "Wet",
            Category::Dry => "Dry",
        }
    }

    /// Display color used by the presentation layer.
    ///
    /// | Category | Color     |
    /// |----------|-----------|
    /// | Metal    | `#6366F1` |
    /// | Wet      | `#10B981` |
    /// | Dry      | `#F59E0B` |
    pub fn color(self) -> &'static str {
        match self {
            Category::Metal => "#6366F1",
            Category::Wet => "#10B981",
            Category::Dry => "#F59E0B",
        }
    }

    /// Looks up a stored label. Matching is exact; `"metal"` is not `Metal`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
