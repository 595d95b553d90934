//! Ranked rollups of the event log.

use std::cmp::Ordering;

/// Number of ranked keys kept per category.
pub const TOP_K: usize = 10;

/// Key used for rows with an empty name column.
pub const UNKNOWN_KEY: &str = "(unknown)";

/// Event categories that are rolled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Mob,
    Craft,
    Rare,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Mob, Category::Craft, Category::Rare];

    /// Substring of the event type that selects this category.
    pub fn marker(&self) -> &'static str {
        match self {
            Category::Mob => "MOB",
            Category::Craft => "CRAFT",
            Category::Rare => "RARE",
        }
    }

    /// Classify an event type tag. The first matching marker wins, checked
    /// in the order of [`Category::ALL`].
    pub fn classify(event_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| event_type.contains(category.marker()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Mob => "mob",
            Category::Craft => "craft",
            Category::Rare => "rare",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Count and summed value for one grouping key.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregationKey {
    pub name: String,
    pub count: u64,
    pub sum: f64,
}

impl AggregationKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            sum: 0.0,
        }
    }

    /// Fold one row into this key.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    /// Ranking order: larger sum first, then larger count, then name
    /// ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .sum
            .total_cmp(&self.sum)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Totals and top keys for one category.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategorySummary {
    pub count: u64,
    pub sum: f64,
    /// At most [`TOP_K`] keys in rank order.
    pub top: Vec<AggregationKey>,
}

/// Result of one aggregation pass over the event log.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventSummary {
    /// Data lines at or after the start line, excluding any header.
    pub lines_read: u64,
    /// Rows whose value column did not parse.
    pub rows_dropped: u64,
    /// Rows whose type matched no category.
    pub rows_ignored: u64,
    pub mob: CategorySummary,
    pub craft: CategorySummary,
    pub rare: CategorySummary,
}

impl EventSummary {
    pub fn category(&self, category: Category) -> &CategorySummary {
        match category {
            Category::Mob => &self.mob,
            Category::Craft => &self.craft,
            Category::Rare => &self.rare,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategorySummary {
        match category {
            Category::Mob => &mut self.mob,
            Category::Craft => &mut self.craft,
            Category::Rare => &mut self.rare,
        }
    }

    /// Events counted across every category.
    pub fn total_count(&self) -> u64 {
        Category::ALL.iter().map(|c| self.category(*c).count).sum()
    }

    /// True if no row landed in any category.
    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }
}
