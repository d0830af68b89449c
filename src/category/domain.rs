//! Core category domain types.

use serde::{Deserialize, Serialize};

/// Identifier for a category, e.g. "food" or "housing".
///
/// Categories use human-readable string IDs rather than database row IDs
/// because the IDs are referenced by name elsewhere (see [INCOME_CATEGORY_ID]).
pub type CategoryId = String;

/// The reserved ID of the income category.
///
/// Income is not a spending category, so it is excluded from budget category
/// pickers.
pub const INCOME_CATEGORY_ID: &str = "income";

/// The display name used when a transaction or budget references a category
/// that does not exist in the registry.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// The dot color used alongside [UNKNOWN_CATEGORY_NAME].
pub const UNKNOWN_CATEGORY_COLOR: &str = "#d1d5db";

/// A labeled grouping for transactions and budgets (e.g., "Food & Dining").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Hex color used for chart slices and the colored dots in tables.
    pub color: String,
}

/// Look up a category by ID.
///
/// A missing or unmatched ID returns `None`, it is never an error. Callers
/// display [UNKNOWN_CATEGORY_NAME] in that case.
pub fn find_category<'a>(categories: &'a [Category], category_id: Option<&str>) -> Option<&'a Category> {
    let category_id = category_id?;
    categories.iter().find(|category| category.id == category_id)
}

/// The display name for a possibly-missing category reference.
pub fn category_display_name<'a>(categories: &'a [Category], category_id: Option<&str>) -> &'a str {
    find_category(categories, category_id)
        .map(|category| category.name.as_str())
        .unwrap_or(UNKNOWN_CATEGORY_NAME)
}

/// The dot color for a possibly-missing category reference.
pub fn category_display_color<'a>(categories: &'a [Category], category_id: Option<&str>) -> &'a str {
    find_category(categories, category_id)
        .map(|category| category.color.as_str())
        .unwrap_or(UNKNOWN_CATEGORY_COLOR)
}
