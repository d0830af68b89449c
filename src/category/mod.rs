//! The category registry: the fixed set of labels transactions and budgets
//! are grouped under.

mod db;
mod domain;

pub use db::{
    DEFAULT_CATEGORIES, category_exists, create_category_table, get_all_categories, get_category,
    seed_default_categories,
};
pub use domain::{
    Category, CategoryId, INCOME_CATEGORY_ID, UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME,
    category_display_color, category_display_name, find_category,
};
