//! Database operations for the category registry.
//!
//! The registry is read-only at runtime: it is seeded once at database
//! initialization and has no create/update/delete surface.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId},
};

/// The categories seeded into every new database, in registry order.
///
/// Each entry is (id, name, color).
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 9] = [
    ("food", "Food & Dining", "#38b26f"),
    ("housing", "Housing", "#e67e22"),
    ("transport", "Transportation", "#3498db"),
    ("utilities", "Utilities", "#9b59b6"),
    ("entertainment", "Entertainment", "#e74c3c"),
    ("shopping", "Shopping", "#1abc9c"),
    ("healthcare", "Healthcare", "#f39c12"),
    ("personal", "Personal", "#34495e"),
    ("income", "Income", "#27ae60"),
];

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            position INTEGER NOT NULL
        );",
    )?;

    Ok(())
}

/// Insert the default categories, skipping any that already exist.
///
/// The `position` column preserves registry order across queries.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO category (id, name, color, position) VALUES (?1, ?2, ?3, ?4);",
    )?;

    for (position, (id, name, color)) in DEFAULT_CATEGORIES.iter().enumerate() {
        statement.execute((id, name, color, position as i64))?;
    }

    Ok(())
}

/// Retrieve all categories in registry order.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color FROM category ORDER BY position ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, color FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Check whether `category_id` refers to a registered category.
pub fn category_exists(category_id: &str, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection
        .prepare("SELECT COUNT(1) FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], |row| row.get(0))?;

    Ok(count > 0)
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id: CategoryId = row.get(0)?;
    let name = row.get(1)?;
    let color = row.get(2)?;

    Ok(Category { id, name, color })
}
