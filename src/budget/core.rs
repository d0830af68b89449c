//! Defines the core data model and database queries for budgets.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, database_id::DatabaseId};

/// A planned spending ceiling for one category in one month/year.
///
/// At most one budget may exist per (category, month, year). That rule is
/// enforced by [find_conflicting_budget] checks in the mutation endpoints
/// rather than a storage constraint, so a violation surfaces as a form
/// message the user can recover from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseId,
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The spending ceiling. Non-negative.
    pub amount: f64,
    /// The calendar month the budget applies to (1-12).
    pub month: u8,
    /// The calendar year the budget applies to.
    pub year: i32,
}

/// The fields needed to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The spending ceiling. Non-negative.
    pub amount: f64,
    /// The calendar month the budget applies to (1-12).
    pub month: u8,
    /// The calendar year the budget applies to.
    pub year: i32,
}

/// A partial update to a budget.
///
/// Each field is optional: `None` leaves the stored value unchanged.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct BudgetUpdate {
    /// The new category, if it should change.
    pub category_id: Option<CategoryId>,
    /// The new spending ceiling, if it should change.
    pub amount: Option<f64>,
    /// The new month (1-12), if it should change.
    pub month: Option<u8>,
    /// The new year, if it should change.
    pub year: Option<i32>,
}

/// Create a budget and return it with its generated ID.
///
/// Callers are expected to run [find_conflicting_budget] first; this function
/// does not check for duplicates.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a registered category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (category_id, amount, month, year)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, category_id, amount, month, year",
        )?
        .query_row(
            (&budget.category_id, budget.amount, budget.month, budget.year),
            map_budget_row,
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidCategory(Some(budget.category_id.clone()))
            }
            error => error.into(),
        })
}

/// Retrieve a budget from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget(id: DatabaseId, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare("SELECT id, category_id, amount, month, year FROM budget WHERE id = :id")?
        .query_one(&[(":id", &id)], map_budget_row)?;

    Ok(budget)
}

/// Retrieve every budget in insertion order.
///
/// This is the snapshot the comparison aggregation and the budget page
/// operate on.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare("SELECT id, category_id, amount, month, year FROM budget ORDER BY id ASC")?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
        .collect()
}

/// Find a budget for the same (category, month, year), excluding `budget_id`
/// when editing an existing budget.
///
/// Returns `None` when the combination is free. This is the duplicate check
/// the mutation endpoints run before any write.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn find_conflicting_budget(
    category_id: &str,
    month: u8,
    year: i32,
    budget_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    let result = connection
        .prepare(
            "SELECT id, category_id, amount, month, year FROM budget
             WHERE category_id = ?1 AND month = ?2 AND year = ?3 AND id != ?4",
        )?
        // Id 0 is never assigned, so it excludes nothing for the create path.
        .query_row(
            (category_id, month, year, budget_id.unwrap_or(0)),
            map_budget_row,
        );

    match result {
        Ok(budget) => Ok(Some(budget)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Apply a partial update to the budget with the given `id`.
///
/// Fields left as `None` keep their stored values. Callers are expected to
/// run [find_conflicting_budget] with the resulting (category, month, year)
/// first.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if `id` does not refer to a valid budget,
/// - [Error::InvalidCategory] if the new category ID does not refer to a registered category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: DatabaseId,
    update: &BudgetUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE budget SET
                category_id = COALESCE(?1, category_id),
                amount = COALESCE(?2, amount),
                month = COALESCE(?3, month),
                year = COALESCE(?4, year)
             WHERE id = ?5",
            (&update.category_id, update.amount, update.month, update.year, id),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidCategory(update.category_id.clone())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete the budget with the given `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id TEXT NOT NULL,
            amount REAL NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE
        );

        INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('budget', 0);

        CREATE INDEX IF NOT EXISTS idx_budget_year_month ON budget(year, month, category_id);",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let category_id = row.get(1)?;
    let amount = row.get(2)?;
    let month = row.get(3)?;
    let year = row.get(4)?;

    Ok(Budget {
        id,
        category_id,
        amount,
        month,
        year,
    })
}
