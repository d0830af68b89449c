//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Negative values are expenses, positive values are income.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The calendar month the transaction belongs to (1-12).
    pub month: u8,
    /// The calendar year the transaction belongs to.
    pub year: i32,
    /// The ID of the category the transaction belongs to.
    ///
    /// `None` or an ID missing from the registry renders as "Unknown".
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, description: &str, month: u8, year: i32) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            description: description.to_owned(),
            month,
            year,
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Set the optional fields, then pass the builder to
/// [create_transaction] to insert the row and get back the stored
/// [Transaction] with its generated ID.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    ///
    /// # Examples
    /// - `150.00` - Salary deposit
    /// - `-45.99` - Coffee shop purchase
    /// - `-1200.00` - Rent payment
    pub amount: f64,

    /// A human-readable description of the transaction.
    pub description: String,

    /// The calendar month the transaction belongs to (1-12).
    pub month: u8,

    /// The calendar year the transaction belongs to.
    pub year: i32,

    /// The category of the transaction, e.g. "food", "housing".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// A partial update to a transaction.
///
/// Each field is optional: `None` leaves the stored value unchanged.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct TransactionUpdate {
    /// The new signed amount, if it should change.
    pub amount: Option<f64>,
    /// The new description, if it should change.
    pub description: Option<String>,
    /// The new month (1-12), if it should change.
    pub month: Option<u8>,
    /// The new year, if it should change.
    pub year: Option<i32>,
    /// The new category, if it should change.
    ///
    /// `Some(None)` clears the category.
    pub category_id: Option<Option<CategoryId>>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a registered category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, description, month, year, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, description, month, year, category_id",
        )?
        .query_row(
            (
                builder.amount,
                &builder.description,
                builder.month,
                builder.year,
                &builder.category_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidCategory(builder.category_id.clone())
            }
            error => error.into(),
        })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: DatabaseId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, description, month, year, category_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction, newest first (year, then month, then ID
/// descending).
///
/// This is the snapshot the aggregation functions and the transactions page
/// operate on.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, description, month, year, category_id
             FROM \"transaction\"
             ORDER BY year DESC, month DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// Apply a partial update to the transaction with the given `id`.
///
/// Fields left as `None` keep their stored values.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - [Error::InvalidCategory] if the new category ID does not refer to a registered category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: DatabaseId,
    update: &TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET
                amount = COALESCE(?1, amount),
                description = COALESCE(?2, description),
                month = COALESCE(?3, month),
                year = COALESCE(?4, year),
                category_id = CASE WHEN ?5 THEN ?6 ELSE category_id END
             WHERE id = ?7",
            (
                update.amount,
                &update.description,
                update.month,
                update.year,
                update.category_id.is_some(),
                update.category_id.clone().flatten(),
                id,
            ),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidCategory(update.category_id.clone().flatten())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction with the given `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                month INTEGER NOT NULL,
                year INTEGER NOT NULL,
                category_id TEXT,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index for the month/year filters used by the aggregations.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_year_month
         ON \"transaction\"(year, month, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let month = row.get(3)?;
    let year = row.get(4)?;
    let category_id = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        description,
        month,
        year,
        category_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================
