//! Creates the application's database tables and seed data.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::create_user_table,
    budget::create_budget_table,
    category::{create_category_table, seed_default_categories},
    transaction::create_transaction_table,
};

/// Create the application tables and seed the category registry.
///
/// Safe to call on every start-up: table creation uses IF NOT EXISTS and
/// seeding skips categories that are already present.
///
/// # Errors
/// Returns an error if a table cannot be created or the seed categories
/// cannot be inserted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
