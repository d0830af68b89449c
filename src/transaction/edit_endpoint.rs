//! Defines the endpoint for updating an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::CategoryId,
    database_id::DatabaseId,
    endpoints,
    month::parse_month_input,
    transaction::{
        TransactionUpdate,
        core::update_transaction,
        form::{TransactionType, signed_amount},
    },
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating a transaction.
#[derive(Debug, Deserialize)]
pub struct EditTransactionForm {
    /// Whether the amount was spent or received.
    pub type_: TransactionType,
    /// The positive size of the transaction in dollars.
    pub amount: f64,
    /// The month the transaction belongs to, as YYYY-MM.
    pub month: String,
    /// Text detailing the transaction.
    pub description: String,
    /// The ID of the category to file the transaction under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A route handler for updating the transaction `transaction_id`, redirects to
/// the transactions view on success.
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<DatabaseId>,
    Form(form): Form<EditTransactionForm>,
) -> Response {
    let update = match build_update(form) {
        Ok(update) => update,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_transaction(transaction_id, &update, &connection) {
        tracing::error!("could not update transaction {transaction_id}: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn build_update(form: EditTransactionForm) -> Result<TransactionUpdate, Error> {
    let amount = signed_amount(form.type_, form.amount);
    if amount == 0.0 {
        return Err(Error::ZeroAmount);
    }

    let description = form.description.trim();
    if description.chars().count() < 2 {
        return Err(Error::DescriptionTooShort);
    }

    let (month, year) = parse_month_input(&form.month)?;

    // The category select always submits a value, so an empty ID means the
    // user picked Uncategorized and the stored category is cleared.
    let category_id = form
        .category_id
        .filter(|category_id| !category_id.is_empty());

    Ok(TransactionUpdate {
        amount: Some(amount),
        description: Some(description.to_owned()),
        month: Some(month),
        year: Some(year),
        category_id: Some(category_id),
    })
}
