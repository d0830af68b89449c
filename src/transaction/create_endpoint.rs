//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
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
    endpoints,
    month::parse_month_input,
    transaction::{
        Transaction, TransactionBuilder,
        core::create_transaction,
        form::{TransactionType, signed_amount},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
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

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let builder = match build_transaction(form) {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(builder, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn build_transaction(form: TransactionForm) -> Result<TransactionBuilder, Error> {
    let amount = signed_amount(form.type_, form.amount);
    if amount == 0.0 {
        return Err(Error::ZeroAmount);
    }

    let description = form.description.trim();
    if description.chars().count() < 2 {
        return Err(Error::DescriptionTooShort);
    }

    let (month, year) = parse_month_input(&form.month)?;
    let category_id = form
        .category_id
        .filter(|category_id| !category_id.is_empty());

    Ok(Transaction::build(amount, description, month, year).category_id(category_id))
}
