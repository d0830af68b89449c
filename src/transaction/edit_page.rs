//! Defines the route handler for the page for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
    transaction::{
        Transaction,
        core::get_transaction,
        form::{TransactionFormDefaults, TransactionType, transaction_form_fields},
    },
};

fn edit_transaction_view(transaction: &Transaction, categories: &[Category]) -> Markup {
    let update_route = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let spinner = loading_spinner();

    let transaction_type = if transaction.amount < 0.0 {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            transaction_type,
            amount: Some(transaction.amount.abs()),
            month: transaction.month,
            year: transaction.year,
            description: Some(&transaction.description),
            category_id: transaction.category_id.as_deref(),
            autofocus_amount: false,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Changes"
                }
            }
        }
    };

    base("Edit Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The database connection for accessing transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing the transaction `transaction_id`.
///
/// Responds with the 404 page if the transaction does not exist.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    let transaction = match get_transaction(transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => {
            return NotFoundError.into_response();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            return InternalServerError::default().into_response();
        }
    };

    let categories = match get_all_categories(&connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories for edit transaction page: {error}");
            return InternalServerError::default().into_response();
        }
    };

    edit_transaction_view(&transaction, &categories).into_response()
}
