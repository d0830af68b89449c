//! Defines the endpoint for deleting a budget.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, budget::core::delete_budget, database_id::DatabaseId,
};

/// The state needed to delete a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting the budget `budget_id`.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetState>,
    Path(budget_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(budget_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Budget deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete budget {budget_id}: {error}");
            error.into_alert_response()
        }
    }
}
