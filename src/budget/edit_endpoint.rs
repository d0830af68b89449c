//! Defines the endpoint for updating an existing budget.
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
    budget::{
        BudgetUpdate,
        core::{find_conflicting_budget, update_budget},
        create_endpoint::duplicate_budget_error,
    },
    category::{CategoryId, INCOME_CATEGORY_ID},
    database_id::DatabaseId,
    endpoints,
    month::parse_month_input,
};

/// The state needed to update a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating a budget.
#[derive(Debug, Deserialize)]
pub struct EditBudgetForm {
    /// The ID of the category the budget applies to.
    #[serde(default)]
    pub category_id: CategoryId,
    /// The spending ceiling in dollars.
    pub amount: f64,
    /// The month the budget applies to, as YYYY-MM.
    pub month: String,
}

/// A route handler for updating the budget `budget_id`, redirects to the
/// budget view on success.
///
/// The duplicate check excludes the budget being edited, so saving a budget
/// without moving it to another (category, month) pair always succeeds.
pub async fn update_budget_endpoint(
    State(state): State<EditBudgetState>,
    Path(budget_id): Path<DatabaseId>,
    Form(form): Form<EditBudgetForm>,
) -> Response {
    let (category_id, amount, month, year) = match build_update(form) {
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

    match find_conflicting_budget(&category_id, month, year, Some(budget_id), &connection) {
        Ok(None) => {}
        Ok(Some(_)) => {
            return duplicate_budget_error(&category_id, month, year, &connection)
                .into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not check for conflicting budgets: {error}");
            return error.into_alert_response();
        }
    }

    let update = BudgetUpdate {
        category_id: Some(category_id),
        amount: Some(amount),
        month: Some(month),
        year: Some(year),
    };

    if let Err(error) = update_budget(budget_id, &update, &connection) {
        tracing::error!("could not update budget {budget_id}: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn build_update(form: EditBudgetForm) -> Result<(CategoryId, f64, u8, i32), Error> {
    if form.category_id.is_empty() {
        return Err(Error::InvalidCategory(None));
    }

    // Budgets are spending ceilings, so the income category is not budgetable.
    if form.category_id == INCOME_CATEGORY_ID {
        return Err(Error::InvalidCategory(Some(form.category_id)));
    }

    if form.amount < 0.0 {
        return Err(Error::NegativeBudgetAmount);
    }

    let (month, year) = parse_month_input(&form.month)?;

    Ok((form.category_id, form.amount, month, year))
}
