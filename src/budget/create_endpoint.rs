//! Defines the endpoint for creating a new budget.
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
    budget::{
        NewBudget,
        core::{create_budget, find_conflicting_budget},
    },
    category::{CategoryId, INCOME_CATEGORY_ID, get_category},
    endpoints,
    month::{month_name, parse_month_input},
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The ID of the category the budget applies to.
    #[serde(default)]
    pub category_id: CategoryId,
    /// The spending ceiling in dollars.
    pub amount: f64,
    /// The month the budget applies to, as YYYY-MM.
    pub month: String,
}

/// A route handler for creating a new budget, redirects to the budget view on
/// success.
///
/// A budget that duplicates an existing (category, month) pair is rejected
/// before any write.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let budget = match build_budget(form) {
        Ok(budget) => budget,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match find_conflicting_budget(
        &budget.category_id,
        budget.month,
        budget.year,
        None,
        &connection,
    ) {
        Ok(None) => {}
        Ok(Some(_)) => {
            return duplicate_budget_error(
                &budget.category_id,
                budget.month,
                budget.year,
                &connection,
            )
            .into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not check for conflicting budgets: {error}");
            return error.into_alert_response();
        }
    }

    if let Err(error) = create_budget(budget, &connection) {
        tracing::error!("could not create budget: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn build_budget(form: BudgetForm) -> Result<NewBudget, Error> {
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

    Ok(NewBudget {
        category_id: form.category_id,
        amount: form.amount,
        month,
        year,
    })
}

/// Build the duplicate budget error naming the category and month, e.g.
/// "Food & Dining for June 2025".
pub(super) fn duplicate_budget_error(
    category_id: &str,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Error {
    let category_name = get_category(category_id, connection)
        .map(|category| category.name)
        .unwrap_or_else(|_| category_id.to_owned());

    Error::DuplicateBudget(format!("{category_name} for {} {year}", month_name(month)))
}
