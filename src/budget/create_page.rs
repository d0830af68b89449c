//! Defines the page for creating a new budget.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::form::{BudgetFormDefaults, budget_form_fields},
    category::{Category, get_all_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    month::current_month_year,
    navigation::NavBar,
};

fn create_budget_view(categories: &[Category], month: u8, year: i32) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(
        &BudgetFormDefaults {
            category_id: None,
            amount: None,
            month,
            year,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::BUDGETS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Budget" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Budget"
                }
            }
        }
    };

    base("Create Budget", &[dollar_input_styles()], &content)
}

/// The state needed for the create new budget page.
#[derive(Debug, Clone)]
pub struct CreateBudgetPageState {
    /// The database connection for accessing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a budget.
///
/// The month input defaults to the current month.
pub async fn get_create_budget_page(
    State(state): State<CreateBudgetPageState>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new budget page: {error}")
        })?
    };

    let (month, year) = current_month_year();

    Ok(create_budget_view(&categories, month, year).into_response())
}
