//! Defines the route handler for the page for editing an existing budget.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::{
        Budget,
        core::get_budget,
        form::{BudgetFormDefaults, budget_form_fields},
    },
    category::{Category, get_all_categories},
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    internal_server_error::InternalServerError,
    navigation::NavBar,
    not_found::NotFoundError,
};

fn edit_budget_view(budget: &Budget, categories: &[Category]) -> Markup {
    let update_route = format_endpoint(endpoints::BUDGET, budget.id);
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = budget_form_fields(
        &BudgetFormDefaults {
            category_id: Some(&budget.category_id),
            amount: Some(budget.amount),
            month: budget.month,
            year: budget.year,
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
                h2 class="text-xl font-bold" { "Edit Budget" }

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

    base("Edit Budget", &[dollar_input_styles()], &content)
}

/// The state needed for the edit budget page.
#[derive(Debug, Clone)]
pub struct EditBudgetPageState {
    /// The database connection for accessing budgets and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing the budget `budget_id`.
///
/// Responds with the 404 page if the budget does not exist.
pub async fn get_edit_budget_page(
    State(state): State<EditBudgetPageState>,
    Path(budget_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return InternalServerError::default().into_response();
        }
    };

    let budget = match get_budget(budget_id, &connection) {
        Ok(budget) => budget,
        Err(Error::NotFound) => {
            return NotFoundError.into_response();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
            return InternalServerError::default().into_response();
        }
    };

    let categories = match get_all_categories(&connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories for edit budget page: {error}");
            return InternalServerError::default().into_response();
        }
    };

    edit_budget_view(&budget, &categories).into_response()
}

#[cfg(test)]
mod view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        budget::{
            NewBudget, create_budget,
            edit_page::{EditBudgetPageState, get_edit_budget_page},
        },
        db::initialize,
    };

    fn get_test_state() -> EditBudgetPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        EditBudgetPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn parse_html(response: Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn edit_page_prefills_form_with_stored_values() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_budget(
                NewBudget {
                    category_id: "housing".to_owned(),
                    amount: 1750.0,
                    month: 3,
                    year: 2025,
                },
                &connection,
            )
            .unwrap();
        }

        let response = get_edit_budget_page(State(state), Path(1)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html(response).await;

        let form_selector = scraper::Selector::parse("form").unwrap();
        let form = document.select(&form_selector).next().expect("want a form");
        assert_eq!(form.value().attr("hx-put"), Some("/api/budgets/1"));

        let checked_radio =
            scraper::Selector::parse("input[type=radio][name=category_id][checked]").unwrap();
        let checked: Vec<_> = document
            .select(&checked_radio)
            .filter_map(|radio| radio.value().attr("value"))
            .collect();
        assert_eq!(checked, vec!["housing"], "want the stored category checked");

        let amount_selector = scraper::Selector::parse("input[name=amount]").unwrap();
        let amount = document
            .select(&amount_selector)
            .next()
            .expect("want an amount input");
        assert_eq!(amount.value().attr("value"), Some("1750.00"));

        let month_selector = scraper::Selector::parse("input[name=month]").unwrap();
        let month = document
            .select(&month_selector)
            .next()
            .expect("want a month input");
        assert_eq!(month.value().attr("value"), Some("2025-03"));
    }

    #[tokio::test]
    async fn edit_page_returns_404_for_missing_budget() {
        let state = get_test_state();

        let response = get_edit_budget_page(State(state), Path(999)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
