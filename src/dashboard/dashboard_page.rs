//! Defines the route handler for the dashboard page.
//!
//! The dashboard summarizes the current month in stat cards, charts spending
//! by category and by month, and lists the most recent transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{category_totals, monthly_expenses},
    category::{Category, get_all_categories},
    chart::{ECHARTS_SCRIPT, PageChart, charts_script},
    dashboard::{
        cards::{StatCard, build_stat_cards, stat_cards_view},
        charts::{monthly_spending_chart, spending_by_category_chart},
        tables::recent_transactions_table,
    },
    endpoints,
    html::{HeadElement, base, link},
    month::current_month_year,
    navigation::NavBar,
    transaction::{Transaction, get_all_transactions},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The dashboard charts, `None` where the underlying data is empty.
struct DashboardCharts {
    spending_by_category: Option<PageChart>,
    monthly_spending: Option<PageChart>,
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let (month, year) = current_month_year();
    let cards = build_stat_cards(&transactions, month, year);
    let charts = build_dashboard_charts(&transactions, &categories);

    Ok(dashboard_view(nav_bar, &cards, &charts, &transactions, &categories).into_response())
}

/// Build the dashboard charts from transaction data.
///
/// Income-only data produces no expense totals, so each chart is built only
/// when it has something to show.
fn build_dashboard_charts(
    transactions: &[Transaction],
    categories: &[Category],
) -> DashboardCharts {
    let totals = category_totals(categories, transactions);
    let monthly_totals = monthly_expenses(transactions);

    let has_spending = totals.iter().any(|entry| entry.total > 0.0);
    let spending_by_category = has_spending.then(|| PageChart {
        id: "spending-by-category-chart",
        options: spending_by_category_chart(&totals, categories).to_string(),
    });
    let monthly_spending = (!monthly_totals.is_empty()).then(|| PageChart {
        id: "monthly-spending-chart",
        options: monthly_spending_chart(&monthly_totals).to_string(),
    });

    DashboardCharts {
        spending_by_category,
        monthly_spending,
    }
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "add your first transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you add some transactions.
                Go ahead and " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with stat cards, charts, and the recent
/// transactions table.
fn dashboard_view(
    nav_bar: NavBar,
    cards: &[StatCard],
    charts: &DashboardCharts,
    transactions: &[Transaction],
    categories: &[Category],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            section class="w-full mx-auto mb-4"
            {
                h1 class="text-xl font-bold mb-4" { "Dashboard" }

                (stat_cards_view(cards))
            }

            section
                id="charts"
                class="w-full mx-auto mb-8"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (chart_cell(
                        &charts.spending_by_category,
                        "No spending data available",
                        "Add some transactions to see your spending breakdown",
                    ))

                    (chart_cell(
                        &charts.monthly_spending,
                        "No monthly data available",
                        "Add some transactions to see your monthly spending",
                    ))
                }
            }

            (recent_transactions_table(transactions, categories))
        }
    );

    let active_charts: Vec<PageChart> = [&charts.spending_by_category, &charts.monthly_spending]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    let scripts = if active_charts.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            charts_script(&active_charts),
        ]
    };

    base("Dashboard", &scripts, &content)
}

/// Renders a chart container, or an empty-state message when the chart has no
/// data.
fn chart_cell(chart: &Option<PageChart>, empty_title: &str, empty_hint: &str) -> Markup {
    html! {
        @match chart {
            Some(chart) => {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
            None => {
                div
                    data-empty-state="true"
                    class="min-h-[380px] rounded border border-dashed
                        border-gray-300 bg-white flex flex-col items-center
                        justify-center text-center dark:border-gray-700
                        dark:bg-gray-800"
                {
                    p class="text-gray-500 dark:text-gray-400" { (empty_title) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (empty_hint) }
                }
            }
        }
    }
}
