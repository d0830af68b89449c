//! Defines the route handler for the budget page: budget versus actual
//! spending for a selected month, plus the table of all budgets.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType},
    series::bar,
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    aggregation::{BudgetComparison, budget_comparison},
    budget::{Budget, get_all_budgets},
    category::{Category, category_display_color, category_display_name, get_all_categories},
    chart::{ECHARTS_SCRIPT, PageChart, charts_script, currency_formatter, currency_tooltip},
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, color_dot, edit_delete_action_links,
        format_currency,
    },
    month::{current_month_year, format_month_input, month_name, parse_month_input, recent_months,
        short_month_name},
    navigation::NavBar,
    transaction::get_all_transactions,
};

/// The number of months offered by the chart's month selector, ending at the
/// current month.
const MONTH_SELECTOR_COUNT: usize = 6;

/// The query parameters for the budget page.
#[derive(Debug, Deserialize)]
pub struct BudgetPageQuery {
    /// The month selected for the budget versus actual chart, as YYYY-MM.
    pub month: Option<String>,
}

/// The state needed for the budget page.
#[derive(Debug, Clone)]
pub struct BudgetViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget page.
///
/// A missing or unparseable month query falls back to the current month.
pub async fn get_budget_page(
    State(state): State<BudgetViewState>,
    Query(query): Query<BudgetPageQuery>,
) -> Result<Response, Error> {
    let (month, year) = query
        .month
        .as_deref()
        .and_then(|raw| parse_month_input(raw).ok())
        .unwrap_or_else(current_month_year);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_all_budgets(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let comparisons = budget_comparison(&budgets, &transactions, month, year);

    Ok(budget_view(&budgets, &comparisons, &categories, month, year).into_response())
}

fn budget_view(
    budgets: &[Budget],
    comparisons: &[BudgetComparison],
    categories: &[Category],
    month: u8,
    year: i32,
) -> Markup {
    let new_budget_route = endpoints::NEW_BUDGET_VIEW;
    let nav_bar = NavBar::new(endpoints::BUDGET_VIEW).into_html();
    let sorted_budgets = sort_budgets_for_table(budgets, categories);

    let charts = if comparisons.is_empty() {
        vec![]
    } else {
        vec![PageChart {
            id: "budget-vs-actual-chart",
            options: comparison_chart(comparisons, categories, month, year).to_string(),
        }]
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budget" }

                    a href=(new_budget_route) class=(LINK_STYLE)
                    {
                        "Create Budget"
                    }
                }

                section class="w-full lg:max-w-5xl lg:mx-auto space-y-2"
                {
                    (month_selector(month, year))

                    @for chart in &charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }

                    @if charts.is_empty() {
                        p
                            data-empty-state="true"
                            class="rounded border border-dashed border-gray-300 bg-white
                                px-4 py-12 text-center text-sm text-gray-500
                                dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                        {
                            "No budget data available for this month."
                        }
                    }
                }

                (budget_cards_view(&sorted_budgets, categories))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Month"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Category"
                                }
                                th scope="col" class="px-6 py-3 text-right"
                                {
                                    "Amount"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for budget in &sorted_budgets {
                                (budget_row_view(budget, categories))
                            }

                            @if sorted_budgets.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No budgets set. "
                                        a href=(new_budget_route) class=(LINK_STYLE)
                                        {
                                            "Create your first budget"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    let head_elements = if charts.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Budget", &head_elements, &content)
}

/// Render links for the current month and the five preceding months, oldest
/// first, with the selected month highlighted.
fn month_selector(selected_month: u8, selected_year: i32) -> Markup {
    let (current_month, current_year) = current_month_year();
    let options = recent_months(current_month, current_year, MONTH_SELECTOR_COUNT);

    html!(
        nav id="month-selector" class="flex flex-wrap gap-2"
        {
            @for (month, year) in options {
                @if (month, year) == (selected_month, selected_year) {
                    span
                        aria-current="page"
                        class="rounded px-3 py-1 text-sm font-bold
                            bg-blue-600 text-white"
                    {
                        (short_month_name(month)) " " (year)
                    }
                } @else {
                    a
                        href={ (endpoints::BUDGET_VIEW) "?month=" (format_month_input(month, year)) }
                        class="rounded px-3 py-1 text-sm text-blue-600
                            hover:underline dark:text-blue-400"
                    {
                        (short_month_name(month)) " " (year)
                    }
                }
            }
        }
    )
}

fn comparison_chart(
    comparisons: &[BudgetComparison],
    categories: &[Category],
    month: u8,
    year: i32,
) -> Chart {
    let labels: Vec<String> = comparisons
        .iter()
        .map(|comparison| {
            category_display_name(categories, Some(&comparison.category_id)).to_owned()
        })
        .collect();
    let budgeted: Vec<f64> = comparisons
        .iter()
        .map(|comparison| comparison.budgeted)
        .collect();
    let actual: Vec<f64> = comparisons
        .iter()
        .map(|comparison| comparison.actual)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Budget vs Actual")
                .subtext(format!("{} {year}", month_name(month))),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%").right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(bar::Bar::new().name("Budgeted").data(budgeted))
        .series(bar::Bar::new().name("Actual").data(actual))
}

fn sort_budgets_for_table<'a>(budgets: &'a [Budget], categories: &[Category]) -> Vec<&'a Budget> {
    let mut sorted: Vec<&Budget> = budgets.iter().collect();
    sorted.sort_by(|first, second| {
        (second.year, second.month)
            .cmp(&(first.year, first.month))
            .then_with(|| {
                category_display_name(categories, Some(&first.category_id))
                    .cmp(category_display_name(categories, Some(&second.category_id)))
            })
    });

    sorted
}

fn budget_row_view(budget: &Budget, categories: &[Category]) -> Markup {
    let category_name = category_display_name(categories, Some(&budget.category_id));
    let category_color = category_display_color(categories, Some(&budget.category_id));
    let edit_url = format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = format_endpoint(endpoints::BUDGET, budget.id);
    let confirm_message = budget_delete_confirm_message(category_name, budget);

    html! {
        tr class=(TABLE_ROW_STYLE) data-budget-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                (short_month_name(budget.month)) " " (budget.year)
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (color_dot(category_color))
                    (category_name)
                }
            }
            td class="px-6 py-4 text-right" { (format_currency(budget.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn budget_cards_view(budgets: &[&Budget], categories: &[Category]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for budget in budgets {
                (budget_card(budget, categories))
            }

            @if budgets.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No budgets set. "
                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create your first budget"
                    }
                }
            }
        }
    )
}

fn budget_card(budget: &Budget, categories: &[Category]) -> Markup {
    let category_name = category_display_name(categories, Some(&budget.category_id));
    let category_color = category_display_color(categories, Some(&budget.category_id));
    let edit_url = format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = format_endpoint(endpoints::BUDGET, budget.id);
    let confirm_message = budget_delete_confirm_message(category_name, budget);

    html! {
        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
            data-budget-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (color_dot(category_color))
                    (category_name)
                }
                div class="shrink-0 text-sm tabular-nums text-right whitespace-nowrap text-gray-900 dark:text-white"
                { (format_currency(budget.amount)) }
            }

            div class="mt-2 flex items-center justify-between gap-3 text-xs text-gray-500 dark:text-gray-400"
            {
                span { (short_month_name(budget.month)) " " (budget.year) }

                div class="flex items-center gap-4 text-sm text-gray-900 dark:text-white"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest [data-budget-card='true']",
                        "outerHTML",
                    ))
                }
            }
        }
    }
}

fn budget_delete_confirm_message(category_name: &str, budget: &Budget) -> String {
    format!(
        "Are you sure you want to delete the {category_name} budget for {} {}? This cannot be undone.",
        month_name(budget.month),
        budget.year
    )
}

#[cfg(test)]
mod budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        budget::{
            NewBudget,
            budget_page::{BudgetPageQuery, BudgetViewState, get_budget_page},
            create_budget,
        },
        db::initialize,
        month::current_month_year,
        transaction::{Transaction, create_transaction},
    };

    fn get_test_state() -> BudgetViewState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        BudgetViewState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn insert_budget(state: &BudgetViewState, category_id: &str, amount: f64, month: u8, year: i32) {
        let connection = state.db_connection.lock().unwrap();
        create_budget(
            NewBudget {
                category_id: category_id.to_owned(),
                amount,
                month,
                year,
            },
            &connection,
        )
        .unwrap();
    }

    async fn render_page(state: BudgetViewState, month: Option<String>) -> Html {
        let response = get_budget_page(State(state), Query(BudgetPageQuery { month }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        parse_html(response).await
    }

    async fn parse_html(response: Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn budget_page_shows_chart_and_table() {
        let state = get_test_state();
        let (month, year) = current_month_year();
        insert_budget(&state, "food", 400.0, month, year);
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(-120.0, "groceries", month, year)
                    .category_id(Some("food".to_owned())),
                &connection,
            )
            .unwrap();
        }

        let document = render_page(state, None).await;

        let chart_selector = Selector::parse("#budget-vs-actual-chart").unwrap();
        assert!(
            document.select(&chart_selector).next().is_some(),
            "want a chart container for the current month's budgets"
        );

        let row_selector = Selector::parse("tr[data-budget-row]").unwrap();
        let rows: Vec<_> = document.select(&row_selector).collect();
        assert_eq!(rows.len(), 1, "want 1 budget row, got {}", rows.len());

        let row_text: String = rows[0].text().collect();
        assert!(row_text.contains("Food & Dining"));
        assert!(row_text.contains("$400.00"));
    }

    #[tokio::test]
    async fn budget_page_without_budgets_shows_empty_states() {
        let state = get_test_state();

        let document = render_page(state, None).await;

        let chart_selector = Selector::parse("#budget-vs-actual-chart").unwrap();
        assert!(
            document.select(&chart_selector).next().is_none(),
            "want no chart container without budget data"
        );

        let empty_selector = Selector::parse("[data-empty-state]").unwrap();
        let empty_states: Vec<String> = document
            .select(&empty_selector)
            .map(|element| element.text().collect())
            .collect();
        assert!(
            empty_states
                .iter()
                .any(|text| text.contains("No budget data available for this month."))
        );
        assert!(
            empty_states
                .iter()
                .any(|text| text.contains("No budgets set."))
        );
    }

    #[tokio::test]
    async fn month_selector_offers_six_months_with_current_selected() {
        let state = get_test_state();

        let document = render_page(state, None).await;

        let link_selector = Selector::parse("#month-selector a").unwrap();
        let selected_selector = Selector::parse("#month-selector span[aria-current=page]").unwrap();
        let link_count = document.select(&link_selector).count();
        let selected_count = document.select(&selected_selector).count();

        assert_eq!(selected_count, 1, "want the current month highlighted");
        assert_eq!(
            link_count + selected_count,
            6,
            "want six month options, got {}",
            link_count + selected_count
        );
    }

    #[tokio::test]
    async fn budgets_table_sorts_newest_month_first_then_category_name() {
        let state = get_test_state();
        insert_budget(&state, "housing", 1200.0, 5, 2025);
        insert_budget(&state, "food", 400.0, 6, 2025);
        insert_budget(&state, "entertainment", 100.0, 6, 2025);

        let document = render_page(state, None).await;

        let row_selector = Selector::parse("tr[data-budget-row]").unwrap();
        let rows: Vec<String> = document
            .select(&row_selector)
            .map(|row| row.text().collect())
            .collect();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("Entertainment"), "got rows {rows:?}");
        assert!(rows[1].contains("Food & Dining"), "got rows {rows:?}");
        assert!(rows[2].contains("Housing"), "got rows {rows:?}");
    }

    #[tokio::test]
    async fn selected_month_drives_the_chart() {
        let state = get_test_state();
        insert_budget(&state, "housing", 1200.0, 3, 2025);

        let document = render_page(state, Some("2025-03".to_owned())).await;

        let chart_selector = Selector::parse("#budget-vs-actual-chart").unwrap();
        assert!(document.select(&chart_selector).next().is_some());

        let script_selector = Selector::parse("script").unwrap();
        let has_march_subtext = document.select(&script_selector).any(|script| {
            let text: String = script.text().collect();
            text.contains("March 2025")
        });
        assert!(
            has_march_subtext,
            "want the chart subtext to name the selected month"
        );
    }

    #[tokio::test]
    async fn rows_have_edit_and_delete_actions() {
        let state = get_test_state();
        insert_budget(&state, "food", 400.0, 6, 2025);

        let document = render_page(state, None).await;

        let edit_selector = Selector::parse("a[href='/budget/1/edit']").unwrap();
        assert!(
            document.select(&edit_selector).next().is_some(),
            "want an edit link for budget 1"
        );

        let delete_selector = Selector::parse("button[hx-delete='/api/budgets/1']").unwrap();
        let delete_button = document
            .select(&delete_selector)
            .next()
            .expect("want a delete button for budget 1");
        assert_eq!(delete_button.attr("hx-target"), Some("closest tr"));
        assert!(delete_button.attr("hx-confirm").is_some());
    }
}
