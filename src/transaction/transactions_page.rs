//! Defines the route handler for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    category::{Category, category_display_color, category_display_name, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, color_dot, edit_delete_action_links,
        format_currency,
    },
    month::short_month_name,
    navigation::NavBar,
    transaction::{Transaction, get_all_transactions},
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transactions listing page, newest months first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(transactions_view(&transactions, &categories).into_response())
}

fn transactions_view(transactions: &[Transaction], categories: &[Category]) -> Markup {
    let new_transaction_route = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_route) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (transaction_cards_view(transactions, categories))

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
                                    "Description"
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
                            @for transaction in transactions {
                                (transaction_row_view(transaction, categories))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions yet. "
                                        a href=(new_transaction_route) class=(LINK_STYLE)
                                        {
                                            "Create your first transaction"
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

    base("Transactions", &[], &content)
}

fn transaction_row_view(transaction: &Transaction, categories: &[Category]) -> Markup {
    let amount_str = format_currency(transaction.amount);
    let amount_style = amount_class(transaction.amount);
    let (description, tooltip) = format_description(&transaction.description);
    let category_id = transaction.category_id.as_deref();
    let category_name = category_display_name(categories, category_id);
    let category_color = category_display_color(categories, category_id);
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                (short_month_name(transaction.month)) " " (transaction.year)
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (color_dot(category_color))
                    (category_name)
                }
            }
            td class={ "px-6 py-4 text-right " (amount_style) } { (amount_str) }
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

fn transaction_cards_view(transactions: &[Transaction], categories: &[Category]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for transaction in transactions {
                (transaction_card(transaction, categories))
            }

            @if transactions.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No transactions yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create your first transaction"
                    }
                }
            }
        }
    )
}

fn transaction_card(transaction: &Transaction, categories: &[Category]) -> Markup {
    let amount_style = amount_class(transaction.amount);
    let category_id = transaction.category_id.as_deref();
    let category_name = category_display_name(categories, category_id);
    let category_color = category_display_color(categories, category_id);
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
            data-transaction-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                div class="min-w-0 flex-1 truncate text-sm font-medium text-gray-900 dark:text-white"
                    title=(transaction.description)
                { (transaction.description) }
                div class={ "shrink-0 text-sm tabular-nums text-right whitespace-nowrap " (amount_style) }
                { (format_currency(transaction.amount)) }
            }

            div class="mt-2 flex items-center justify-between gap-3 text-xs text-gray-500 dark:text-gray-400"
            {
                div class="flex items-center gap-2"
                {
                    span class=(CATEGORY_BADGE_STYLE)
                    {
                        (color_dot(category_color))
                        (category_name)
                    }
                    span { (short_month_name(transaction.month)) " " (transaction.year) }
                }

                div class="flex items-center gap-4 text-sm text-gray-900 dark:text-white"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest [data-transaction-card='true']",
                        "outerHTML",
                    ))
                }
            }
        }
    }
}

fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}
