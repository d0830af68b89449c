//! The recent transactions table shown at the bottom of the dashboard.

use maud::{Markup, html};

use crate::{
    category::{Category, category_display_color, category_display_name},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        color_dot, format_currency,
    },
    month::short_month_name,
    transaction::Transaction,
};

/// Number of transactions shown on the dashboard.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// Render the most recent transactions with a link to the full list.
///
/// Expects `transactions` sorted newest first, as returned by
/// [get_all_transactions](crate::transaction::get_all_transactions).
pub(super) fn recent_transactions_table(
    transactions: &[Transaction],
    categories: &[Category],
) -> Markup {
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTION_COUNT)];

    html! {
        section class="w-full mx-auto"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Recent Transactions" }

                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="dark:bg-gray-800"
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
                        }
                    }

                    tbody
                    {
                        @for transaction in recent {
                            (recent_transaction_row(transaction, categories))
                        }
                    }
                }
            }
        }
    }
}

fn recent_transaction_row(transaction: &Transaction, categories: &[Category]) -> Markup {
    let amount_style = if transaction.amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    };
    let category_id = transaction.category_id.as_deref();
    let category_name = category_display_name(categories, category_id);
    let category_color = category_display_color(categories, category_id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-recent-transaction="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                (short_month_name(transaction.month)) " " (transaction.year)
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (color_dot(category_color))
                    (category_name)
                }
            }
            td class={ "px-6 py-4 text-right " (amount_style) }
            {
                (format_currency(transaction.amount))
            }
        }
    }
}

#[cfg(test)]
mod recent_transactions_tests {
    use crate::{category::Category, transaction::Transaction};

    use super::recent_transactions_table;

    fn create_transaction(id: i64, amount: f64, description: &str) -> Transaction {
        Transaction {
            id,
            amount,
            description: description.to_owned(),
            month: 6,
            year: 2025,
            category_id: Some("food".to_owned()),
        }
    }

    fn test_categories() -> Vec<Category> {
        vec![Category {
            id: "food".to_owned(),
            name: "Food & Dining".to_owned(),
            color: "#F87171".to_owned(),
        }]
    }

    #[test]
    fn shows_at_most_five_rows() {
        let transactions: Vec<Transaction> = (1..=6)
            .map(|id| create_transaction(id, -10.0 * id as f64, &format!("purchase {id}")))
            .collect();

        let html = recent_transactions_table(&transactions, &test_categories()).into_string();

        assert_eq!(html.matches("data-recent-transaction").count(), 5);
    }

    #[test]
    fn keeps_the_given_order() {
        let transactions = vec![
            create_transaction(2, -25.0, "newer purchase"),
            create_transaction(1, -10.0, "older purchase"),
        ];

        let html = recent_transactions_table(&transactions, &test_categories()).into_string();

        let newer_position = html.find("newer purchase").unwrap();
        let older_position = html.find("older purchase").unwrap();
        assert!(newer_position < older_position);
    }

    #[test]
    fn colors_amounts_by_sign() {
        let transactions = vec![
            create_transaction(1, -25.0, "groceries"),
            create_transaction(2, 500.0, "salary"),
        ];

        let html = recent_transactions_table(&transactions, &test_categories()).into_string();

        assert!(html.contains("text-red-700"));
        assert!(html.contains("text-green-700"));
        assert!(html.contains("-$25.00"));
        assert!(html.contains("$500.00"));
    }

    #[test]
    fn links_to_the_full_transactions_page() {
        let html = recent_transactions_table(&[], &test_categories()).into_string();

        assert!(html.contains("href=\"/transactions\""));
        assert!(html.contains("View all"));
    }

    #[test]
    fn unregistered_category_renders_as_unknown() {
        let transactions = vec![Transaction {
            id: 1,
            amount: -12.0,
            description: "mystery".to_owned(),
            month: 6,
            year: 2025,
            category_id: None,
        }];

        let html = recent_transactions_table(&transactions, &test_categories()).into_string();

        assert!(html.contains("Unknown"));
    }
}
