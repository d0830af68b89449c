//! Stat cards summarizing the current month at the top of the dashboard.

use maud::{Markup, html};

use crate::{
    aggregation::{total_expenses, total_income},
    html::format_currency,
    month::{month_name, previous_month},
    transaction::Transaction,
};

/// Direction of a stat card's trend pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trend {
    Up,
    Down,
    Neutral,
}

/// One summary figure shown at the top of the dashboard.
#[derive(Debug)]
pub(super) struct StatCard {
    pub title: String,
    pub value: String,
    /// Extra line under the value, rendered as a pill colored by direction.
    pub trend: Option<(Trend, String)>,
    /// Plain secondary line under the value.
    pub description: Option<String>,
}

/// Summarize the given month: expenses with the change from the month before,
/// income, balance, and the share of income spent.
pub(super) fn build_stat_cards(
    transactions: &[Transaction],
    month: u8,
    year: i32,
) -> [StatCard; 4] {
    let expenses = total_expenses(transactions, Some(month), Some(year));
    let income = total_income(transactions, Some(month), Some(year));
    let balance = income - expenses;

    let (last_month, last_month_year) = previous_month(month, year);
    let last_month_expenses = total_expenses(transactions, Some(last_month), Some(last_month_year));
    let expense_change = if last_month_expenses > 0.0 {
        (expenses - last_month_expenses) / last_month_expenses * 100.0
    } else {
        0.0
    };
    let expense_trend = if expense_change > 0.0 {
        Trend::Up
    } else if expense_change < 0.0 {
        Trend::Down
    } else {
        Trend::Neutral
    };

    // The balance and budget status cards are ratios against income, which
    // can legitimately be zero. Skip the ratio instead of dividing by zero.
    let balance_trend = (income > 0.0).then(|| {
        (
            if balance > 0.0 { Trend::Up } else { Trend::Down },
            format!("{:.1}% of income", (balance / income * 100.0).abs()),
        )
    });
    let income_share_spent = if income > 0.0 && expenses > 0.0 {
        format!("{:.0}%", expenses / income * 100.0)
    } else {
        "0%".to_owned()
    };

    [
        StatCard {
            title: format!("{} Expenses", month_name(month)),
            value: format_currency(expenses),
            trend: Some((
                expense_trend,
                format!("{:.1}% vs last month", expense_change.abs()),
            )),
            description: None,
        },
        StatCard {
            title: format!("{} Income", month_name(month)),
            value: format_currency(income),
            trend: None,
            description: None,
        },
        StatCard {
            title: "Balance".to_owned(),
            value: format_currency(balance),
            trend: balance_trend,
            description: None,
        },
        StatCard {
            title: "Budget Status".to_owned(),
            value: income_share_spent,
            trend: None,
            description: Some("of income spent this month".to_owned()),
        },
    ]
}

/// Render the stat card grid.
pub(super) fn stat_cards_view(cards: &[StatCard]) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-4 gap-4"
        {
            @for card in cards {
                (stat_card(card))
            }
        }
    }
}

fn stat_card(card: &StatCard) -> Markup {
    html! {
        div
            data-stat-card="true"
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-1"
            {
                (card.title)
            }

            div class="text-3xl font-bold" { (card.value) }

            @if let Some(description) = &card.description {
                p class="text-xs text-gray-600 dark:text-gray-400 mt-1" { (description) }
            }

            @if let Some((direction, text)) = &card.trend {
                div class={
                    "text-xs font-medium mt-2 inline-flex items-center
                        rounded-sm px-1.5 py-0.5 "
                    (trend_style(*direction))
                }
                {
                    (trend_arrow(*direction)) (text)
                }
            }
        }
    }
}

fn trend_style(direction: Trend) -> &'static str {
    match direction {
        Trend::Up => "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300",
        Trend::Down => "text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300",
        Trend::Neutral => "text-gray-800 bg-gray-100 dark:bg-gray-700 dark:text-gray-300",
    }
}

fn trend_arrow(direction: Trend) -> &'static str {
    match direction {
        Trend::Up => "↑ ",
        Trend::Down => "↓ ",
        Trend::Neutral => "",
    }
}
