//! Pure reporting functions over in-memory snapshots of transactions,
//! budgets and categories.
//!
//! Expenses are stored as negative amounts and income as positive amounts.
//! Every function here reports expenses as positive magnitudes (the absolute
//! value of the negative amounts), which is what the tables and charts
//! display. Nothing in this module touches the database: callers load a
//! snapshot and hand in slices.

use std::collections::HashMap;

use crate::{
    budget::Budget,
    category::{Category, CategoryId},
    transaction::Transaction,
};

/// The total spent against a single category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    /// Sum of the absolute values of the category's expenses.
    pub total: f64,
}

/// The total spent in a single calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// Calendar month, 1-12.
    pub month: u8,
    /// Sum of the absolute values of the month's expenses.
    pub total: f64,
}

/// How much was budgeted versus actually spent for one category in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetComparison {
    pub category_id: CategoryId,
    pub budgeted: f64,
    pub actual: f64,
}

/// Calculate the total spent against each category.
///
/// Every category appears exactly once, in the order of `categories`, with a
/// total of zero if nothing was spent against it. Transactions whose category
/// does not appear in `categories` (including transactions with no category)
/// are ignored.
///
/// # Arguments
/// * `categories` - The categories to report on, in display order.
/// * `transactions` - The transactions to total. Only expenses count.
pub fn category_totals(
    categories: &[Category],
    transactions: &[Transaction],
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.amount >= 0.0 {
            continue;
        }

        if let Some(category_id) = transaction.category_id.as_deref() {
            *totals.entry(category_id).or_insert(0.0) += transaction.amount.abs();
        }
    }

    categories
        .iter()
        .map(|category| CategoryTotal {
            category_id: category.id.clone(),
            total: totals.get(category.id.as_str()).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Calculate the total spent in each calendar month.
///
/// Months are numbered 1-12 and returned in chronological order. Transactions
/// from different years land in the same month bucket. Months with no
/// expenses are omitted.
pub fn monthly_expenses(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    collect_monthly_totals(transactions, |_| true)
}

/// Calculate the total spent in each calendar month against one category.
///
/// Same shape as [monthly_expenses], restricted to transactions whose
/// category is `category_id`.
pub fn monthly_category_expenses(
    transactions: &[Transaction],
    category_id: &str,
) -> Vec<MonthlyTotal> {
    collect_monthly_totals(transactions, |transaction| {
        transaction.category_id.as_deref() == Some(category_id)
    })
}

fn collect_monthly_totals(
    transactions: &[Transaction],
    filter: impl Fn(&Transaction) -> bool,
) -> Vec<MonthlyTotal> {
    let mut totals: HashMap<u8, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.amount >= 0.0 || !filter(transaction) {
            continue;
        }

        *totals.entry(transaction.month).or_insert(0.0) += transaction.amount.abs();
    }

    let mut months: Vec<u8> = totals.keys().copied().collect();
    months.sort_unstable();

    months
        .into_iter()
        .map(|month| MonthlyTotal {
            month,
            total: totals[&month],
        })
        .collect()
}

/// Compare each budget for the given month and year against what was
/// actually spent.
///
/// Only budgets whose month and year match are reported, in the order they
/// appear in `budgets`. The actual figure sums the expenses in the budget's
/// category during that same month and year, so spending from other months
/// or years never counts against a budget.
///
/// # Arguments
/// * `budgets` - All budgets. Budgets for other periods are skipped.
/// * `transactions` - The transactions to total. Only expenses count.
/// * `month` - Calendar month, 1-12.
/// * `year` - Calendar year.
pub fn budget_comparison(
    budgets: &[Budget],
    transactions: &[Transaction],
    month: u8,
    year: i32,
) -> Vec<BudgetComparison> {
    budgets
        .iter()
        .filter(|budget| budget.month == month && budget.year == year)
        .map(|budget| {
            let actual = transactions
                .iter()
                .filter(|transaction| {
                    transaction.amount < 0.0
                        && transaction.month == month
                        && transaction.year == year
                        && transaction.category_id.as_deref() == Some(budget.category_id.as_str())
                })
                .map(|transaction| transaction.amount.abs())
                .sum();

            BudgetComparison {
                category_id: budget.category_id.clone(),
                budgeted: budget.amount,
                actual,
            }
        })
        .collect()
}

/// Calculate the total spent, optionally restricted to a month and/or year.
///
/// # Returns
/// The sum of the absolute values of the matching expenses.
pub fn total_expenses(transactions: &[Transaction], month: Option<u8>, year: Option<i32>) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.amount < 0.0 && matches_period(transaction, month, year))
        .map(|transaction| transaction.amount.abs())
        .sum()
}

/// Calculate the total income, optionally restricted to a month and/or year.
pub fn total_income(transactions: &[Transaction], month: Option<u8>, year: Option<i32>) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.amount > 0.0 && matches_period(transaction, month, year))
        .map(|transaction| transaction.amount)
        .sum()
}

fn matches_period(transaction: &Transaction, month: Option<u8>, year: Option<i32>) -> bool {
    month.is_none_or(|month| transaction.month == month)
        && year.is_none_or(|year| transaction.year == year)
}
