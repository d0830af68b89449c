//! Budget management for the budgeting application.
//!
//! This module contains everything related to monthly budgets:
//! - The `Budget` model and database functions for storing budgets
//! - One budget per category per month, enforced on create and update
//! - View handlers for the budget pages and form endpoints

mod budget_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;

pub use budget_page::get_budget_page;
pub use core::{
    Budget, BudgetUpdate, NewBudget, create_budget, create_budget_table, delete_budget,
    find_conflicting_budget, get_all_budgets, get_budget, update_budget,
};
pub use create_endpoint::create_budget_endpoint;
pub use create_page::get_create_budget_page;
pub use delete_endpoint::delete_budget_endpoint;
pub use edit_endpoint::update_budget_endpoint;
pub use edit_page::get_edit_budget_page;
