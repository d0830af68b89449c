//! Dashboard module
//!
//! Provides an overview page with stat cards for the current month, spending
//! charts, and the most recent transactions.

mod cards;
mod charts;
mod dashboard_page;
mod tables;

pub use dashboard_page::get_dashboard_page;
