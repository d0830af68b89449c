//! Alerts for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that htmx swaps into the alert
//! container at the bottom of the page. Dismissal is handled by app.js.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message to display to the user in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra detail text.
    Success { message: String, details: String },
    /// A success message with no detail text.
    SuccessSimple { message: String },
    /// An error message with extra detail text.
    Error { message: String, details: String },
    /// An error message with no detail text.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        match self {
            Alert::Success { message, details } => alert_html(false, &message, &details),
            Alert::SuccessSimple { message } => alert_html(false, &message, ""),
            Alert::Error { message, details } => alert_html(true, &message, &details),
            Alert::ErrorSimple { message } => alert_html(true, &message, ""),
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

// Template adapted from https://flowbite.com/docs/components/alerts/
fn alert_html(is_error: bool, message: &str, details: &str) -> Markup {
    let (container_style, button_style) = if is_error {
        (
            "flex items-start p-4 mb-4 text-red-800 rounded-lg bg-red-50 shadow-lg \
            dark:bg-gray-800 dark:text-red-400",
            "ms-auto -mx-1.5 -my-1.5 bg-red-50 text-red-500 rounded-lg focus:ring-2 \
            focus:ring-red-400 p-1.5 hover:bg-red-200 inline-flex items-center justify-center \
            h-8 w-8 dark:bg-gray-800 dark:text-red-400 dark:hover:bg-gray-700",
        )
    } else {
        (
            "flex items-start p-4 mb-4 text-green-800 rounded-lg bg-green-50 shadow-lg \
            dark:bg-gray-800 dark:text-green-400",
            "ms-auto -mx-1.5 -my-1.5 bg-green-50 text-green-500 rounded-lg focus:ring-2 \
            focus:ring-green-400 p-1.5 hover:bg-green-200 inline-flex items-center \
            justify-center h-8 w-8 dark:bg-gray-800 dark:text-green-400 dark:hover:bg-gray-700",
        )
    };

    html!(
        div class=(container_style) role="alert" {
            svg
                class="shrink-0 w-4 h-4 mt-0.5"
                aria-hidden="true"
                xmlns="http://www.w3.org/2000/svg"
                fill="currentColor"
                viewBox="0 0 20 20"
            {
                path d="M10 .5a9.5 9.5 0 1 0 9.5 9.5A9.51 9.51 0 0 0 10 .5ZM9.5 4a1.5 1.5 0 1 1 0 3 1.5 1.5 0 0 1 0-3ZM12 15H8a1 1 0 0 1 0-2h1v-3H8a1 1 0 0 1 0-2h2a1 1 0 0 1 1 1v4h1a1 1 0 0 1 0 2Z" {}
            }
            div class="ms-3 text-sm" {
                p class="font-medium" { (message) }
                @if !details.is_empty() {
                    p class="mt-1" { (details) }
                }
            }
            button
                type="button"
                class=(button_style)
                data-dismiss-alert
                aria-label="Close"
            {
                span class="sr-only" { "Close" }
                svg
                    class="w-3 h-3"
                    aria-hidden="true"
                    xmlns="http://www.w3.org/2000/svg"
                    fill="none"
                    viewBox="0 0 14 14"
                {
                    path
                        stroke="currentColor"
                        stroke-linecap="round"
                        stroke-linejoin="round"
                        stroke-width="2"
                        d="m1 1 6 6m0 0 6 6M7 7l6-6M7 7l-6 6" {}
                }
            }
        }
    )
}
