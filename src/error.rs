//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The password provided does not match the registered password.
    #[error("invalid password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The category ID used to create a transaction or budget did not match a
    /// registered category.
    #[error("the category ID does not refer to a registered category")]
    InvalidCategory(Option<CategoryId>),

    /// A month outside 1-12 was used to create a transaction or budget.
    #[error("{0} is not a calendar month, months run from 1 to 12")]
    InvalidMonth(u8),

    /// A month input string could not be parsed as YYYY-MM.
    #[error("could not parse \"{0}\" as a month in the format YYYY-MM")]
    InvalidMonthInput(String),

    /// A zero amount was used to create a transaction.
    ///
    /// The sign of the amount is what classifies a transaction as an expense
    /// or income, and zero is neither.
    #[error("transaction amounts must be non-zero")]
    ZeroAmount,

    /// A description shorter than two characters was used to create a
    /// transaction.
    #[error("transaction descriptions must be at least 2 characters long")]
    DescriptionTooShort,

    /// A negative amount was used to create a budget.
    ///
    /// Budgets are spending ceilings, so they cannot be negative.
    #[error("budget amounts must be zero or more")]
    NegativeBudgetAmount,

    /// A budget already exists for the same category and month.
    ///
    /// The string should name the category and month, e.g. "Food for June 2025".
    #[error("a budget for {0} already exists in the database")]
    DuplicateBudget(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: match category_id {
                        Some(category_id) => {
                            format!("\"{category_id}\" is not a category you can pick here.")
                        }
                        None => "Pick one of the listed categories.".to_owned(),
                    },
                },
            ),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month".to_owned(),
                    details: format!("{month} is not a calendar month. Months run from 1 to 12."),
                },
            ),
            Error::InvalidMonthInput(input) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month".to_owned(),
                    details: format!(
                        "Could not read \"{input}\" as a month. Use the format YYYY-MM."
                    ),
                },
            ),
            Error::ZeroAmount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: "Transaction amounts must be non-zero. Use negative amounts \
                    for expenses and positive amounts for income."
                        .to_owned(),
                },
            ),
            Error::DescriptionTooShort => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid description".to_owned(),
                    details: "Transaction descriptions must be at least 2 characters long."
                        .to_owned(),
                },
            ),
            Error::NegativeBudgetAmount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget amount".to_owned(),
                    details: "Budget amounts must be zero or more.".to_owned(),
                },
            ),
            Error::DuplicateBudget(which) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate budget".to_owned(),
                    details: format!(
                        "A budget for {which} already exists in the database. \
                        Edit or delete the existing budget.",
                    ),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update budget".to_owned(),
                    details: "The budget could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget".to_owned(),
                    details: "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
