//! The 404 page shown for URLs that do not match any route.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A response carrying the rendered 404 page.
pub struct NotFoundError;

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        let page = error_view(
            "Not Found",
            "404",
            "Sorry, we can't find that page.",
            "Check the URL or head back to the dashboard.",
        );

        (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
    }
}

/// The fallback handler for unmatched routes.
pub async fn get_404_not_found() -> Response {
    NotFoundError.into_response()
}
