//! Helpers for parsing and checking rendered HTML in handler tests.

use axum::{body::Body, response::Response};
use scraper::Html;

async fn response_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read the response body");

    String::from_utf8_lossy(&body).into_owned()
}

/// Parses a whole-page response, i.e. anything rendered through the base
/// document template.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parses a fragment response such as an alert or a swapped-in form.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "HTML did not parse cleanly: {:?}",
        html.errors
    );
}
