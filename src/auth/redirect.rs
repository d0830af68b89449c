//! Builds the log-in URLs that send an unauthenticated user back to the page
//! they originally asked for.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

// Same-site paths only, and never the log-in page itself since that would
// redirect in a loop.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Validate a redirect URL from user input, keeping only same-site paths.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

// `HX-Current-URL` holds a full URL; only its path and query survive.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Build the log-in page URL carrying the request's own URL as the redirect
/// target, so the client lands back where they started after logging in.
///
/// For page requests the target comes from the request URI. API requests are
/// made by htmx from some page, so the target comes from the `HX-Current-URL`
/// header instead.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        redirect_target_from_request_uri(request)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();

    normalize_redirect_url(path_and_query)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();

    let is_hx_request = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|value| value.to_str().ok())
    else {
        warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = normalize_hx_current_url(current_url);

    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
