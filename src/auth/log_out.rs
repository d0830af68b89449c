//! The log-out route. Clears the auth cookie and sends the user back to the
//! log-in page.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Expires the auth cookie and redirects to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}
