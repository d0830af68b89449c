//! Middleware that fences the app's pages and API routes behind a log-in
//! check.
//!
//! A valid auth cookie lets the request through and has its expiry topped up
//! on the way out. Anything else is bounced to the log-in page with a
//! `redirect_url` query parameter leading back to the page the user wanted.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{
            DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed, get_token_from_cookies,
        },
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
};

/// The slice of application state the auth middleware needs.
#[derive(Clone)]
pub struct AuthState {
    /// Decrypts and signs the private auth cookie.
    pub cookie_key: Key,
    /// How long a freshly issued auth cookie lasts.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Runs the log-in check for a route, delegating redirect creation to
/// `log_in_redirect` so page and htmx routes can answer differently.
async fn run_auth_guard(
    state: AuthState,
    request: Request,
    next: Next,
    log_in_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_url =
        build_log_in_redirect_url(&request).unwrap_or_else(|| fallback_log_in_url(&request));

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read the cookie jar: {error:?}. Redirecting to log in.");
            return log_in_redirect(&log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return log_in_redirect(&log_in_url),
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    append_refreshed_auth_cookie(jar, response)
}

/// The log-in URL used when the request carries nothing usable to come back
/// to. Sends the user to the dashboard after they log in.
fn fallback_log_in_url(request: &Request) -> String {
    if request.uri().path().starts_with("/api") {
        tracing::warn!("No usable HTMX headers on an /api request. Using the dashboard as the post-log-in target.");
    } else {
        tracing::warn!("No usable redirect target in the request URI. Using the dashboard as the post-log-in target.");
    }

    build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

/// Tops the auth cookie expiry back up to at least [DEFAULT_COOKIE_DURATION]
/// and copies the resulting `Set-Cookie` headers onto `response`.
fn append_refreshed_auth_cookie(jar: PrivateCookieJar, response: Response) -> Response {
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), DEFAULT_COOKIE_DURATION) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Could not extend the auth cookie expiry: {error:?}. Keeping the original cookie.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();
    let cookie_response = jar.into_response();
    for value in cookie_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Fences a page route behind the log-in check: requests without a valid auth
/// cookie get a `303 See Other` redirect to the log-in page.
///
/// Handlers behind the guard receive the authenticated user through
/// `Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    run_auth_guard(state, request, next, |log_in_url| {
        Redirect::to(log_in_url).into_response()
    })
    .await
}

/// Fences an htmx API route behind the log-in check: requests without a valid
/// auth cookie get a `200 OK` whose `HX-Redirect` header points at the log-in
/// page.
///
/// Handlers behind the guard receive the authenticated user through
/// `Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    run_auth_guard(state, request, next, |log_in_url| {
        (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Router,
        extract::State,
        http::HeaderValue,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            AuthState, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, auth_guard, auth_guard_hx,
            set_auth_cookie,
        },
        endpoints,
    };

    const ISSUE_COOKIE_ROUTE: &str = "/issue_cookie";
    const PROTECTED_PAGE: &str = "/protected";
    const PROTECTED_API_ROUTE: &str = "/api/protected";

    async fn protected_handler() -> Html<&'static str> {
        Html("<h1>Protected content</h1>")
    }

    async fn issue_cookie(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), state.cookie_duration)
    }

    fn test_state(cookie_duration: Duration) -> AuthState {
        let hash = sha2::Sha512::digest("an auth guard test secret");

        AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
        }
    }

    fn page_server(cookie_duration: Duration) -> TestServer {
        let state = test_state(cookie_duration);
        let app = Router::new()
            .route(PROTECTED_PAGE, get(protected_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(ISSUE_COOKIE_ROUTE, post(issue_cookie))
            .with_state(state);

        TestServer::new(app).expect("could not create the test server")
    }

    fn api_server(cookie_duration: Duration) -> TestServer {
        let state = test_state(cookie_duration);
        let app = Router::new()
            .route(PROTECTED_API_ROUTE, get(protected_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
            .with_state(state);

        TestServer::new(app).expect("could not create the test server")
    }

    #[track_caller]
    fn assert_log_in_redirect(location: HeaderValue, original_url: &str) {
        let query = serde_urlencoded::to_string([("redirect_url", original_url)]).unwrap();

        assert_eq!(location, format!("{}?{}", endpoints::LOG_IN_VIEW, query));
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn valid_cookie_passes_the_guard() {
        let server = page_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(ISSUE_COOKIE_ROUTE).await;
        response.assert_status_ok();

        server
            .get(PROTECTED_PAGE)
            .add_cookie(response.cookie(COOKIE_TOKEN))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn guard_reissues_the_token_cookie() {
        let server = page_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(ISSUE_COOKIE_ROUTE).await;
        response.assert_status_ok();

        let response = server
            .get(PROTECTED_PAGE)
            .add_cookies(response.cookies())
            .await;

        assert!(
            response.cookies().get(COOKIE_TOKEN).is_some(),
            "want the guard to set a fresh token cookie"
        );
    }

    #[tokio::test]
    async fn guard_tops_a_short_cookie_up_to_the_default_duration() {
        let server = page_server(Duration::seconds(5));
        let response = server.post(ISSUE_COOKIE_ROUTE).await;
        response.assert_status_ok();

        let issue_time = OffsetDateTime::now_utc();
        let jar = response.cookies();
        assert_date_time_close(
            jar.get(COOKIE_TOKEN).unwrap().expires_datetime().unwrap(),
            issue_time + Duration::seconds(5),
        );

        let response = server.get(PROTECTED_PAGE).add_cookies(jar).await;

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            issue_time + DEFAULT_COOKIE_DURATION,
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn missing_cookie_redirects_to_log_in() {
        let server = page_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(PROTECTED_PAGE).await;

        response.assert_status_see_other();
        assert_log_in_redirect(response.header("location"), PROTECTED_PAGE);
    }

    #[tokio::test]
    async fn garbage_cookie_redirects_to_log_in() {
        let server = page_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(PROTECTED_PAGE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "junk")).build())
            .await;

        response.assert_status_see_other();
        assert_log_in_redirect(response.header("location"), PROTECTED_PAGE);
    }

    #[tokio::test]
    async fn expired_cookie_redirects_to_log_in() {
        let server = page_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(ISSUE_COOKIE_ROUTE).await;
        response.assert_status_ok();

        let mut token_cookie = response.cookie(COOKIE_TOKEN);
        token_cookie.set_expires(OffsetDateTime::UNIX_EPOCH);

        let response = server.get(PROTECTED_PAGE).add_cookie(token_cookie).await;

        response.assert_status_see_other();
        assert_log_in_redirect(response.header("location"), PROTECTED_PAGE);
    }

    #[tokio::test]
    async fn api_route_redirects_through_the_hx_redirect_header() {
        let server = api_server(DEFAULT_COOKIE_DURATION);
        let current_url = "/budget?month=2025-06";

        let response = server
            .get(PROTECTED_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_log_in_redirect(response.header("hx-redirect"), current_url);
    }
}
