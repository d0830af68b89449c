//! The log-in page and the endpoint that checks a submitted password.
//!
//! The lower level token and cookie handling lives in the sibling auth modules.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, UserID, get_user_by_id, invalidate_auth_cookie,
        normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, loading_spinner, log_in_register, password_input},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect password.";

const PASSWORD_NOT_SET_ERROR_MSG: &str =
    "No password has been set up yet. Create one on the registration page.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(password: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (password_input(password, 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "

                a
                    href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have a password? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page.
///
/// A `redirect_url` query parameter is carried through the form as a hidden
/// input so the user lands back on the page they originally asked for.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// Cookie lifetime when the user ticks "keep me logged in".
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Check a log-in attempt against the stored password.
///
/// On success the auth cookie is set and the client is redirected, either to
/// the URL the user originally asked for or to the dashboard. On failure the
/// form is re-rendered with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return log_in_form("", Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
            }
        };

        // The app has a single account, so the user row always has ID 1.
        match get_user_by_id(UserID::new(1), &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_form("", Some(PASSWORD_NOT_SET_ERROR_MSG), redirect_url)
                    .into_response();
            }
            Err(error) => {
                tracing::error!("could not look up the user: {error}");
                return log_in_form("", Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
            }
        }
    };

    // Verifying the bcrypt hash is slow, keep it outside the database lock.
    let password_matches = match user.password_hash.verify(&form.password) {
        Ok(password_matches) => password_matches,
        Err(error) => {
            tracing::error!("could not verify the password: {error}");
            return log_in_form("", Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
        }
    };

    if !password_matches {
        return log_in_form("", Some(INVALID_CREDENTIALS_ERROR_MSG), redirect_url).into_response();
    }

    let cookie_duration = if form.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW).to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set the auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is compared against the stored hash, so it needs no
/// validation of its own here.
#[derive(Deserialize)]
pub struct LogInData {
    /// Password entered during log-in.
    pub password: String,

    /// Whether to keep the session alive for longer than the default.
    ///
    /// Checkboxes submit a string value when ticked and nothing at all when
    /// left unticked, so any `Some` counts as true.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::Query,
        http::{StatusCode, header::CONTENT_TYPE},
    };

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{RedirectQuery, get_log_in_page};

    #[tokio::test]
    async fn log_in_page_has_password_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms: Vec<_> = document.select(&form_selector).collect();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms[0];
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));

        for selector_string in [
            "input[type=password]#password",
            "input[type=checkbox][name=remember_me]",
            "button[type=submit]",
        ] {
            let selector = scraper::Selector::parse(selector_string).unwrap();
            assert!(
                form.select(&selector).next().is_some(),
                "want an element matching {selector_string}"
            );
        }

        let link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links: Vec<_> = form
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            links,
            vec![endpoints::FORGOT_PASSWORD_VIEW, endpoints::REGISTER_VIEW]
        );
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/budget?month=2025-06".to_string();

        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some(redirect_url.clone()),
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        let inputs: Vec<_> = document.select(&input_selector).collect();
        assert_eq!(
            inputs.len(),
            1,
            "want 1 redirect_url input, got {}",
            inputs.len()
        );
        assert_eq!(inputs[0].value().attr("value"), Some(redirect_url.as_str()));
    }

    #[tokio::test]
    async fn log_in_page_drops_unsafe_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("https://example.com/elsewhere".to_string()),
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        assert!(
            document.select(&input_selector).next().is_none(),
            "an unsafe redirect URL should not be echoed into the form"
        );
    }
}
