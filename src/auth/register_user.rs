//! The registration page for setting the password for accessing the app.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, count_users, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(
    password: &str,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, password_error_message))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, confirm_password_error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Password"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have a password? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", None, None);
    let content = log_in_register("Create Password", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub password: String,
    pub confirm_password: String,
}

/// Create the single user account, i.e. set the app password.
///
/// Registration is only open while no user exists. On success the client is
/// sent to the log-in page to sign in with the new password.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match count_users(&connection) {
            Ok(0) => {}
            Ok(_) => {
                return registration_form(
                    &form.password,
                    None,
                    Some("A password has already been created, please log in with your existing password."),
                ).into_response();
            }
            Err(error) => {
                tracing::error!("could not count users: {error}");
                return get_internal_server_error_redirect();
            }
        }
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(&form.password, Some(&error.to_string()), None)
                .into_response();
        }
    };

    if form.password != form.confirm_password {
        return registration_form(&form.password, None, Some("Passwords do not match"))
            .into_response();
    }

    // Hashing happens outside the database lock.
    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match create_user(password_hash, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("could not insert the new user: {error}");
                return get_internal_server_error_redirect();
            }
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::State,
        http::{Response, StatusCode},
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        auth::{count_users, create_user, create_user_table},
        endpoints,
    };

    use super::{RegisterForm, RegistrationState, register_user};

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState::new("42", Arc::new(Mutex::new(connection)))
    }

    async fn post_registration(
        state: &RegistrationState,
        password: &str,
        confirm_password: &str,
    ) -> Response<Body> {
        register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Form(RegisterForm {
                password: password.to_owned(),
                confirm_password: confirm_password.to_owned(),
            }),
        )
        .await
    }

    /// The text of the red error paragraph in the re-rendered form.
    async fn error_paragraph(response: Response<Body>) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();
        let fragment = scraper::Html::parse_fragment(&text);

        let error_selector = scraper::Selector::parse("p.text-red-500").unwrap();
        let paragraphs: Vec<_> = fragment.select(&error_selector).collect();
        assert_eq!(
            paragraphs.len(),
            1,
            "want 1 error paragraph, got {}",
            paragraphs.len()
        );

        paragraphs[0].text().collect::<String>().to_lowercase()
    }

    #[tokio::test]
    async fn registering_first_password_succeeds() {
        let state = get_test_state();

        let response =
            post_registration(&state, "iamsettingupmybudgetapp", "iamsettingupmybudgetapp").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn second_registration_is_rejected() {
        let state = get_test_state();
        create_user(
            PasswordHash::from_raw_password("foobarbazquxgobbledygook", 4).unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");

        let response = post_registration(
            &state,
            "anotherdecentlylongpassword",
            "anotherdecentlylongpassword",
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let message = error_paragraph(response).await;
        assert!(
            message.contains("existing password"),
            "'{message}' does not mention the existing password"
        );
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let state = get_test_state();

        let response = post_registration(&state, "foo", "foo").await;

        let message = error_paragraph(response).await;
        assert!(
            message.contains("password is too weak"),
            "'{message}' does not contain 'password is too weak'"
        );
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let state = get_test_state();

        let response = post_registration(&state, "", "").await;

        let message = error_paragraph(response).await;
        assert!(
            message.contains("password is too weak"),
            "'{message}' does not contain 'password is too weak'"
        );
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let state = get_test_state();

        let response =
            post_registration(&state, "iamsettingupmybudgetapp", "adifferentpassword").await;

        let message = error_paragraph(response).await;
        assert!(
            message.contains("passwords do not match"),
            "'{message}' does not contain 'passwords do not match'"
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 0);
    }
}
