//! The shared state handed to every route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// The state of the server.
///
/// Each endpoint extracts the narrower state struct it needs via [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs and encrypts the private auth cookie.
    pub cookie_key: Key,

    /// How long a freshly issued auth cookie lasts.
    pub cookie_duration: Duration,

    /// The SQLite connection, shared behind a mutex since `Connection` is not
    /// `Sync`.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// The database schema is created on the spot if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, cookie_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: connection,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie signing key from `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
