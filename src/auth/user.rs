//! Storage for the application's single user account.
//!
//! Registration creates exactly one row, so the account always has row ID 1
//! and the log-in endpoint looks it up by that ID.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs, so they cannot be mixed up with
/// transaction or budget IDs at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Wraps a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A row of the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
}

/// Create the user table if it does not exist.
///
/// # Errors
///
/// Returns the underlying [rusqlite::Error] if the statement fails.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user row holding `password_hash`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the insert fails.
pub fn create_user(password_hash: PasswordHash, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (password) VALUES (?1)",
        (password_hash.as_ref(),),
    )?;

    Ok(User {
        id: UserID::new(connection.last_insert_rowid()),
        password_hash,
    })
}

/// Fetch the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no such user exists, or an
/// [Error::SqlError] if the query fails.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    let user = db_connection
        .prepare("SELECT id, password FROM user WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], map_user_row)?;

    Ok(user)
}

/// The number of registered users, used to gate registration to one account.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the query fails.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(*) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_password_hash: String = row.get(1)?;

    Ok(User {
        id: UserID::new(id),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        auth::user::{UserID, count_users, create_user, get_user_by_id},
    };

    use super::{Error, create_user_table};

    fn test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");

        connection
    }

    #[test]
    fn first_user_gets_id_one() {
        let connection = test_connection();

        let user = create_user(PasswordHash::new_unchecked("fakehash"), &connection).unwrap();

        // The log-in endpoint depends on the account living at row ID 1.
        assert_eq!(user.id, UserID::new(1));
    }

    #[test]
    fn round_trips_the_stored_hash() {
        let connection = test_connection();
        let created = create_user(PasswordHash::new_unchecked("fakehash"), &connection).unwrap();

        let fetched = get_user_by_id(created.id, &connection).unwrap();

        assert_eq!(fetched, created);
    }

    #[test]
    fn missing_user_is_not_found() {
        let connection = test_connection();

        let result = get_user_by_id(UserID::new(42), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn count_tracks_insertions() {
        let connection = test_connection();

        assert_eq!(count_users(&connection).unwrap(), 0);

        create_user(PasswordHash::new_unchecked("fakehash"), &connection).unwrap();

        assert_eq!(count_users(&connection).unwrap(), 1);
    }
}
