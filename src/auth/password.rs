//! Password strength checking and bcrypt hashing.
//!
//! A raw password passes through [ValidatedPassword], which runs it by zxcvbn,
//! before it can be turned into a stored [PasswordHash].

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that zxcvbn scored as strong enough to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Checks the strength of `raw_password` and wraps it if it passes.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's feedback when the password scores
    /// below three out of four.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => {
                let feedback = match analysis.feedback() {
                    Some(feedback) => feedback.to_string(),
                    None => Feedback::default().to_string(),
                };

                Err(Error::TooWeak(feedback))
            }
        }
    }

    /// Wraps `raw_password` without checking its strength.
    ///
    /// Useful for fixed passwords in test fixtures. Not `unsafe`: a weak
    /// password weakens the account, it does not break memory safety.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    // Keeps the plaintext out of log output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A bcrypt hash of the account password, as stored in the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used outside of tests.
    ///
    /// Tests pass a cost of four instead so that hashing does not dominate
    /// their runtime.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hashes `password` with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt rejects the cost or fails
    /// internally.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wraps a hash string loaded from the database without re-checking it.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Validates and hashes `raw_password` in one step.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] if the password fails the strength check, or
    /// [Error::HashingError] if bcrypt fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        PasswordHash::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Checks `raw_password` against the stored hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::auth::{PasswordHash, ValidatedPassword};

    /// A cost of four keeps bcrypt fast enough for tests.
    const TEST_COST: u32 = 4;

    #[test]
    fn verify_accepts_the_hashed_password() {
        let hash = PasswordHash::from_raw_password("mangoesarethebestfruit", TEST_COST).unwrap();

        assert!(hash.verify("mangoesarethebestfruit").unwrap());
    }

    #[test]
    fn verify_rejects_a_different_password() {
        let hash = PasswordHash::from_raw_password("mangoesarethebestfruit", TEST_COST).unwrap();

        assert!(!hash.verify("applesarethebestfruit").unwrap());
    }

    #[test]
    fn hashing_the_same_password_twice_gives_different_hashes() {
        let password = ValidatedPassword::new_unchecked("mangoesarethebestfruit");

        let first_hash = PasswordHash::new(password.clone(), TEST_COST).unwrap();
        let second_hash = PasswordHash::new(password, TEST_COST).unwrap();

        assert_ne!(first_hash, second_hash);
    }

    #[test]
    fn from_raw_password_rejects_weak_passwords() {
        assert!(PasswordHash::from_raw_password("password1", TEST_COST).is_err());
    }
}
