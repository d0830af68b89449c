//! Defines the auth token stored in the session cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

/// A token for authorization and authentication.
///
/// The expiry is serialised as a unix timestamp to keep the cookie value
/// compact and independent of any datetime string format.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}
