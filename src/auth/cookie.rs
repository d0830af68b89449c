//! Defines functions for handling user authentication with cookies.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserID},
};

/// The name of the cookie that holds the serialised auth token.
pub const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_token_cookie(token: &Token) -> Result<Cookie<'static>, Error> {
    let token_string = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(Cookie::build((COOKIE_TOKEN, token_string))
        .expires(token.expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build())
}

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialised.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let cookie = build_token_cookie(&Token {
        user_id,
        expires_at,
    })?;

    Ok(jar.add(cookie))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Parse the auth token from the private cookie jar.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if the token cookie is not in the cookie jar.
/// - [Error::JSONSerializationError] if the cookie value cannot be parsed as a token.
/// - [Error::InvalidCredentials] if the token has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}

/// Set the expiry of the auth token in `jar` to the latest of UTC now
/// plus `duration` and the token's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if the token cookie is not in the cookie jar.
/// - [Error::InvalidCredentials] if the token has already expired.
/// - [Error::InvalidDateFormat] if extending the expiry by `duration` would overflow the date time.
/// - [Error::JSONSerializationError] if the updated token cannot be serialised.
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| {
            Error::InvalidDateFormat("date time overflow".to_owned(), duration.to_string())
        })?;
    let expires_at = max(token.expires_at, new_expiry);

    if expires_at == token.expires_at {
        return Ok(jar);
    }

    let cookie = build_token_cookie(&Token {
        user_id: token.user_id,
        expires_at,
    })?;

    Ok(jar.add(cookie))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{Error, auth::UserID};

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
        get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = get_jar();
        let user_id = UserID::new(1);

        let jar = set_auth_cookie(jar, user_id, DEFAULT_COOKIE_DURATION).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_date_time_close!(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(5)
        );
    }

    #[test]
    fn get_token_from_cookies_succeeds() {
        let user_id = UserID::new(1);
        let jar = set_auth_cookie(get_jar(), user_id, DEFAULT_COOKIE_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.user_id, user_id);
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn get_token_from_cookies_fails_with_empty_jar() {
        let jar = get_jar();

        assert_eq!(get_token_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn get_token_from_cookies_fails_with_expired_token() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), Duration::minutes(-5)).unwrap();

        assert_eq!(
            get_token_from_cookies(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::minutes(10);

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        let token = get_token_from_cookies(&jar).unwrap();

        assert_date_time_close!(token.expires_at, want);
        assert_date_time_close!(cookie.expires_datetime().unwrap(), want);
    }

    #[test]
    fn cookie_duration_does_not_change() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        // The initial cookie is set to expire in 5 minutes, so extending it by 5 seconds should not change the expiry.
        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), UserID::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        assert!(
            get_token_from_cookies(&jar).is_err(),
            "want error from invalidated cookie, got token"
        );
    }
}
