use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use crate::{db::queries::sessions::find_session, settings::AuthSettings};

use super::error::ApiError;

/// Proof that the request carries a live admin bearer token.
///
/// A missing token rejects with 401, an unknown or expired one with 403.
#[derive(Debug, Clone)]
pub struct Admin {
    pub username: String,
    pub token: String,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (_scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub fn credentials_match(auth: &AuthSettings, username: &str, password: &str) -> bool {
    username == auth.admin_username && password == auth.admin_password.expose_secret()
}

impl<S> FromRequestParts<S> for Admin
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(ApiError::Unauthorized)?
            .to_owned();
        let pool = SqlitePool::from_ref(state);
        let session = find_session(&pool, &token)
            .await?
            .ok_or(ApiError::Forbidden)?;
        Ok(Admin {
            username: session.username,
            token: session.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_is_second_word() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn credentials() {
        let auth = AuthSettings {
            admin_username: "admin".to_owned(),
            admin_password: SecretString::from("pw"),
            token_ttl: chrono::Duration::minutes(5),
        };
        assert!(credentials_match(&auth, "admin", "pw"));
        assert!(!credentials_match(&auth, "admin", "PW"));
        assert!(!credentials_match(&auth, "root", "pw"));
    }
}
