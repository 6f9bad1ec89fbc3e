//! Signed session cookies and authentication extractors.
//!
//! Session state is client-held: an HS256-signed token carrying only the
//! user id, stored in an HttpOnly cookie. The extractors resolve it back
//! to a user row per request; the gates reply with redirects, never with
//! hard error pages.

use crate::{
    context::AppContext,
    db::models::User,
    error::{AppError, AppResult},
    flash::{self, Level},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "moodline_session";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// User id
    sub: i64,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens
pub struct SessionSigner {
    secret: String,
    ttl_hours: i64,
}

impl SessionSigner {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self { secret, ttl_hours }
    }

    /// Sign a session token for a user id
    pub fn sign(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl_hours * 3600,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session: {}", e)))
    }

    /// Verify a session token, returning the user id it was bound to.
    /// Expired, tampered or otherwise malformed tokens yield None; a
    /// bad cookie is an anonymous request, not an error.
    pub fn verify(&self, token: &str) -> Option<i64> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims.sub)
        .ok()
    }
}

/// Build the session cookie for a signed token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Remove the session cookie; idempotent
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Extract the session token from the Cookie header
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

async fn resolve_user(parts: &Parts, state: &AppContext) -> Result<Option<User>, AppError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    let Some(user_id) = state.sessions.verify(&token) else {
        return Ok(None);
    };

    // The id may no longer resolve; treat that as logged out
    state.accounts.find_user(user_id).await
}

/// Current user, if any - never rejects on missing or stale sessions
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppContext> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state).await?))
    }
}

/// Login gate - rejects anonymous requests with a redirect to the login
/// page carrying the original path as the `next` target
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppContext> for RequireUser {
    type Rejection = AuthGate;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(Some(user)) => Ok(RequireUser(user)),
            Ok(None) => Err(AuthGate::Login {
                next: parts.uri.path().to_string(),
            }),
            Err(err) => Err(AuthGate::Error(err)),
        }
    }
}

/// Admin gate - anonymous requests go to login, authenticated non-admins
/// back to the dashboard with a warning flash. The handler body is never
/// reached for either.
pub struct RequireAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppContext> for RequireAdmin {
    type Rejection = AuthGate;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(Some(user)) if user.is_admin => Ok(RequireAdmin(user)),
            Ok(Some(_)) => Err(AuthGate::Forbidden),
            Ok(None) => Err(AuthGate::Login {
                next: parts.uri.path().to_string(),
            }),
            Err(err) => Err(AuthGate::Error(err)),
        }
    }
}

/// Gate rejections, each mapping to a redirect rather than an error page
pub enum AuthGate {
    Login { next: String },
    Forbidden,
    Error(AppError),
}

impl IntoResponse for AuthGate {
    fn into_response(self) -> Response {
        match self {
            AuthGate::Login { next } => {
                Redirect::to(&format!("/login?next={}", urlencoding::encode(&next))).into_response()
            }
            AuthGate::Forbidden => {
                let jar = flash::push(CookieJar::default(), Level::Danger, "Admin access required.");
                (jar, Redirect::to("/dashboard")).into_response()
            }
            AuthGate::Error(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("0123456789abcdef0123456789abcdef".to_string(), 24)
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let signer = signer();
        let token = signer.sign(42).unwrap();
        assert_eq!(signer.verify(&token), Some(42));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = signer();
        let mut token = signer.sign(42).unwrap();
        token.pop();
        token.push('x');
        assert_eq!(signer.verify(&token), None);
        assert_eq!(signer.verify("not-a-token"), None);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = SessionSigner::new("ffffffffffffffffffffffffffffffff".to_string(), 24);
        let token = other.sign(42).unwrap();
        assert_eq!(signer().verify(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative TTL puts the expiry well past the validation leeway
        let expired = SessionSigner::new("0123456789abcdef0123456789abcdef".to_string(), -2);
        let token = expired.sign(42).unwrap();
        assert_eq!(expired.verify(&token), None);
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("other=1; {}=abc.def.ghi; last=2", SESSION_COOKIE)
                .parse()
                .unwrap(),
        );
        assert_eq!(session_token(&headers), Some("abc.def.ghi".to_string()));

        let empty = HeaderMap::new();
        assert_eq!(session_token(&empty), None);
    }
}
