//! Signed flash messages and CSRF tokens.
//!
//! Both are HS256 tokens keyed with the session secret, so no server-side
//! session storage is needed. A CSRF token is bound to the browser through
//! the nonce kept in the `csrf` cookie; the token is only accepted alongside
//! that cookie.

use std::collections::HashSet;

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::SessionError;

pub const FLASH_COOKIE: &str = "flash";
pub const CSRF_COOKIE: &str = "csrf";
pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_MISSING: &str = "The CSRF token is missing.";
pub const CSRF_INVALID: &str = "The CSRF token is invalid.";

const FLASH_TTL_SECS: i64 = 300;
const CSRF_PURPOSE: &str = "csrf";
const FLASH_PURPOSE: &str = "flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: String,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: &str) -> Self {
        FlashMessage {
            category: "success".to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct FlashClaims {
    purpose: String,
    exp: i64,
    #[serde(flatten)]
    flash: FlashMessage,
}

#[derive(Serialize, Deserialize)]
struct CsrfClaims {
    purpose: String,
    nonce: String,
    iat: i64,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, SessionError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

fn verify<T: for<'de> Deserialize<'de>>(token: &str, secret: &str, validation: &Validation) -> Result<T, SessionError> {
    let data = decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), validation)?;
    Ok(data.claims)
}

pub fn new_csrf_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Nonce from the request's `csrf` cookie, if it carries a usable one.
pub fn csrf_nonce(req: &HttpRequest) -> Option<String> {
    req.cookie(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Cookie that pins the browser's CSRF nonce for the browser session.
pub fn csrf_cookie(nonce: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, nonce.to_string())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish()
}

/// Issues a form token for the browser holding `nonce`. Tokens do not expire.
pub fn csrf_token(secret: &str, nonce: &str) -> Result<String, SessionError> {
    let claims = CsrfClaims {
        purpose: CSRF_PURPOSE.to_string(),
        nonce: nonce.to_string(),
        iat: now(),
    };
    sign(&claims, secret)
}

/// Accepts `token` only when it is signed with `secret` and was issued for
/// the nonce in the submitting browser's cookie.
pub fn verify_csrf(token: Option<&str>, cookie_nonce: Option<&str>, secret: &str) -> Result<(), SessionError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(SessionError::Missing)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;

    let claims: CsrfClaims = verify(token, secret, &validation)?;
    if claims.purpose != CSRF_PURPOSE {
        return Err(SessionError::WrongPurpose(claims.purpose));
    }
    match cookie_nonce {
        Some(nonce) if !nonce.is_empty() && nonce == claims.nonce => Ok(()),
        _ => Err(SessionError::NonceMismatch),
    }
}

/// User-facing message for a rejected CSRF token.
pub fn csrf_error_message(err: &SessionError) -> &'static str {
    match err {
        SessionError::Missing => CSRF_MISSING,
        _ => CSRF_INVALID,
    }
}

pub fn flash_cookie(flash: &FlashMessage, secret: &str, secure: bool) -> Result<Cookie<'static>, SessionError> {
    let claims = FlashClaims {
        purpose: FLASH_PURPOSE.to_string(),
        exp: now() + FLASH_TTL_SECS,
        flash: flash.clone(),
    };
    let token = sign(&claims, secret)?;

    Ok(Cookie::build(FLASH_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(FLASH_TTL_SECS))
        .finish())
}

/// Reads the pending flash message, if any. Tampered or expired cookies are
/// treated as absent.
pub fn read_flash(req: &HttpRequest, secret: &str) -> Option<FlashMessage> {
    let cookie = req.cookie(FLASH_COOKIE)?;
    let validation = Validation::new(Algorithm::HS256);
    match verify::<FlashClaims>(cookie.value(), secret, &validation) {
        Ok(claims) if claims.purpose == FLASH_PURPOSE => Some(claims.flash),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "ignoring unreadable flash cookie");
            None
        }
    }
}

pub fn flash_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
