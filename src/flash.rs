//! One-shot flash messages carried in a cookie.
//!
//! Messages are severity-tagged, serialized as JSON and base64-encoded
//! into a single cookie. They are appended on redirects and consumed
//! (cookie removed) when the next page view is rendered.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Name of the flash cookie
pub const FLASH_COOKIE: &str = "moodline_flash";

/// Message severity, matching the rendering layer's alert categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
    Warning,
    Info,
}

/// One transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

/// Append a message to the pending flashes
pub fn push(jar: CookieJar, level: Level, message: impl Into<String>) -> CookieJar {
    let mut flashes = peek(&jar);
    flashes.push(Flash {
        level,
        message: message.into(),
    });

    jar.add(
        Cookie::build((FLASH_COOKIE, encode(&flashes)))
            .path("/")
            .http_only(true)
            .build(),
    )
}

/// Consume all pending flashes, clearing the cookie
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let flashes = peek(&jar);
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flashes)
}

fn peek(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(flashes).unwrap_or_default())
}

/// A malformed cookie decodes to no messages rather than an error
fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}
