//! One-shot notices carried across a redirect in a cookie.
//!
//! The cookie holds a base64url-encoded JSON array of messages. It is
//! appended to before a redirect and cleared by the next page render.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub const FLASH_COOKIE: &str = "goaltrack_flash";

fn decode(value: &str) -> Vec<String> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn encode(messages: &[String]) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Queue a message for the next rendered page.
pub fn push(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    let mut messages = jar.get(FLASH_COOKIE).map(|c| decode(c.value())).unwrap_or_default();
    messages.push(message.into());

    jar.add(
        Cookie::build((FLASH_COOKIE, encode(&messages)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

/// Read all queued messages and clear them.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, Vec::new());
    };
    let messages = decode(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
    (jar, messages)
}
