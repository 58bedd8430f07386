use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::error::WebError;
use super::SESSION_COOKIE;
use crate::auth;
use crate::db::User;
use crate::AppState;

/// The user behind the request's session cookie.
///
/// Rejects with `WebError::Unauthorized` (a redirect to the landing page)
/// when the cookie is missing, unknown or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(WebError::Unauthorized)?;

        auth::resolve_session(&state.db, &token)
            .await?
            .map(CurrentUser)
            .ok_or(WebError::Unauthorized)
    }
}
