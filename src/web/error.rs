//! Error responses for the page handlers.
//!
//! Recoverable problems (bad input, duplicate email, failed login) never get
//! here; handlers turn those into flash messages. What remains is missing
//! authentication, missing resources and genuine server failures.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use super::templates::NotFoundTemplate;
use super::{found, render_template};
use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum WebError {
    /// No valid session on a protected route
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Unauthorized => found("/"),
            WebError::NotFound(message) => {
                let mut response = render_template(NotFoundTemplate { message });
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            }
            WebError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Internal Server Error</h1>"),
            )
                .into_response(),
        }
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WebError::not_found("Not found"),
            other => {
                tracing::error!(error = %other, "Store error");
                WebError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_unauthorized_redirects_home() {
        let response = WebError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
    }

    #[test]
    fn test_not_found_status() {
        let response = WebError::not_found("Goal not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_hides_details() {
        let err: WebError = StoreError::Hash("salt exploded".to_string()).into();
        assert!(matches!(err, WebError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err: WebError = StoreError::NotFound.into();
        assert!(matches!(err, WebError::NotFound(_)));
    }
}
