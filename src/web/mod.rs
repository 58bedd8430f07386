// Server-rendered pages: landing, login/registration, goals dashboard.
// Uses Askama templates; state between requests lives in cookies and the store.

mod error;
mod extract;
pub mod flash;
pub mod forms;
mod templates;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::auth::{self, AuthError, IssuedSession, INVALID_CREDENTIALS_MESSAGE};
use crate::config::AuthConfig;
use crate::db::{repo, StoreError};
use crate::AppState;

pub use error::WebError;
pub use extract::CurrentUser;
use forms::{CredentialsForm, EditGoalForm, NewGoalForm};
pub use templates::*;

// Session token cookie name
pub const SESSION_COOKIE: &str = "goaltrack_session";

const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful! Please login.";
const REGISTRATION_ERROR_MESSAGE: &str = "There was an error processing your registration";

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response(),
    }
}

/// 302 Found to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Session cookie that lives exactly as long as the server-side session.
fn session_cookie(session: IssuedSession, config: &AuthConfig) -> Cookie<'static> {
    let remaining = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);

    Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(remaining))
        .build()
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public routes
        .route("/", get(index))
        .route("/login", post(login_submit))
        .route("/register", post(register_submit))
        .route("/health", get(health_check))
        // Session required (enforced by the CurrentUser extractor)
        .route("/goals", get(goals_dashboard))
        .route("/goal/new", post(goal_create))
        .route("/goal/:id/edit", post(goal_edit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

// Landing page
async fn index(jar: CookieJar) -> Response {
    let (jar, flashes) = flash::take(jar);
    let template = IndexTemplate {
        flashes,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (jar, render_template(template)).into_response()
}

fn reject_login(jar: CookieJar) -> Response {
    (flash::push(jar, INVALID_CREDENTIALS_MESSAGE), found("/")).into_response()
}

// Login submit
async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, WebError> {
    let credentials = match form.decode() {
        Ok(credentials) => credentials,
        Err(e) => {
            debug!(error = %e, "Malformed login form");
            return Ok(reject_login(jar));
        }
    };

    match auth::login(&state.db, &credentials.email, &credentials.password, &state.config.auth).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(session, &state.config.auth));
            Ok((jar, found("/goals")).into_response())
        }
        Err(AuthError::InvalidCredentials) => Ok(reject_login(jar)),
        Err(AuthError::Store(e)) => Err(e.into()),
    }
}

// Registration submit; never logs the new user in
async fn register_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, WebError> {
    let credentials = match form.decode() {
        Ok(credentials) => credentials,
        Err(e) => {
            debug!(error = %e, "Malformed registration form");
            return Ok((flash::push(jar, REGISTRATION_ERROR_MESSAGE), found("/")).into_response());
        }
    };

    let message = match repo::create_user(
        &state.db,
        &credentials.email,
        &credentials.password,
        &state.config.auth.password,
    )
    .await
    {
        Ok(_) => REGISTRATION_SUCCESS_MESSAGE,
        Err(StoreError::DuplicateKey) => {
            debug!("Registration for an existing email");
            REGISTRATION_ERROR_MESSAGE
        }
        Err(e) => return Err(e.into()),
    };

    Ok((flash::push(jar, message), found("/")).into_response())
}

// Goals dashboard
async fn goals_dashboard(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let goals = repo::list_goals_for_user(&state.db, &user.email).await?;
    let (jar, flashes) = flash::take(jar);

    let template = GoalsTemplate::new(user.email, goals, flashes);
    Ok((jar, render_template(template)).into_response())
}

// Create goal
async fn goal_create(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<NewGoalForm>,
) -> Result<Response, WebError> {
    let title = match form.decode() {
        Ok(title) => title,
        Err(e) => return Ok((flash::push(jar, e.to_string()), found("/goals")).into_response()),
    };

    let message = match repo::create_goal(&state.db, &title, &user.email).await {
        Ok(goal) => format!("New goal - \"{}\"", goal.title),
        Err(StoreError::Validation(message)) => message,
        Err(e) => return Err(e.into()),
    };

    Ok((flash::push(jar, message), found("/goals")).into_response())
}

// Edit goal; only the owner may edit, anyone else sees a 404
async fn goal_edit(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<EditGoalForm>,
) -> Result<Response, WebError> {
    let id: i64 = id.parse().map_err(|_| WebError::not_found("Goal not found"))?;

    let goal = repo::find_goal_by_id(&state.db, id)
        .await?
        .ok_or_else(|| WebError::not_found("Goal not found"))?;

    if goal.author_email != user.email {
        warn!(goal_id = id, user = %user.email, "Attempt to edit another user's goal");
        return Err(WebError::not_found("Goal not found"));
    }

    let changes = match form.decode() {
        Ok(changes) => changes,
        Err(e) => return Ok((flash::push(jar, e.to_string()), found("/goals")).into_response()),
    };

    let message = match repo::update_goal(&state.db, id, changes).await {
        Ok(goal) => {
            info!(goal_id = goal.id, "Goal edited");
            format!("Successfully edited \"{}\"!", goal.title)
        }
        Err(StoreError::Validation(message)) => message,
        Err(e) => return Err(e.into()),
    };

    Ok((flash::push(jar, message), found("/goals")).into_response())
}
