//! Shared helpers for the HTTP integration tests.
//!
//! Each `TestContext` owns a fresh SQLite file in a temporary directory and
//! drives the router in-process; `TestClient` carries cookies between
//! requests the way a browser would.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use goaltrack::config::{Config, DatabaseConfig, PasswordConfig};
use goaltrack::{AppState, DbPool};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestContext {
    _dir: TempDir,
    pub db: DbPool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;

        let mut config = Config::default();
        config.database = DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", dir.path().join("goals.db").display()),
            max_connections: 2,
        };
        // Cheapest parameters argon2 accepts
        config.auth.password = PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };

        let db = goaltrack::db::init(&config.database).await?;
        let state = Arc::new(AppState::new(config.clone(), db.clone()));
        let app = goaltrack::web::create_router(state);

        Ok(Self {
            _dir: dir,
            db,
            app,
            config,
        })
    }

    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.app.clone(),
            cookies: HashMap::new(),
        }
    }
}

/// Minimal browser: remembers cookies, does not follow redirects.
pub struct TestClient {
    app: Router,
    pub cookies: HashMap<String, String>,
}

impl TestClient {
    pub async fn get(&mut self, path: &str) -> Response {
        let request = self
            .request("GET", path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        if self.cookies.is_empty() {
            builder
        } else {
            builder.header(header::COOKIE, self.cookie_header())
        }
    }

    /// GET a page and return its status and body text.
    pub async fn page(&mut self, path: &str) -> (StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        (status, body_text(response).await)
    }

    pub async fn register(&mut self, email: &str, password: &str) -> Response {
        self.post_form("/register", &[("email", email), ("password", password)])
            .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self.app.clone().oneshot(request).await.unwrap();
        self.store_cookies(&response);
        response
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn store_cookies(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let mut attributes = value.split(';');
            let Some((name, value)) = attributes.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };
            let expired = attributes.any(|attr| attr.trim() == "Max-Age=0");
            if value.is_empty() || expired {
                self.cookies.remove(name.trim());
            } else {
                self.cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
