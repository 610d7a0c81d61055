//! Integration test harness for Restock.
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot` over
//! the in-memory document store. No database or network is needed:
//!
//! ```bash
//! cargo test -p restock-integration-tests
//! ```
//!
//! [`TestApp`] keeps the session cookie between requests the way a browser
//! would, so a sequence of calls runs as one logged-in client.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use restock_server::config::ServerConfig;
use restock_server::db::MemoryGateway;
use restock_server::state::AppState;

const MULTIPART_BOUNDARY: &str = "restock-test-boundary";

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {}", self.body))
    }
}

/// One client talking to a fresh application instance.
pub struct TestApp {
    router: Router,
    gateway: MemoryGateway,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Start a fresh application with an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let gateway = MemoryGateway::new();
        let router = restock_server::app(AppState::new(test_config(), Arc::new(gateway.clone())));
        Self {
            router,
            gateway,
            cookie: None,
        }
    }

    /// A second client of the same application, with no cookie.
    #[must_use]
    pub fn another_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            gateway: self.gateway.clone(),
            cookie: None,
        }
    }

    /// The document store behind the application.
    #[must_use]
    pub const fn gateway(&self) -> &MemoryGateway {
        &self.gateway
    }

    /// Drop the session cookie, as if the browser was closed.
    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, String::new()).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        let content_type = (!body.is_empty()).then_some("application/x-www-form-urlencoded");
        self.send(Method::POST, uri, content_type, body).await
    }

    /// Post `form` as `multipart/form-data`, the way a browser sends a
    /// `FormData` object.
    pub async fn post_multipart(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let mut body = String::new();
        for (name, value) in form {
            body.push_str(&format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

        let content_type = format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}");
        self.send(Method::POST, uri, Some(&content_type), body).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/accounts/register",
            &[("Username", username), ("Password", password)],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/accounts/login",
            &[("Username", username), ("Password", password)],
        )
        .await
    }

    /// Create an item with empty links and comments.
    pub async fn create_item(&mut self, name: &str, last_purchased: &str) -> TestResponse {
        self.post("/items/create", &item_form(name, last_purchased, "[]"))
            .await
    }

    /// The purchase history as returned by `/items/load`.
    pub async fn items(&mut self) -> Vec<Value> {
        let response = self.post("/items/load", &[]).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        match response.json() {
            Value::Array(items) => items,
            other => panic!("expected an array, got {other}"),
        }
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: String,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(body)).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.remember_cookie(set_cookie);
        }

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body can be read")
            .to_bytes();

        TestResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn remember_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let expired = set_cookie.to_ascii_lowercase().contains("max-age=0");
        let empty = pair.ends_with('=');
        self.cookie = if expired || empty {
            None
        } else {
            Some(pair.to_owned())
        };
    }
}

/// Authoring form fields for an item.
#[must_use]
pub fn item_form<'a>(name: &'a str, last_purchased: &'a str, comments: &'a str) -> [(&'a str, &'a str); 6] {
    [
        ("ItemName", name),
        ("Links", "[]"),
        ("Description", ""),
        ("Comments", comments),
        ("LastPurchased", last_purchased),
        ("ImageDataURL", ""),
    ]
}

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("memory://".to_owned()),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}
