//! Test harness for the Ayucan admin.
//!
//! Each test starts a fake store backend (an axum router on an ephemeral
//! port) and a real admin app pointed at it, then drives the admin over HTTP
//! with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ayucan-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::redirect::Policy;
use serde_json::{Value, json};

use ayucan_admin::config::AdminConfig;
use ayucan_admin::state::AppState;

/// Token the fake backend issues and accepts.
pub const TOKEN: &str = "test-token";

/// Password the fake backend accepts for any email.
pub const PASSWORD: &str = "correct-horse";

/// Requests the fake backend saw, for assertions.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Vec<Recorded>>>,
}

/// One recorded backend request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Value,
}

impl Recorder {
    pub fn record(&self, method: &str, path: &str, query: Option<&str>, body: Value) {
        self.inner.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            query: query.unwrap_or_default().to_string(),
            body,
        });
    }

    /// Every recorded request to `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

/// Whether the request carries the issued bearer token.
#[must_use]
pub fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

/// The backend's 401 answer.
#[must_use]
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "token expired"})),
    )
        .into_response()
}

/// Wrap a value in the single-record envelope.
#[must_use]
pub fn data(value: Value) -> Json<Value> {
    Json(json!({ "data": value }))
}

/// Wrap rows in the list envelope.
#[must_use]
pub fn page(rows: Vec<Value>, total: u64, page: u32, limit: u32) -> Json<Value> {
    Json(json!({ "data": rows, "total": total, "page": page, "limit": limit }))
}

async fn login(State(recorder): State<Recorder>, Json(body): Json<Value>) -> Response {
    recorder.record("POST", "/auth/login", None, body.clone());
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid credentials"})),
        )
            .into_response();
    }
    data(json!({
        "token": TOKEN,
        "admin": {
            "id": "adm_1",
            "name": "Asha Menon",
            "email": body["email"],
            "role": "admin"
        }
    }))
    .into_response()
}

/// Fake backend with login and health; tests merge their own endpoints.
pub fn fake_backend() -> Router<Recorder> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/auth/login", post(login))
}

/// Serve a router on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A running admin app and a client talking to it.
pub struct TestContext {
    pub admin_url: String,
    pub client: reqwest::Client,
    pub recorder: Recorder,
}

impl TestContext {
    /// Start `backend` and an admin app in front of it.
    pub async fn start(backend: Router<Recorder>, recorder: Recorder) -> Self {
        let backend_addr = serve(backend.with_state(recorder.clone())).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let admin_addr = listener.local_addr().unwrap();
        let admin_url = format!("http://{admin_addr}");

        let env: HashMap<String, String> = [
            ("AYUCAN_API_BASE_URL", format!("http://{backend_addr}/")),
            ("ADMIN_BASE_URL", admin_url.clone()),
            ("AYUCAN_API_TIMEOUT_SECS", "5".to_string()),
            ("ADMIN_PAGE_SIZE", "20".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let config = AdminConfig::from_source(&env).unwrap();
        let app = ayucan_admin::app(AppState::new(config).unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            admin_url,
            client,
            recorder,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Sign in through the login form.
    pub async fn sign_in(&self) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .form(&[("email", "asha@ayucan.in"), ("password", PASSWORD)])
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
