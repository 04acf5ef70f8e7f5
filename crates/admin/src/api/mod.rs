//! REST client for the Ayucan store backend.
//!
//! The backend owns every record; this client is the dashboard's only way to
//! read or change them.
//!
//! # Wire conventions
//!
//! - List endpoints accept `page`, `limit`, `search` and filter parameters and
//!   answer `{"data": [...], "total": n, "page": p, "limit": l}`.
//! - Single-record endpoints answer `{"data": {...}}`.
//! - Failures answer a non-2xx status with `{"message": "..."}`.
//! - Every call except login carries `Authorization: Bearer <token>`.

mod analytics;
mod auth;
mod catalog;
mod customers;
mod invoices;
mod marketing;
mod orders;
pub mod types;

pub use analytics::AnalyticsRange;
pub use catalog::ImageUpload;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// How long category and offline-customer option lists are reused.
const OPTION_CACHE_TTL: Duration = Duration::from_secs(60);

/// Page size used when walking every page of a listing.
const FETCH_ALL_PAGE_SIZE: u32 = 100;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The stored token was rejected.
    #[error("Unauthorized: session expired")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the submitted data.
    #[error("{0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for a toast notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Api { message, .. } => message.clone(),
            Self::NotFound(_) => "The requested record no longer exists.".to_string(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(secs) => {
                format!("Too many requests. Try again in {secs} seconds.")
            }
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => {
                "Could not reach the store backend.".to_string()
            }
        }
    }
}

/// Single-record response envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// One page of a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// An empty first page, rendered when a listing fails to load.
    #[must_use]
    pub const fn empty(limit: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: 1,
            limit,
        }
    }

    /// Number of pages, at least one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.limit)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Parameters for a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            search: None,
            filters: Vec::new(),
        }
    }

    /// Set the free-text search. Blank input is ignored.
    #[must_use]
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        self
    }

    /// Add a filter. Missing or blank values are ignored.
    #[must_use]
    pub fn filter(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.filters.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// URL-encoded query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.as_str(), v.clone())));
        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }

    #[must_use]
    fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Backend API client.
///
/// Cheap to clone; the HTTP connection pool and option caches are shared.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    category_options: Cache<(), Arc<Vec<Category>>>,
    offline_customer_options: Cache<(), Arc<Vec<OfflineCustomer>>>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("ayucan-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                category_options: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(OPTION_CACHE_TTL)
                    .build(),
                offline_customer_options: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(OPTION_CACHE_TTL)
                    .build(),
            }),
        })
    }

    /// Calls made on behalf of a signed-in admin.
    #[must_use]
    pub const fn authed<'a>(&'a self, token: &'a str) -> AuthedApi<'a> {
        AuthedApi {
            client: self,
            token,
        }
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Absolute URL for an image path the backend returned.
    ///
    /// Absolute URLs pass through; relative ones resolve against the base URL.
    #[must_use]
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        self.inner
            .base_url
            .join(path)
            .map_or_else(|_| path.to_string(), String::from)
    }

    fn url(&self, path: &str, query: Option<&str>) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    /// Handle API response and unwrap the `data` envelope.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json::<DataEnvelope<T>>()
                .await
                .map(|envelope| envelope.data)
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    /// Handle a list response.
    async fn handle_page<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Page<T>, ApiError> {
        if response.status().is_success() {
            return response
                .json::<Page<T>>()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    /// Parse error response from the backend.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ApiError::RateLimited(retry_after);
        }

        if status == 401 {
            return ApiError::Unauthorized;
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);

        match status {
            404 => ApiError::NotFound(message),
            400 | 422 => ApiError::Validation(message),
            _ => ApiError::Api { status, message },
        }
    }
}

/// Pull `message` out of an error body, falling back to the raw text.
fn error_message(body: &str, status: u16) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {status}")
    } else {
        trimmed.chars().take(200).collect()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Backend calls carrying an admin's bearer token.
#[derive(Clone, Copy)]
pub struct AuthedApi<'a> {
    client: &'a ApiClient,
    token: &'a str,
}

impl std::fmt::Debug for AuthedApi<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthedApi")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AuthedApi<'_> {
    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .inner
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// Execute a GET request for a single record.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = self.client.url(path, query)?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        ApiClient::handle_response(response).await
    }

    /// Execute a GET request for one page of a listing.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, ApiError> {
        let url = self.client.url(path, Some(&query.to_query_string()))?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        ApiClient::handle_page(response).await
    }

    /// Walk every page of a listing.
    pub(crate) async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: ListQuery,
    ) -> Result<Vec<T>, ApiError> {
        let mut query = ListQuery {
            limit: FETCH_ALL_PAGE_SIZE,
            ..query
        }
        .with_page(1);
        let mut rows = Vec::new();
        loop {
            let page: Page<T> = self.get_page(path, &query).await?;
            let has_next = page.has_next() && !page.data.is_empty();
            rows.extend(page.data);
            if !has_next {
                return Ok(rows);
            }
            query = query.with_page(page.page + 1);
        }
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.client.url(path, None)?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        ApiClient::handle_response(response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.client.url(path, None)?;
        let response = self
            .request(reqwest::Method::PUT, url)
            .json(body)
            .send()
            .await?;
        ApiClient::handle_response(response).await
    }

    /// Execute a PATCH request with a JSON body.
    pub(crate) async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.client.url(path, None)?;
        let response = self
            .request(reqwest::Method::PATCH, url)
            .json(body)
            .send()
            .await?;
        ApiClient::handle_response(response).await
    }

    /// Execute a POST request with a multipart body.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.client.url(path, None)?;
        let response = self
            .request(reqwest::Method::POST, url)
            .multipart(form)
            .send()
            .await?;
        ApiClient::handle_response(response).await
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.client.url(path, None)?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(ApiClient::parse_error(response).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_list_query_string() {
        let query = ListQuery::new(2, 20)
            .search(Some("  neem oil "))
            .filter("status", Some("active"))
            .filter("category_id", Some(""))
            .filter("payment_status", None);
        assert_eq!(
            query.to_query_string(),
            "page=2&limit=20&search=neem+oil&status=active"
        );
    }

    #[test]
    fn test_list_query_page_floor() {
        assert_eq!(ListQuery::new(0, 10).page, 1);
    }

    #[test]
    fn test_page_navigation() {
        let page: Page<u8> = Page {
            data: vec![],
            total: 41,
            page: 2,
            limit: 20,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_prev());
        assert!(page.has_next());

        let empty: Page<u8> = Page::empty(20);
        assert_eq!(empty.total_pages(), 1);
        assert!(!empty.has_prev());
        assert!(!empty.has_next());
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://api.ayucan.in/v1/");
        let url = api.url("/products/p1", Some("page=1")).unwrap();
        assert_eq!(url.as_str(), "https://api.ayucan.in/v1/products/p1?page=1");
    }

    #[test]
    fn test_asset_url() {
        let api = client("https://api.ayucan.in/v1/");
        assert_eq!(
            api.asset_url("uploads/neem.jpg"),
            "https://api.ayucan.in/v1/uploads/neem.jpg"
        );
        assert_eq!(
            api.asset_url("/uploads/neem.jpg"),
            "https://api.ayucan.in/uploads/neem.jpg"
        );
        assert_eq!(
            api.asset_url("https://cdn.ayucan.in/neem.jpg"),
            "https://cdn.ayucan.in/neem.jpg"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"SKU already exists"}"#, 422),
            "SKU already exists"
        );
        assert_eq!(error_message("", 500), "Request failed with status 500");
        assert_eq!(error_message("Bad gateway", 502), "Bad gateway");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ApiError::Validation("Code taken".into()).user_message(),
            "Code taken"
        );
        assert!(ApiError::RateLimited(30).user_message().contains("30 seconds"));
    }

    #[test]
    fn test_debug_hides_token() {
        let api = client("http://localhost:4000/");
        let authed = api.authed("secret-token");
        assert!(!format!("{authed:?}").contains("secret-token"));
    }
}
