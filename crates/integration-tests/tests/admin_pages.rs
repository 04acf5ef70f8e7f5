//! Dashboard, analytics, catalog uploads and moderation actions against a
//! fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Json,
    extract::{Multipart, Path, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use ayucan_integration_tests::{
    Recorder, TestContext, authorized, data, fake_backend, location, page, unauthorized,
};

/// A 1x1 transparent PNG.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

// =============================================================================
// Fake backend
// =============================================================================

fn order() -> Value {
    json!({
        "id": "ord_1",
        "order_number": "AYU-1042",
        "customer": {"name": "Meera Iyer"},
        "subtotal": 1180,
        "total": 1180,
        "payment_status": "paid",
        "status": "pending",
        "created_at": "2026-03-14T09:30:00Z"
    })
}

fn review(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "product_id": "prod_1",
        "product_name": "Kumkumadi Face Oil",
        "customer_name": "Divya Nair",
        "rating": 4,
        "comment": "Light and absorbs quickly.",
        "status": status,
        "created_at": "2026-03-12T15:00:00Z"
    })
}

fn coupon(is_active: bool) -> Value {
    json!({
        "id": "cpn_1",
        "code": "NEEM10",
        "discount_type": "percentage",
        "value": 10,
        "is_active": is_active
    })
}

fn reward(points: i64) -> Value {
    json!({
        "id": "rwd_1",
        "customer_id": "cus_7",
        "customer_name": "Meera Iyer",
        "points": points,
        "reason": "Damaged parcel",
        "created_at": "2026-03-14T10:00:00Z"
    })
}

/// A list endpoint serving `rows` and recording the query string.
fn list(
    recorder: &Recorder,
    path: &str,
    headers: &HeaderMap,
    raw: Option<&str>,
    rows: Vec<Value>,
    total: u64,
) -> Response {
    if !authorized(headers) {
        return unauthorized();
    }
    recorder.record("GET", path, raw, Value::Null);
    page(rows, total, 1, 20).into_response()
}

async fn summary(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("GET", "/analytics/summary", raw.as_deref(), Value::Null);
    data(json!({
        "revenue": 125_000,
        "orders": 84,
        "average_order_value": "1488.10",
        "new_customers": 12,
        "offline_revenue": 9_450
    }))
    .into_response()
}

async fn sales(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("GET", "/analytics/sales", raw.as_deref(), Value::Null);
    data(json!([
        {"label": "2026-03-12", "revenue": 4_200, "orders": 3},
        {"label": "2026-03-13", "revenue": 0, "orders": 0},
        {"label": "2026-03-14", "revenue": 6_800, "orders": 5}
    ]))
    .into_response()
}

async fn top_products(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("GET", "/analytics/top-products", raw.as_deref(), Value::Null);
    data(json!([
        {"product_id": "prod_1", "name": "Kumkumadi Face Oil", "quantity": 31, "revenue": 27_869}
    ]))
    .into_response()
}

async fn orders(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/orders", &headers, raw.as_deref(), vec![order()], 1)
}

async fn reviews(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/reviews", &headers, raw.as_deref(), vec![review("rev_1", "pending")], 3)
}

async fn products(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/products", &headers, raw.as_deref(), Vec::new(), 42)
}

async fn customers(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/customers", &headers, raw.as_deref(), Vec::new(), 17)
}

async fn categories(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/categories", &headers, raw.as_deref(), Vec::new(), 0)
}

async fn coupons(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/coupons", &headers, raw.as_deref(), vec![coupon(false)], 1)
}

async fn rewards(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    list(&recorder, "/rewards", &headers, raw.as_deref(), vec![reward(-50)], 1)
}

async fn create_product(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("POST", "/products", None, body.clone());
    data(json!({
        "id": "prod_7",
        "name": body["name"],
        "price": body["price"],
        "status": "active"
    }))
    .into_response()
}

/// Records each uploaded part as `{field, file_name, content_type, size}`.
async fn upload_images(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let size = field.bytes().await.unwrap().len();
        parts.push(json!({
            "field": name,
            "file_name": file_name,
            "content_type": content_type,
            "size": size
        }));
    }
    recorder.record("POST", &format!("/products/{id}/images"), None, Value::Array(parts));
    data(json!([{"id": "img_1", "url": "https://cdn.ayucan.in/prod_7/img_1.png"}])).into_response()
}

async fn set_coupon_status(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("PATCH", &format!("/coupons/{id}/status"), None, body.clone());
    data(coupon(body["is_active"].as_bool().unwrap_or_default())).into_response()
}

async fn set_review_status(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("PATCH", &format!("/reviews/{id}/status"), None, body.clone());
    data(review(&id, body["status"].as_str().unwrap_or_default())).into_response()
}

async fn adjust_rewards(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    recorder.record("POST", "/rewards/adjust", None, body.clone());
    data(reward(body["points"].as_i64().unwrap_or_default())).into_response()
}

async fn started() -> TestContext {
    let backend = fake_backend()
        .route("/analytics/summary", get(summary))
        .route("/analytics/sales", get(sales))
        .route("/analytics/top-products", get(top_products))
        .route("/orders", get(orders))
        .route("/reviews", get(reviews))
        .route("/reviews/{id}/status", patch(set_review_status))
        .route("/products", get(products).post(create_product))
        .route("/products/{id}/images", post(upload_images))
        .route("/customers", get(customers))
        .route("/categories", get(categories))
        .route("/coupons", get(coupons))
        .route("/coupons/{id}/status", patch(set_coupon_status))
        .route("/rewards", get(rewards))
        .route("/rewards/adjust", post(adjust_rewards));
    let ctx = TestContext::start(backend, Recorder::default()).await;
    ctx.sign_in().await;
    ctx
}

fn product_form(file_name: &str, content_type: &str, bytes: &'static [u8]) -> Form {
    let image = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(content_type)
        .unwrap();
    Form::new()
        .text("name", "Neem Face Wash")
        .text("price", "349")
        .text("stock", "25")
        .text("status", "active")
        .text("tax_rate", "18")
        .part("images", image)
}

async fn post_multipart(ctx: &TestContext, path: &str, form: Form) -> reqwest::Response {
    ctx.client
        .post(ctx.url(path))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_dashboard_shows_metrics_and_recent_activity() {
    let ctx = started().await;

    let response = ctx.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("₹1,25,000.00"));
    assert!(html.contains("₹9,450.00"));
    assert!(html.contains(r#"<span class="metric-value">42</span>"#));
    assert!(html.contains(r#"<span class="metric-value">17</span>"#));
    // Pending reviews count is the list total, not the rows served.
    assert!(html.contains(r#"<span class="metric-value">3</span>"#));
    assert!(html.contains("AYU-1042"));
    assert!(html.contains("Meera Iyer"));
    assert!(html.contains("Kumkumadi Face Oil"));
    assert!(html.contains("Revenue, last 7 days"));
    assert!(html.contains("<rect"));
    assert!(!html.contains("toast-error"));

    let summary = ctx.recorder.requests_to("/analytics/summary");
    assert_eq!(summary[0].query, "range=30d");
    let series = ctx.recorder.requests_to("/analytics/sales");
    assert_eq!(series[0].query, "range=7d&interval=day");
    let reviews = ctx.recorder.requests_to("/reviews");
    assert!(reviews[0].query.contains("status=pending"));
}

#[tokio::test]
async fn test_analytics_uses_the_chosen_range() {
    let ctx = started().await;

    let response = ctx.get("/analytics?range=7d").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("Last 7 days"));
    assert!(html.contains("Kumkumadi Face Oil"));
    assert!(html.contains("₹27,869.00"));
    assert!(html.contains("<rect"));

    let series = ctx.recorder.requests_to("/analytics/sales");
    assert_eq!(series[0].query, "range=7d&interval=day");
    let top = ctx.recorder.requests_to("/analytics/top-products");
    assert_eq!(top[0].query, "range=7d&limit=10");
}

#[tokio::test]
async fn test_analytics_falls_back_on_unknown_range() {
    let ctx = started().await;

    let html = ctx.get("/analytics?range=forever").await.text().await.unwrap();
    assert!(html.contains("Last 30 days"));

    let summary = ctx.recorder.requests_to("/analytics/summary");
    assert_eq!(summary[0].query, "range=30d");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_create_uploads_images() {
    let ctx = started().await;

    let response = post_multipart(
        &ctx,
        "/products",
        product_form("face-wash.png", "image/png", PIXEL_PNG),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/products"));

    let created = ctx.recorder.requests_to("/products");
    let created: Vec<_> = created.iter().filter(|r| r.method == "POST").collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].body["name"], "Neem Face Wash");
    assert_eq!(created[0].body["stock"], 25);

    let uploads = ctx.recorder.requests_to("/products/prod_7/images");
    assert_eq!(uploads.len(), 1);
    let parts = uploads[0].body.as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["field"], "images");
    assert_eq!(parts[0]["file_name"], "face-wash.png");
    assert_eq!(parts[0]["content_type"], "image/png");
    assert_eq!(parts[0]["size"], PIXEL_PNG.len());

    let html = ctx.get("/products").await.text().await.unwrap();
    assert!(html.contains("Created Neem Face Wash."));
}

#[tokio::test]
async fn test_product_with_non_image_rerenders_form() {
    let ctx = started().await;

    let response = post_multipart(
        &ctx,
        "/products",
        product_form("notes.txt", "text/plain", b"not a picture"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("notes.txt is not an image."));
    assert!(html.contains(r#"value="Neem Face Wash""#));

    let created = ctx.recorder.requests_to("/products");
    assert!(created.iter().all(|r| r.method != "POST"));
    assert!(ctx.recorder.requests_to("/products/prod_7/images").is_empty());
}

// =============================================================================
// Moderation and marketing actions
// =============================================================================

#[tokio::test]
async fn test_coupon_toggle_sends_status() {
    let ctx = started().await;

    let response = ctx.post_form("/coupons/cpn_1/toggle", &[("active", "false")]).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/coupons"));

    let patches = ctx.recorder.requests_to("/coupons/cpn_1/status");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].method, "PATCH");
    assert_eq!(patches[0].body, json!({"is_active": false}));

    let html = ctx.get("/coupons").await.text().await.unwrap();
    assert!(html.contains("Coupon deactivated."));
    assert!(html.contains("NEEM10"));
}

#[tokio::test]
async fn test_review_approve_and_reject() {
    let ctx = started().await;

    let response = ctx.post_form("/reviews/rev_1/approve", &[]).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/reviews"));
    let html = ctx.get("/reviews").await.text().await.unwrap();
    assert!(html.contains("Review approved."));

    let response = ctx.post_form("/reviews/rev_2/reject", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/reviews"));
    let html = ctx.get("/reviews").await.text().await.unwrap();
    assert!(html.contains("Review rejected."));

    let approved = ctx.recorder.requests_to("/reviews/rev_1/status");
    assert_eq!(approved[0].body, json!({"status": "approved"}));
    let rejected = ctx.recorder.requests_to("/reviews/rev_2/status");
    assert_eq!(rejected[0].body, json!({"status": "rejected"}));
}

#[tokio::test]
async fn test_rewards_adjust_debits_points() {
    let ctx = started().await;

    let response = ctx
        .post_form(
            "/rewards/adjust",
            &[
                ("customer_id", "cus_7"),
                ("points", "-50"),
                ("reason", "Damaged parcel"),
            ],
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response).as_deref(),
        Some("/rewards?customer_id=cus_7")
    );

    let adjustments = ctx.recorder.requests_to("/rewards/adjust");
    assert_eq!(adjustments.len(), 1);
    assert_eq!(
        adjustments[0].body,
        json!({"customer_id": "cus_7", "points": -50, "reason": "Damaged parcel"})
    );

    let html = ctx.get("/rewards?customer_id=cus_7").await.text().await.unwrap();
    assert!(html.contains("-50 points applied."));
    let ledger = ctx.recorder.requests_to("/rewards");
    assert!(ledger[0].query.contains("customer_id=cus_7"));
}

#[tokio::test]
async fn test_rewards_adjust_rejects_zero_points() {
    let ctx = started().await;

    let response = ctx
        .post_form(
            "/rewards/adjust",
            &[("customer_id", "cus_7"), ("points", "0"), ("reason", "Oops")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/rewards"));
    assert!(ctx.recorder.requests_to("/rewards/adjust").is_empty());

    let html = ctx.get("/rewards").await.text().await.unwrap();
    assert!(html.contains("Points cannot be zero."));
}
