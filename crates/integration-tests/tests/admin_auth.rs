//! Sign-in, sign-out and session expiry against a fake backend.

#![allow(clippy::unwrap_used)]

use axum::{http::HeaderMap, response::IntoResponse, routing::get};
use reqwest::StatusCode;

use ayucan_integration_tests::{
    Recorder, TestContext, authorized, fake_backend, location, page, unauthorized,
};

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let live = ctx.get("/health").await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "ok");

    let ready = ctx.get("/health/ready").await;
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_page_redirects_to_login() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let response = ctx.get("/orders").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn test_export_without_session_is_unauthorized() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let response = ctx.get("/export/orders.csv").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_page_renders() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let response = ctx.get("/auth/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("content-security-policy")
            .is_some()
    );
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"action="/auth/login""#));
}

#[tokio::test]
async fn test_wrong_password_shows_error() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let response = ctx
        .post_form(
            "/auth/login",
            &[("email", "asha@ayucan.in"), ("password", "nope")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid email or password."));
    assert!(body.contains("asha@ayucan.in"));
}

#[tokio::test]
async fn test_sign_in_and_out() {
    let ctx = TestContext::start(fake_backend(), Recorder::default()).await;

    let response = ctx.sign_in().await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response).as_deref(), Some("/"));

    let dashboard = ctx.get("/").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = dashboard.text().await.unwrap();
    assert!(body.contains("Welcome back, Asha Menon."));
    assert!(body.contains("asha@ayucan.in"));

    let logout = ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&logout).as_deref(), Some("/auth/login"));

    let after = ctx.get("/").await;
    assert_eq!(location(&after).as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn test_rejected_token_signs_admin_out() {
    async fn orders(headers: HeaderMap) -> axum::response::Response {
        if authorized(&headers) {
            // Token revoked on the backend after sign-in.
            return unauthorized();
        }
        page(vec![], 0, 1, 20).into_response()
    }
    let backend = fake_backend().route("/orders", get(orders));
    let ctx = TestContext::start(backend, Recorder::default()).await;
    ctx.sign_in().await;

    let response = ctx.get("/orders").await;
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));

    // The session is gone, so the dashboard now redirects as well.
    let after = ctx.get("/").await;
    assert_eq!(location(&after).as_deref(), Some("/auth/login"));

    let login = ctx.get("/auth/login").await;
    let body = login.text().await.unwrap();
    assert!(body.contains("Your session has expired. Please sign in again."));
}
