// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::TestAppBuilder;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use media_tools_node::api::HealthResponse;
use tower::ServiceExt; // for `oneshot`

async fn health(app: &crate::common::TestApp) -> HealthResponse {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_health_lists_all_services() {
    let app = TestAppBuilder::new().build().await;
    let health = health(&app).await;

    assert_eq!(health.status, "ok");
    assert_eq!(
        health.services,
        vec!["text_removal", "text_extraction", "text_to_speech"]
    );
    assert_eq!(health.version, media_tools_node::version::VERSION_NUMBER);
}

#[tokio::test]
async fn test_health_omits_removal_without_inpainter() {
    let app = TestAppBuilder::new().without_inpainter().build().await;
    let health = health(&app).await;

    assert!(!health.services.iter().any(|s| s == "text_removal"));
    assert_eq!(health.services.len(), 2);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestAppBuilder::new().build().await;
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
