// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /remove-text

use crate::common::{file_count, png_bytes, sample_image, MultipartBody, TestAppBuilder};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use image::{ImageFormat, Rgb};
use media_tools_node::vision::{BoundingPolygon, Detection, LanguageSet};
use tower::ServiceExt; // for `oneshot`

fn remove_text_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/remove-text")
        .header(header::CONTENT_TYPE, MultipartBody::content_type())
        .body(Body::from(body))
        .unwrap()
}

fn upload(file_name: &str, data: &[u8], languages: Option<&str>) -> Request<Body> {
    let mut body = MultipartBody::new().file("image", file_name, "image/png", data);
    if let Some(languages) = languages {
        body = body.text("languages", languages);
    }
    remove_text_request(body.finish())
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_no_text_returns_identical_pixels() {
    let app = TestAppBuilder::new().build().await;
    let original = sample_image(48, 24);

    let response = send(&app.router, upload("photo.png", &png_bytes(&original), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"photo_cleaned.png\""
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let returned = image::load_from_memory_with_format(&body, ImageFormat::Png)
        .unwrap()
        .to_rgb8();
    assert_eq!(returned.dimensions(), original.dimensions());
    assert_eq!(returned.as_raw(), original.as_raw());
}

#[tokio::test]
async fn test_detected_region_is_inpainted() {
    let app = TestAppBuilder::new()
        .detections(vec![Detection::new(
            BoundingPolygon::from_rect(10, 8, 20, 8),
            "WORD",
            0.95,
        )])
        .build()
        .await;
    let original = sample_image(48, 24);

    let response = send(&app.router, upload("photo.png", &png_bytes(&original), Some("en"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let returned = image::load_from_memory(&body).unwrap().to_rgb8();

    assert_eq!(returned.dimensions(), (48, 24));
    assert_eq!(returned.get_pixel(15, 10), &Rgb([255, 255, 255]));
    assert_eq!(returned.get_pixel(0, 0), original.get_pixel(0, 0));
    assert_eq!(returned.get_pixel(47, 23), original.get_pixel(47, 23));
}

#[tokio::test]
async fn test_result_file_is_written_and_upload_removed() {
    let app = TestAppBuilder::new().build().await;

    let response = send(&app.router, upload("scan.png", &png_bytes(&sample_image(16, 16)), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    drop(to_bytes(response.into_body(), usize::MAX).await.unwrap());

    assert_eq!(file_count(app.store.upload_dir()), 0);
    let results: Vec<String> = std::fs::read_dir(app.store.result_dir())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].ends_with("_scan_cleaned.png"), "{:?}", results);
}

#[tokio::test]
async fn test_shared_result_name_when_unique_names_disabled() {
    let app = TestAppBuilder::new().unique_result_names(false).build().await;
    let data = png_bytes(&sample_image(16, 16));

    for _ in 0..2 {
        let response = send(&app.router, upload("same.png", &data, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(app.store.result_dir().join("same_cleaned.png").exists());
    assert_eq!(file_count(app.store.result_dir()), 1);
}

#[tokio::test]
async fn test_corrupt_upload_is_decode_error() {
    let app = TestAppBuilder::new().build().await;

    let response = send(&app.router, upload("broken.png", b"definitely not an image", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["error_type"], "decode_error");
    assert!(json["message"].as_str().unwrap().contains("broken.png"));

    assert_eq!(file_count(app.store.upload_dir()), 0);
    assert_eq!(file_count(app.store.result_dir()), 0);
}

#[tokio::test]
async fn test_missing_image_is_400() {
    let app = TestAppBuilder::new().build().await;

    let body = MultipartBody::new().text("languages", "en").finish();
    let response = send(&app.router, remove_text_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error_type"], "validation_error");
    assert_eq!(json["message"], "No image provided");
    assert_eq!(json["details"]["field"], "image");
    assert_eq!(app.factory.build_count(), 0);
}

#[tokio::test]
async fn test_empty_language_list_is_400() {
    let app = TestAppBuilder::new().build().await;

    let response = send(
        &app.router,
        upload("a.png", &png_bytes(&sample_image(8, 8)), Some(" , ")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["details"]["field"], "languages");
}

#[tokio::test]
async fn test_engine_reused_for_same_language_set() {
    let app = TestAppBuilder::new().build().await;
    let data = png_bytes(&sample_image(16, 16));

    for languages in ["en,ar", "ar, en", "ar,en,ar"] {
        let response = send(&app.router, upload("a.png", &data, Some(languages))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.factory.build_count(), 1);
    assert_eq!(app.engines.initializations(), 1);
}

#[tokio::test]
async fn test_engine_rebuilt_when_language_set_changes() {
    let app = TestAppBuilder::new().cache_capacity(1).build().await;
    let data = png_bytes(&sample_image(16, 16));

    for languages in ["en", "fr", "en"] {
        let response = send(&app.router, upload("a.png", &data, Some(languages))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let en = LanguageSet::parse("en").unwrap();
    let fr = LanguageSet::parse("fr").unwrap();
    assert_eq!(app.factory.created(), vec![en.clone(), fr, en.clone()]);
    assert_eq!(app.engines.cached_language_sets().await, vec![en]);
}

#[tokio::test]
async fn test_engine_init_failure_is_processing_error() {
    let app = TestAppBuilder::new().build().await;

    let response = send(
        &app.router,
        upload("a.png", &png_bytes(&sample_image(8, 8)), Some("broken")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error_type"], "processing_error");
    assert_eq!(file_count(app.store.upload_dir()), 0);
}

#[tokio::test]
async fn test_unavailable_without_inpainter() {
    let app = TestAppBuilder::new().without_inpainter().build().await;

    let response = send(&app.router, upload("a.png", &png_bytes(&sample_image(8, 8)), None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error_type"], "service_unavailable");
    assert_eq!(app.factory.build_count(), 0);
}

#[tokio::test]
async fn test_jpeg_upload_keeps_format() {
    let app = TestAppBuilder::new().build().await;

    let mut jpeg = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(sample_image(32, 16))
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .unwrap();

    let body = MultipartBody::new()
        .file("image", "holiday.jpg", "image/jpeg", jpeg.get_ref())
        .finish();
    let response = send(&app.router, remove_text_request(body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"holiday_cleaned.jpg\""
    );
}

#[tokio::test]
async fn test_path_like_language_code_is_400() {
    let app = TestAppBuilder::new().build().await;

    let response = send(
        &app.router,
        upload("a.png", &png_bytes(&sample_image(8, 8)), Some("../../../etc,en")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["details"]["field"], "languages");
    assert!(json["message"].as_str().unwrap().contains("../../../etc"));
    assert_eq!(app.factory.build_count(), 0);
}
