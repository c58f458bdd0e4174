// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /speak

use crate::common::{MultipartBody, TestAppBuilder};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use bytes::Bytes;
use media_tools_node::tts::{SpeechSynthesizer, SynthesisError};
use mockall::{mock, predicate::eq};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

mock! {
    pub Synth {}

    #[async_trait]
    impl SpeechSynthesizer for Synth {
        async fn synthesize(&self, text: &str, language: &str, slow: bool) -> Result<Bytes, SynthesisError>;
    }
}

fn urlencoded(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/speak")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_speak_returns_mp3_attachment() {
    let mut synth = MockSynth::new();
    synth
        .expect_synthesize()
        .with(eq("Hello world"), eq("en"), eq(false))
        .times(1)
        .returning(|_, _, _| Ok(Bytes::from_static(b"ID3hello")));

    let app = TestAppBuilder::new().synthesizer(Arc::new(synth)).build().await;
    let response = app
        .router
        .oneshot(urlencoded("text=Hello+world"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=speech.mp3"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ID3hello");
}

#[tokio::test]
async fn test_speak_passes_language_and_slow_through() {
    let mut synth = MockSynth::new();
    synth
        .expect_synthesize()
        .with(eq("Bonjour"), eq("fr"), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(Bytes::from_static(b"ID3fr")));

    let app = TestAppBuilder::new().synthesizer(Arc::new(synth)).build().await;
    let body = MultipartBody::new()
        .text("text", "Bonjour")
        .text("language", "fr")
        .text("slow", "true")
        .finish();
    let request = Request::builder()
        .method("POST")
        .uri("/speak")
        .header(header::CONTENT_TYPE, MultipartBody::content_type())
        .body(Body::from(body))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_speak_without_text_never_calls_synthesizer() {
    for body in ["", "text=", "text=+++", "language=de"] {
        let mut synth = MockSynth::new();
        synth.expect_synthesize().times(0);

        let app = TestAppBuilder::new().synthesizer(Arc::new(synth)).build().await;
        let response = app.router.oneshot(urlencoded(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {:?}", body);

        let json: serde_json::Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap())
                .unwrap();
        assert_eq!(json["error_type"], "validation_error");
        assert_eq!(json["message"], "No text provided");
    }
}

#[tokio::test]
async fn test_speak_synthesis_failure_is_500() {
    let mut synth = MockSynth::new();
    synth
        .expect_synthesize()
        .returning(|_, language, _| {
            Err(SynthesisError::NoAudio {
                language: language.to_string(),
            })
        });

    let app = TestAppBuilder::new().synthesizer(Arc::new(synth)).build().await;
    let response = app
        .router
        .oneshot(urlencoded("text=hi&language=zz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(json["error_type"], "synthesis_error");
    assert!(json["message"].as_str().unwrap().contains("zz"));
}

#[tokio::test]
async fn test_speak_rejects_bad_slow_flag() {
    let mut synth = MockSynth::new();
    synth.expect_synthesize().times(0);

    let app = TestAppBuilder::new().synthesizer(Arc::new(synth)).build().await;
    let response = app
        .router
        .oneshot(urlencoded("text=hi&slow=sometimes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
