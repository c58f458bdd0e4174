// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::extract_text::extract_text_handler;
use super::health::health_handler;
use super::remove_text::remove_text_handler;
use super::speak::speak_handler;
use crate::storage::TempFileStore;
use crate::tts::{SpeechService, SpeechSynthesizer};
use crate::version::{SERVICE_TEXT_EXTRACTION, SERVICE_TEXT_REMOVAL, SERVICE_TEXT_TO_SPEECH};
use crate::vision::{EngineCache, Inpainter, TextExtractionService, TextRemovalService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: TempFileStore,
    pub speech: SpeechService,
    pub extraction: Arc<TextExtractionService>,
    /// Absent when no inpainting backend is available
    pub removal: Option<Arc<TextRemovalService>>,
    pub engines: Arc<EngineCache>,
}

impl AppState {
    pub fn new(
        store: TempFileStore,
        engines: Arc<EngineCache>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        inpainter: Option<Arc<dyn Inpainter>>,
    ) -> Self {
        let removal = inpainter.map(|inpainter| {
            Arc::new(TextRemovalService::new(
                engines.clone(),
                inpainter,
                store.clone(),
            ))
        });

        Self {
            speech: SpeechService::new(synthesizer),
            extraction: Arc::new(TextExtractionService::new(engines.clone())),
            removal,
            engines,
            store,
        }
    }

    /// Names of the services this node can currently serve
    pub fn available_services(&self) -> Vec<&'static str> {
        let mut services = Vec::with_capacity(3);
        if self.removal.is_some() {
            services.push(SERVICE_TEXT_REMOVAL);
        }
        services.push(SERVICE_TEXT_EXTRACTION);
        services.push(SERVICE_TEXT_TO_SPEECH);
        services
    }
}

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/speak", post(speak_handler))
        .route("/remove-text", post(remove_text_handler))
        .route("/extract-text", post(extract_text_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
