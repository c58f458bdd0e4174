// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use media_tools_node::{
    api::{create_router, start_server, AppState},
    config::NodeConfig,
    storage::{spawn_retention_task, TempFileStore},
    tts::GoogleTts,
    version,
    vision::{default_inpainter, ocr::PaddleOcrFactory, EngineCache},
};
use std::{env, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::parse();
    let addr = config.bind_addr()?;

    println!("🚀 Starting {}...", version::get_version_string());

    // Storage
    let store = TempFileStore::new(
        &config.upload_dir,
        &config.result_dir,
        config.unique_result_names,
    )
    .await
    .context("Failed to prepare upload/result directories")?;
    store.purge_uploads().await?;
    let _retention = spawn_retention_task(
        store.result_dir().to_path_buf(),
        config.retention_policy(),
        config.retention_interval(),
    );

    // OCR engines are built lazily, per language set
    let factory = Arc::new(PaddleOcrFactory::new(&config.ocr_model_dir));
    let engines = Arc::new(EngineCache::new(factory, config.engine_cache_capacity));
    info!(
        "OCR models: {} (engine cache capacity {})",
        config.ocr_model_dir.display(),
        engines.capacity()
    );

    let synthesizer = Arc::new(GoogleTts::new(&config.tts_tld, config.tts_timeout())?);
    let inpainter = default_inpainter();
    if let Some(inpainter) = &inpainter {
        info!("Inpainting backend: {}", inpainter.name());
    }

    let state = AppState::new(store, engines, synthesizer, inpainter);
    info!("Services: {}", state.available_services().join(", "));

    let app = create_router(state, config.max_body_bytes);

    println!("✅ Listening on http://{}", addr);
    start_server(addr, app).await
}
