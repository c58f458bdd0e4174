// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-keyed OCR engine cache
//!
//! Engines are expensive to build, so one is kept per language set and
//! reused across requests. The map lock is only held to find or insert a
//! key's slot; the engine itself is built outside it, in the slot's
//! `OnceCell`. Concurrent requests for the same new set build it once,
//! requests for other sets are not held up by the build, and a request
//! always receives an engine for exactly the set it asked for.

use anyhow::Context;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use super::engine::{OcrEngine, OcrEngineFactory};
use super::languages::LanguageSet;
use crate::error::ServiceError;

/// Default number of language sets kept loaded
pub const DEFAULT_ENGINE_CACHE_CAPACITY: usize = 4;

/// An engine that is built at most once, on first use
type EngineSlot = Arc<OnceCell<Arc<dyn OcrEngine>>>;

pub struct EngineCache {
    factory: Arc<dyn OcrEngineFactory>,
    slots: Mutex<LruCache<LanguageSet, EngineSlot>>,
    capacity: NonZeroUsize,
    initializations: AtomicU64,
}

impl EngineCache {
    /// Create a cache holding at most `capacity` engines (minimum 1)
    pub fn new(factory: Arc<dyn OcrEngineFactory>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            factory,
            slots: Mutex::new(LruCache::new(capacity)),
            capacity,
            initializations: AtomicU64::new(0),
        }
    }

    /// Get the engine for `languages`, building it on a miss
    ///
    /// Failed builds are not cached; the next request retries.
    pub async fn get_engine(
        &self,
        languages: &LanguageSet,
    ) -> Result<Arc<dyn OcrEngine>, ServiceError> {
        let slot = self.slot(languages).await;

        if let Some(engine) = slot.get() {
            debug!("Reusing OCR engine for languages: {}", languages);
            return Ok(engine.clone());
        }

        let built = slot
            .get_or_try_init(|| async {
                info!("Initializing OCR engine with languages: {}", languages);
                let engine = self
                    .factory
                    .create(languages)
                    .await
                    .with_context(|| {
                        format!("Failed to initialize OCR engine for languages: {}", languages)
                    })?;
                self.initializations.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(engine)
            })
            .await;

        match built {
            Ok(engine) => Ok(engine.clone()),
            Err(e) => {
                self.discard_failed(languages, &slot).await;
                Err(ServiceError::processing(e))
            }
        }
    }

    /// Find or insert the slot for `languages`, marking it most recently used
    async fn slot(&self, languages: &LanguageSet) -> EngineSlot {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get(languages) {
            return slot.clone();
        }

        let slot = EngineSlot::default();
        if let Some((evicted, _)) = slots.push(languages.clone(), slot.clone()) {
            debug!("Evicted OCR engine for languages: {}", evicted);
        }
        slot
    }

    /// Drop an empty slot left behind by a failed build
    async fn discard_failed(&self, languages: &LanguageSet, slot: &EngineSlot) {
        let mut slots = self.slots.lock().await;
        let stale = slots
            .peek(languages)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            slots.pop(languages);
        }
    }

    /// Total number of engines built since startup
    pub fn initializations(&self) -> u64 {
        self.initializations.load(Ordering::SeqCst)
    }

    /// Number of built engines currently cached
    pub async fn len(&self) -> usize {
        self.slots
            .lock()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Language sets with a built engine, most recently used first
    pub async fn cached_language_sets(&self) -> Vec<LanguageSet> {
        self.slots
            .lock()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(languages, _)| languages.clone())
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
