// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Engine cache behaviour under concurrent requests

use crate::common::FakeOcrFactory;
use futures::future::join_all;
use media_tools_node::vision::{EngineCache, LanguageSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn set(list: &str) -> LanguageSet {
    LanguageSet::parse(list).unwrap()
}

#[tokio::test]
async fn test_concurrent_same_set_builds_once() {
    let factory = Arc::new(FakeOcrFactory::with_delay(Vec::new(), Duration::from_millis(50)));
    let cache = Arc::new(EngineCache::new(factory.clone(), 4));

    let tasks = (0..8).map(|_| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_engine(&set("en,ar")).await })
    });

    let engines: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(factory.build_count(), 1);
    assert_eq!(cache.initializations(), 1);
    assert!(engines.iter().all(|e| Arc::ptr_eq(e, &engines[0])));
    assert_eq!(engines[0].languages(), &set("ar,en"));
}

#[tokio::test]
async fn test_concurrent_different_sets_get_their_own_engine() {
    let factory = Arc::new(FakeOcrFactory::with_delay(Vec::new(), Duration::from_millis(20)));
    let cache = Arc::new(EngineCache::new(factory.clone(), 1));

    let tasks = ["en", "fr", "de", "en", "fr"].into_iter().map(|list| {
        let cache = cache.clone();
        tokio::spawn(async move {
            let engine = cache.get_engine(&set(list)).await.unwrap();
            (set(list), engine.languages().clone())
        })
    });

    for joined in join_all(tasks).await {
        let (requested, served) = joined.unwrap();
        assert_eq!(requested, served, "request must be served by an engine for its own set");
    }

    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_different_sets_build_in_parallel() {
    let factory = Arc::new(FakeOcrFactory::with_delay(Vec::new(), Duration::from_millis(100)));
    let cache = Arc::new(EngineCache::new(factory.clone(), 4));

    let tasks = ["en", "fr", "de"].into_iter().map(|list| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_engine(&set(list)).await })
    });

    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    assert!(factory.max_concurrent_builds() >= 2);
    assert_eq!(factory.build_count(), 3);
    assert_eq!(cache.len().await, 3);
}

#[tokio::test]
async fn test_cache_hit_is_not_blocked_by_unrelated_build() {
    let delay = Duration::from_millis(400);
    let factory = Arc::new(FakeOcrFactory::with_delay(Vec::new(), delay));
    let cache = Arc::new(EngineCache::new(factory.clone(), 4));

    let en = cache.get_engine(&set("en")).await.unwrap();

    let building = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_engine(&set("fr")).await })
    };
    // Let the "fr" build start
    tokio::time::sleep(Duration::from_millis(20)).await;

    let started = Instant::now();
    let hit = cache.get_engine(&set("en")).await.unwrap();
    let waited = started.elapsed();

    assert!(Arc::ptr_eq(&en, &hit));
    assert!(
        waited < Duration::from_millis(100),
        "cache hit waited {:?} behind an unrelated build",
        waited
    );
    assert!(!building.is_finished());

    building.await.unwrap().unwrap();
    assert_eq!(factory.build_count(), 2);
}

#[tokio::test]
async fn test_failed_build_is_not_cached() {
    let factory = Arc::new(FakeOcrFactory::new(Vec::new()));
    let cache = EngineCache::new(factory.clone(), 4);

    assert!(cache.get_engine(&set("broken")).await.is_err());
    assert!(cache.get_engine(&set("broken")).await.is_err());
    assert!(cache.is_empty().await);
    assert_eq!(cache.initializations(), 0);

    cache.get_engine(&set("en")).await.unwrap();
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_least_recently_used_set_is_evicted() {
    let factory = Arc::new(FakeOcrFactory::new(Vec::new()));
    let cache = EngineCache::new(factory.clone(), 2);

    cache.get_engine(&set("en")).await.unwrap();
    cache.get_engine(&set("fr")).await.unwrap();
    cache.get_engine(&set("en")).await.unwrap();
    cache.get_engine(&set("de")).await.unwrap();

    assert_eq!(cache.cached_language_sets().await, vec![set("de"), set("en")]);
    assert_eq!(factory.build_count(), 3);
}
