// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Landing-page data loader.
//!
//! Loads the independent data sets behind the landing page (featured
//! products, featured listings, categories, banners) in parallel, caches each
//! under its own key and publishes a [`HeroSnapshot`] through a watch channel.
//!
//! - A fresh cache hit republishes the cached data without touching the
//!   network or the loading flag.
//! - Concurrent fetches of the same key share one in-flight request.
//! - A failure is recorded against its key only; the key keeps its previous
//!   data and sibling keys are unaffected.
//! - Dropping the last handle, or calling [`HeroLoader::shutdown`], cancels
//!   outstanding fetches and their results are discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use futures_util::future::{join_all, BoxFuture, FutureExt, Shared};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::cache::{CachedValue, TtlCache};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{Banner, Category, ListQuery, Product, RentalRequest};

const DEFAULT_LISTINGS_LIMIT: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeroResource {
    FeaturedProducts,
    FeaturedListings,
    Categories,
    Banners,
}

impl HeroResource {
    pub const ALL: [HeroResource; 4] = [
        HeroResource::FeaturedProducts,
        HeroResource::FeaturedListings,
        HeroResource::Categories,
        HeroResource::Banners,
    ];

    /// Logical cache key name.
    pub fn key(self) -> &'static str {
        match self {
            HeroResource::FeaturedProducts => "featuredProducts",
            HeroResource::FeaturedListings => "featuredListings",
            HeroResource::Categories => "categories",
            HeroResource::Banners => "banners",
        }
    }

    fn index(self) -> usize {
        match self {
            HeroResource::FeaturedProducts => 0,
            HeroResource::FeaturedListings => 1,
            HeroResource::Categories => 2,
            HeroResource::Banners => 3,
        }
    }
}

/// Cached value for one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum HeroPayload {
    Products(Vec<Product>),
    Listings(Vec<RentalRequest>),
    Categories(Vec<Category>),
    Banners(Vec<Banner>),
}

impl HeroPayload {
    pub fn resource(&self) -> HeroResource {
        match self {
            HeroPayload::Products(_) => HeroResource::FeaturedProducts,
            HeroPayload::Listings(_) => HeroResource::FeaturedListings,
            HeroPayload::Categories(_) => HeroResource::Categories,
            HeroPayload::Banners(_) => HeroResource::Banners,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HeroPayload::Products(items) => items.len(),
            HeroPayload::Listings(items) => items.len(),
            HeroPayload::Categories(items) => items.len(),
            HeroPayload::Banners(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the landing page renders from, plus per-key status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroSnapshot {
    pub featured_products: Vec<Product>,
    pub featured_listings: Vec<RentalRequest>,
    pub categories: Vec<Category>,
    pub banners: Vec<Banner>,
    loading: [bool; 4],
    errors: [Option<String>; 4],
    fetched_at: [Option<DateTime<Utc>>; 4],
}

impl HeroSnapshot {
    pub fn loading(&self, resource: HeroResource) -> bool {
        self.loading[resource.index()]
    }

    pub fn error(&self, resource: HeroResource) -> Option<&str> {
        self.errors[resource.index()].as_deref()
    }

    pub fn fetched_at(&self, resource: HeroResource) -> Option<DateTime<Utc>> {
        self.fetched_at[resource.index()]
    }

    /// True while any resource is loading.
    pub fn is_loading(&self) -> bool {
        self.loading.iter().any(|flag| *flag)
    }

    /// True while any resource holds an error.
    pub fn has_error(&self) -> bool {
        self.errors.iter().any(Option::is_some)
    }

    /// Install `payload` and settle its loading flag. The key's error is left
    /// to the caller.
    fn publish(&mut self, payload: HeroPayload, fetched_at: DateTime<Utc>) {
        let index = payload.resource().index();
        match payload {
            HeroPayload::Products(items) => self.featured_products = items,
            HeroPayload::Listings(items) => self.featured_listings = items,
            HeroPayload::Categories(items) => self.categories = items,
            HeroPayload::Banners(items) => self.banners = items,
        }
        self.loading[index] = false;
        self.fetched_at[index] = Some(fetched_at);
    }
}

/// Outcome of a parallel load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: Vec<HeroResource>,
    pub failed: Vec<(HeroResource, ApiError)>,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<HeroPayload, ApiError>>>;

#[derive(Clone)]
pub struct HeroLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    client: ApiClient,
    cache: TtlCache<HeroResource, HeroPayload>,
    in_flight: Mutex<HashMap<HeroResource, SharedFetch>>,
    state: watch::Sender<HeroSnapshot>,
    has_loaded: AtomicBool,
    cancel: CancellationToken,
    products_limit: u32,
    listings_limit: u32,
}

impl HeroLoader {
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        Self::with_cancellation(client, config, CancellationToken::new())
    }

    /// Tie the loader to an owner's lifetime; cancelling `token` tears it down.
    pub fn with_cancellation(client: ApiClient, config: &ClientConfig, token: CancellationToken) -> Self {
        let (state, _rx) = watch::channel(HeroSnapshot::default());
        Self {
            inner: Arc::new(LoaderInner {
                client,
                cache: TtlCache::new(config.cache_ttl),
                in_flight: Mutex::new(HashMap::new()),
                state,
                has_loaded: AtomicBool::new(false),
                cancel: token,
                products_limit: config.featured_limit,
                listings_limit: DEFAULT_LISTINGS_LIMIT,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HeroSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> HeroSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn has_error(&self) -> bool {
        self.inner.state.borrow().has_error()
    }

    /// Fetch one resource, honouring the cache and joining any in-flight
    /// request for the same key.
    pub async fn fetch(&self, resource: HeroResource) -> Result<HeroPayload, ApiError> {
        if self.inner.cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        if let Some(hit) = self.inner.cache.get_fresh(&resource).await {
            return Ok(self.inner.serve_hit(resource, hit));
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock().await;
            if let Some(existing) = in_flight.get(&resource) {
                tracing::debug!(resource = resource.key(), "joining in-flight fetch");
                if let Some(metrics) = self.inner.client.metrics() {
                    metrics.record_deduplicated();
                }
                existing.clone()
            } else if let Some(hit) = self.inner.cache.get_fresh(&resource).await {
                // a fetch finished between the first check and taking the lock
                return Ok(self.inner.serve_hit(resource, hit));
            } else {
                if let Some(metrics) = self.inner.client.metrics() {
                    metrics.record_cache_miss();
                }
                self.inner.state.send_modify(|snapshot| {
                    snapshot.loading[resource.index()] = true;
                    snapshot.errors[resource.index()] = None;
                });

                let pending = self.start_fetch(resource);
                in_flight.insert(resource, pending.clone());
                pending
            }
        };

        pending.await
    }

    pub async fn fetch_featured_products(&self) -> Result<Vec<Product>, ApiError> {
        match self.fetch(HeroResource::FeaturedProducts).await? {
            HeroPayload::Products(items) => Ok(items),
            other => Err(mismatch(HeroResource::FeaturedProducts, &other)),
        }
    }

    pub async fn fetch_featured_listings(&self) -> Result<Vec<RentalRequest>, ApiError> {
        match self.fetch(HeroResource::FeaturedListings).await? {
            HeroPayload::Listings(items) => Ok(items),
            other => Err(mismatch(HeroResource::FeaturedListings, &other)),
        }
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        match self.fetch(HeroResource::Categories).await? {
            HeroPayload::Categories(items) => Ok(items),
            other => Err(mismatch(HeroResource::Categories, &other)),
        }
    }

    pub async fn fetch_banners(&self) -> Result<Vec<Banner>, ApiError> {
        match self.fetch(HeroResource::Banners).await? {
            HeroPayload::Banners(items) => Ok(items),
            other => Err(mismatch(HeroResource::Banners, &other)),
        }
    }

    /// Fetch every resource concurrently; one failure never blocks the rest.
    pub async fn load_all(&self) -> LoadSummary {
        let results = join_all(HeroResource::ALL.into_iter().map(|resource| async move {
            (resource, self.fetch(resource).await)
        }))
        .await;

        let mut summary = LoadSummary::default();
        for (resource, result) in results {
            match result {
                Ok(_) => summary.loaded.push(resource),
                Err(error) => summary.failed.push((resource, error)),
            }
        }

        tracing::info!(
            loaded = summary.loaded.len(),
            failed = summary.failed.len(),
            "landing page data loaded"
        );
        summary
    }

    /// Run the initial load once; later calls are no-ops until the cache is
    /// cleared.
    pub async fn ensure_loaded(&self) -> Option<LoadSummary> {
        if self.inner.has_loaded.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.load_all().await)
    }

    /// Drop one key's cache entry and fetch it again.
    pub async fn refresh(&self, resource: HeroResource) -> Result<HeroPayload, ApiError> {
        self.inner.cache.invalidate(&resource).await;
        self.fetch(resource).await
    }

    pub async fn refresh_all(&self) -> LoadSummary {
        for resource in HeroResource::ALL {
            self.inner.cache.invalidate(&resource).await;
        }
        self.load_all().await
    }

    /// Wipe every cache entry and re-arm the one-shot load guard.
    pub async fn clear_cache(&self) {
        let removed = self.inner.cache.clear().await;
        self.inner.has_loaded.store(false, Ordering::SeqCst);
        tracing::debug!(removed, "landing page cache cleared");
    }

    /// Cancel outstanding fetches. Their results are discarded.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    fn start_fetch(&self, resource: HeroResource) -> SharedFetch {
        let client = self.inner.client.clone();
        let cancel = self.inner.cancel.clone();
        let limits = (self.inner.products_limit, self.inner.listings_limit);
        let owner: Weak<LoaderInner> = Arc::downgrade(&self.inner);

        // Spawned so the request settles even if every waiter goes away.
        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ApiError::Cancelled),
                result = fetch_payload(&client, resource, limits) => result,
            };

            if let Some(inner) = owner.upgrade() {
                inner.settle(resource, &outcome).await;
            }
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => Err(ApiError::Cancelled),
                Err(err) => Err(ApiError::network(format!("fetch task failed: {err}"))),
            }
        }
        .boxed()
        .shared()
    }
}

impl LoaderInner {
    fn serve_hit(&self, resource: HeroResource, hit: CachedValue<HeroPayload>) -> HeroPayload {
        tracing::trace!(resource = resource.key(), "cache hit");
        if let Some(metrics) = self.client.metrics() {
            metrics.record_cache_hit();
        }

        let CachedValue { value, fetched_at } = hit;
        let published = value.clone();
        self.state.send_if_modified(|snapshot| {
            let before = snapshot.clone();
            snapshot.publish(published, fetched_at);
            *snapshot != before
        });
        value
    }

    /// Record the outcome of a network fetch, then release the in-flight slot.
    async fn settle(&self, resource: HeroResource, outcome: &Result<HeroPayload, ApiError>) {
        match outcome {
            Ok(payload) => {
                let fetched_at = self.cache.insert(resource, payload.clone()).await;
                let published = payload.clone();
                self.state.send_modify(|snapshot| {
                    snapshot.publish(published, fetched_at);
                    snapshot.errors[resource.index()] = None;
                });
                tracing::debug!(resource = resource.key(), items = payload.len(), "resource loaded");
            }
            Err(ApiError::Cancelled) => {
                tracing::debug!(resource = resource.key(), "fetch cancelled; result discarded");
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(resource = resource.key(), kind = error.kind(), %message, "resource failed to load");
                self.state.send_modify(|snapshot| {
                    snapshot.loading[resource.index()] = false;
                    snapshot.errors[resource.index()] = Some(message);
                });
            }
        }

        self.in_flight.lock().await.remove(&resource);
    }
}

impl Drop for LoaderInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn fetch_payload(
    client: &ApiClient,
    resource: HeroResource,
    (products_limit, listings_limit): (u32, u32),
) -> Result<HeroPayload, ApiError> {
    match resource {
        HeroResource::FeaturedProducts => client
            .featured_products(products_limit)
            .await
            .map(HeroPayload::Products),
        HeroResource::FeaturedListings => client
            .featured_rental_requests(listings_limit)
            .await
            .map(HeroPayload::Listings),
        HeroResource::Categories => client
            .categories(&ListQuery::default())
            .await
            .map(|list| HeroPayload::Categories(list.categories)),
        HeroResource::Banners => client
            .banners(&ListQuery::default())
            .await
            .map(HeroPayload::Banners),
    }
}

fn mismatch(expected: HeroResource, got: &HeroPayload) -> ApiError {
    ApiError::schema(format!(
        "cache entry for {} holds {} data",
        expected.key(),
        got.resource().key()
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{json, Value};

    use super::*;
    use crate::testing::{client_for, StubTransport};

    fn products_body(count: usize) -> Value {
        let products: Vec<Value> = (0..count)
            .map(|i| json!({ "_id": format!("p{i}"), "name": format!("Item {i}"), "isFeatured": true }))
            .collect();
        json!({ "success": true, "data": { "products": products } })
    }

    fn stub_all(transport: &StubTransport) {
        transport.respond("/products/featured", 200, products_body(3));
        transport.respond(
            "/rental-requests/featured",
            200,
            json!({ "success": true, "data": { "rentalRequests": [
                { "_id": "r1", "title": "Projector", "status": "approved" }
            ] } }),
        );
        transport.respond(
            "/categories",
            200,
            json!({ "success": true, "data": { "categories": [
                { "_id": "c1", "name": "Electronics" },
                { "_id": "c2", "name": "Outdoor" }
            ] } }),
        );
        transport.respond(
            "/banners",
            200,
            json!({ "success": true, "data": { "banners": [{ "_id": "b1", "order": 1 }] } }),
        );
    }

    fn loader_for(transport: Arc<StubTransport>) -> HeroLoader {
        HeroLoader::new(client_for(transport), &ClientConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn featured_products_land_in_snapshot() {
        let transport = StubTransport::new();
        transport.respond_after(
            "/products/featured",
            200,
            products_body(12),
            Duration::from_secs(2),
        );
        let loader = loader_for(transport.clone());

        let products = loader.fetch_featured_products().await.unwrap();
        assert_eq!(products.len(), 12);

        let snapshot = loader.snapshot();
        assert_eq!(snapshot.featured_products, products);
        assert!(!snapshot.loading(HeroResource::FeaturedProducts));
        assert!(snapshot.error(HeroResource::FeaturedProducts).is_none());
        assert!(snapshot.fetched_at(HeroResource::FeaturedProducts).is_some());
        assert_eq!(
            transport.last_call().query,
            vec![("limit".to_string(), "12".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let loader = loader_for(transport.clone());

        let first = loader.fetch(HeroResource::Categories).await.unwrap();
        let mut rx = loader.subscribe();
        rx.borrow_and_update();

        tokio::time::advance(Duration::from_secs(299)).await;
        let second = loader.fetch(HeroResource::Categories).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls_to("/categories"), 1);
        assert!(!rx.has_changed().unwrap());
        assert!(!loader.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_after_ttl_overwrites_the_entry() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let loader = loader_for(transport.clone());

        loader.fetch(HeroResource::Banners).await.unwrap();

        transport.respond(
            "/banners",
            200,
            json!({ "success": true, "data": { "banners": [{ "_id": "b9", "order": 1 }] } }),
        );
        tokio::time::advance(Duration::from_secs(301)).await;
        let refetched = loader.fetch_banners().await.unwrap();
        assert_eq!(refetched[0].id, "b9");
        assert_eq!(loader.snapshot().banners[0].id, "b9");

        // the overwrite restarted the freshness window
        tokio::time::advance(Duration::from_secs(299)).await;
        let cached = loader.fetch_banners().await.unwrap();
        assert_eq!(cached[0].id, "b9");
        assert_eq!(transport.calls_to("/banners"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_settles_after_caller_gives_up() {
        let transport = StubTransport::new();
        transport.respond_after(
            "/banners",
            200,
            json!({ "success": true, "data": { "banners": [{ "_id": "b1", "order": 1 }] } }),
            Duration::from_secs(2),
        );
        let loader = loader_for(transport.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_secs(1), loader.fetch(HeroResource::Banners)).await;
        assert!(abandoned.is_err());
        assert!(loader.snapshot().loading(HeroResource::Banners));

        tokio::time::sleep(Duration::from_secs(60)).await;

        let snapshot = loader.snapshot();
        assert!(!snapshot.loading(HeroResource::Banners));
        assert!(!snapshot.is_loading());
        assert_eq!(snapshot.banners.len(), 1);

        loader.fetch(HeroResource::Banners).await.unwrap();
        assert_eq!(transport.calls_to("/banners"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_initial_load_still_completes() {
        let transport = StubTransport::new();
        stub_all(&transport);
        transport.respond_after("/categories", 200, json!({ "success": true, "data": { "categories": [
            { "_id": "c1", "name": "Electronics" }
        ] } }), Duration::from_secs(3));
        let loader = loader_for(transport.clone());

        let abandoned = tokio::time::timeout(Duration::from_secs(1), loader.ensure_loaded()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snapshot = loader.snapshot();
        assert!(!snapshot.is_loading());
        assert_eq!(snapshot.categories.len(), 1);
        assert!(loader.ensure_loaded().await.is_none());
    }

    #[test]
    fn cached_publish_leaves_error_in_place() {
        let mut snapshot = HeroSnapshot::default();
        snapshot.errors[HeroResource::Banners.index()] = Some("db down".to_string());

        snapshot.publish(HeroPayload::Banners(Vec::new()), Utc::now());

        assert!(!snapshot.loading(HeroResource::Banners));
        assert_eq!(snapshot.error(HeroResource::Banners), Some("db down"));
        assert!(snapshot.fetched_at(HeroResource::Banners).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetches_share_one_request() {
        let transport = StubTransport::new();
        transport.respond_after(
            "/products/featured",
            200,
            products_body(2),
            Duration::from_secs(3),
        );
        let loader = loader_for(transport.clone());

        let (a, b) = tokio::join!(
            loader.fetch(HeroResource::FeaturedProducts),
            loader.fetch(HeroResource::FeaturedProducts)
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(transport.calls_to("/products/featured"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failure_does_not_block_siblings() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let loader = loader_for(transport.clone());
        assert!(loader.load_all().await.is_complete());
        let categories_before = loader.snapshot().categories;

        transport.respond("/categories", 500, json!({ "success": false, "message": "db down" }));
        transport.respond_after("/banners", 200, json!({ "success": true, "data": { "banners": [
            { "_id": "b2", "order": 1 }
        ] } }), Duration::from_secs(5));

        let background = loader.clone();
        let task = tokio::spawn(async move { background.refresh_all().await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        let mid = loader.snapshot();
        assert!(mid.is_loading());
        assert!(mid.loading(HeroResource::Banners));
        assert!(!mid.loading(HeroResource::Categories));
        assert_eq!(mid.error(HeroResource::Categories), Some("db down"));

        let summary = task.await.unwrap();
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, HeroResource::Categories);

        let done = loader.snapshot();
        assert!(!done.is_loading());
        assert!(done.has_error());
        assert_eq!(done.categories, categories_before);
        assert_eq!(done.banners[0].id, "b2");
        assert!(done.error(HeroResource::Banners).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cache_forces_a_full_reload() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let loader = loader_for(transport.clone());

        assert!(loader.ensure_loaded().await.is_some());
        assert!(loader.ensure_loaded().await.is_none());
        assert_eq!(transport.calls().len(), 4);

        loader.clear_cache().await;
        let summary = loader.ensure_loaded().await.unwrap();
        assert!(summary.is_complete());
        assert_eq!(transport.calls().len(), 8);
        for path in ["/products/featured", "/rental-requests/featured", "/categories", "/banners"] {
            assert_eq!(transport.calls_to(path), 2, "{path}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_bypasses_a_fresh_entry() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let loader = loader_for(transport.clone());

        loader.fetch(HeroResource::FeaturedListings).await.unwrap();
        loader.refresh(HeroResource::FeaturedListings).await.unwrap();
        loader.fetch(HeroResource::Categories).await.unwrap();

        assert_eq!(transport.calls_to("/rental-requests/featured"), 2);
        assert_eq!(transport.calls_to("/categories"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_in_flight_results() {
        let transport = StubTransport::new();
        transport.respond_after(
            "/products/featured",
            200,
            products_body(5),
            Duration::from_secs(10),
        );
        let loader = loader_for(transport.clone());

        let background = loader.clone();
        let task = tokio::spawn(async move { background.fetch(HeroResource::FeaturedProducts).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        loader.shutdown();

        assert_eq!(task.await.unwrap(), Err(ApiError::Cancelled));
        assert!(loader.snapshot().featured_products.is_empty());
        assert_eq!(
            loader.fetch(HeroResource::Categories).await,
            Err(ApiError::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn parent_token_tears_down_loader() {
        let transport = StubTransport::new();
        stub_all(&transport);
        let parent = CancellationToken::new();
        let loader = HeroLoader::with_cancellation(
            client_for(transport.clone()),
            &ClientConfig::default(),
            parent.child_token(),
        );

        parent.cancel();
        assert_eq!(loader.fetch(HeroResource::Banners).await, Err(ApiError::Cancelled));
        assert!(transport.calls().is_empty());
    }
}
