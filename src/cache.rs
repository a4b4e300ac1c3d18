//! In-memory caching using moka
//!
//! Saved quotations and the client directory are read far more often than
//! they change. Every write path invalidates the affected entries.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::QuotationStore;
use crate::quotation::{Client, Quotation};

/// Application cache holding saved quotations and client listings
#[derive(Clone)]
pub struct AppCache {
    /// Saved quotations (id -> Quotation)
    pub quotations: Cache<Uuid, Arc<Quotation>>,
    /// Client listings (cache_key -> Vec<Client>)
    pub clients: Cache<String, Arc<Vec<Client>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Quotations: 500 entries, 15 min TTL, 5 min idle
            quotations: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(15 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),

            // Client listings: active / all, 30 min TTL
            clients: Cache::builder()
                .max_capacity(2)
                .time_to_live(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            quotations_size: self.quotations.entry_count(),
            client_listings_size: self.clients.entry_count(),
        }
    }

    /// Drop a quotation after it was written
    pub async fn invalidate_quotation(&self, id: Uuid) {
        self.quotations.invalidate(&id).await;
        debug!("Cache invalidated for quotation: {}", id);
    }

    /// Drop client listings after the directory changed
    pub fn invalidate_clients(&self) {
        self.clients.invalidate_all();
    }

    /// Generate cache key for a client listing
    pub fn client_listing_key(active_only: bool) -> String {
        if active_only {
            "clients:active".to_string()
        } else {
            "clients:all".to_string()
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub quotations_size: u64,
    pub client_listings_size: u64,
}

/// Start background cache warmer
///
/// Warms the client directory on startup and refreshes it every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, store: Arc<dyn QuotationStore>) {
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, store.as_ref()).await;
    }
}

/// Warm the cache with commonly accessed data
pub async fn warm_cache(cache: &AppCache, store: &dyn QuotationStore) {
    info!("Starting cache warm-up...");

    match store.list_clients(true).await {
        Ok(clients) => {
            cache
                .clients
                .insert(AppCache::client_listing_key(true), Arc::new(clients))
                .await;
        }
        Err(e) => warn!("Failed to warm client cache: {}", e),
    }

    cache.clients.run_pending_tasks().await;
    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
