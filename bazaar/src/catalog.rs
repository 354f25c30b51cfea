use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::Result;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{Category, Product};
use crate::identity::{self, EntityRef};
use crate::ports::CategoryRepository;

/// How long a cached category listing stays fresh.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(300);

pub struct CategoryListing {
    pub categories: Vec<Category>,
    pub served_from_cache: bool,
}

struct CacheEntry {
    categories: Vec<Category>,
    fetched_at: Instant,
}

/// Time-bounded cache in front of the category store. One slot shared by all
/// requests; owned by the composition root and injected wherever category
/// data is read.
///
/// Two concurrent cache-miss callers may both refetch. Accepted at this
/// scale; no single-flight lock.
pub struct CategoryCache {
    repo: Arc<dyn CategoryRepository>,
    slot: RwLock<Option<CacheEntry>>,
    freshness_window: Duration,
}

impl CategoryCache {
    pub fn new(repo: Arc<dyn CategoryRepository>, freshness_window: Duration) -> Self {
        Self {
            repo,
            slot: RwLock::new(None),
            freshness_window,
        }
    }

    /// Serve the active category listing, from memory when the cached entry
    /// is younger than the freshness window, otherwise from a fresh store
    /// query. A failed refresh leaves the existing entry untouched, so later
    /// callers can still be served stale-but-available data.
    pub async fn list(&self, force_refresh: bool) -> Result<CategoryListing> {
        if !force_refresh {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.as_ref() {
                if entry.fetched_at.elapsed() < self.freshness_window {
                    return Ok(CategoryListing {
                        categories: entry.categories.clone(),
                        served_from_cache: true,
                    });
                }
            }
        }

        let categories = self.repo.list_active().await?;
        debug!(count = categories.len(), "category cache refreshed");

        let mut slot = self.slot.write().await;
        *slot = Some(CacheEntry {
            categories: categories.clone(),
            fetched_at: Instant::now(),
        });

        Ok(CategoryListing {
            categories,
            served_from_cache: false,
        })
    }

    /// Discard the cached entry; the next `list` call queries the store.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

/// Products whose category reference resolves to `category`, whatever wire
/// shape each stored reference arrived in.
pub fn products_in_category(products: Vec<Product>, category: &EntityRef) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| identity::same_entity(Some(&p.category), Some(category)))
        .collect()
}
