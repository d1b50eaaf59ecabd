//! # Report Cache
//! Memoizes reports by normalized company name for the life of the process.
//!
//! Every key owns a `tokio::sync::OnceCell`. The table lock is only held to
//! find or create a cell; fetching and building run outside it, and callers
//! racing on the same uncached company await the same initialization. So a
//! company's articles are fetched at most once, and every caller gets the
//! same `Arc<Report>`. A failed fetch drops the key's slot, so it holds no
//! capacity and the next lookup retries.
//!
//! With a capacity set, inserting a new key beyond it evicts the least
//! recently used finished report. Builds still in flight are not evicted.
//! Without a capacity the table grows without bound.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use metrics::{counter, gauge};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::report::{Article, Report, ReportAggregator};

/// Cache key for a company: trimmed and lowercased.
pub fn normalize_company(company: &str) -> String {
    company.trim().to_lowercase()
}

struct Slot {
    cell: Arc<OnceCell<Arc<Report>>>,
    last_used: u64,
}

#[derive(Default)]
struct Slots {
    map: HashMap<String, Slot>,
    tick: u64,
}

pub struct ReportCache {
    aggregator: ReportAggregator,
    capacity: Option<usize>,
    slots: Mutex<Slots>,
}

impl ReportCache {
    /// `capacity = None` keeps every report until the process exits.
    pub fn new(aggregator: ReportAggregator, capacity: Option<usize>) -> Self {
        Self {
            aggregator,
            capacity: capacity.map(|c| c.max(1)),
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn unbounded(aggregator: ReportAggregator) -> Self {
        Self::new(aggregator, None)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Cached report for `company`, or fetch + build + store on a miss.
    ///
    /// `fetch_articles` runs only on a miss, and at most once per key even when
    /// lookups race. Its error is returned as-is and nothing is stored.
    pub async fn get_or_build<F, Fut>(
        &self,
        company: &str,
        fetch_articles: F,
    ) -> anyhow::Result<Arc<Report>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<Article>>>,
    {
        let key = normalize_company(company);
        let cell = self.cell_for(&key);

        if let Some(hit) = cell.get() {
            counter!("news_cache_hits_total").increment(1);
            debug!(target: "cache", company = %key, "cache hit");
            return Ok(Arc::clone(hit));
        }

        let aggregator = &self.aggregator;
        let key_ref = key.as_str();
        let ran_init = AtomicBool::new(false);
        let ran_init_ref = &ran_init;
        let result = cell
            .get_or_try_init(move || async move {
                ran_init_ref.store(true, Ordering::Relaxed);
                counter!("news_cache_misses_total").increment(1);
                debug!(target: "cache", company = %key_ref, "cache miss; fetching articles");
                let articles = fetch_articles().await?;
                let report = aggregator.build_report(key_ref, articles);
                info!(
                    target: "cache",
                    company = %key_ref,
                    articles = report.articles.len(),
                    "report cached"
                );
                Ok::<_, anyhow::Error>(Arc::new(report))
            })
            .await;

        match result {
            Ok(report) => {
                if !ran_init.load(Ordering::Relaxed) {
                    // Served by another caller's build.
                    counter!("news_cache_hits_total").increment(1);
                    debug!(target: "cache", company = %key, "cache hit after in-flight build");
                }
                Ok(Arc::clone(report))
            }
            Err(e) => {
                self.forget_failed(&key, &cell);
                Err(e)
            }
        }
    }

    /// Number of keys currently held (including in-flight builds).
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a finished report is stored for `company`.
    pub fn contains(&self, company: &str) -> bool {
        let key = normalize_company(company);
        self.lock()
            .map
            .get(&key)
            .is_some_and(|slot| slot.cell.initialized())
    }

    fn cell_for(&self, key: &str) -> Arc<OnceCell<Arc<Report>>> {
        let mut slots = self.lock();
        slots.tick += 1;
        let tick = slots.tick;

        if let Some(slot) = slots.map.get_mut(key) {
            slot.last_used = tick;
            return Arc::clone(&slot.cell);
        }

        if let Some(cap) = self.capacity {
            while slots.map.len() >= cap {
                // In-flight builds are never evicted; the table may briefly exceed `cap`.
                let Some(oldest) = slots
                    .map
                    .iter()
                    .filter(|(_, slot)| slot.cell.initialized())
                    .min_by_key(|(_, slot)| slot.last_used)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                slots.map.remove(&oldest);
                counter!("news_cache_evictions_total").increment(1);
                debug!(target: "cache", company = %oldest, "evicted least recently used");
            }
        }

        let cell = Arc::new(OnceCell::new());
        slots.map.insert(
            key.to_string(),
            Slot {
                cell: Arc::clone(&cell),
                last_used: tick,
            },
        );
        gauge!("news_cache_entries").set(slots.map.len() as f64);
        cell
    }

    /// Drop the slot of a failed build so it holds no capacity, unless the key
    /// has since been replaced or another caller filled the cell.
    fn forget_failed(&self, key: &str, cell: &Arc<OnceCell<Arc<Report>>>) {
        let mut slots = self.lock();
        let stale = slots
            .map
            .get(key)
            .is_some_and(|slot| Arc::ptr_eq(&slot.cell, cell) && !slot.cell.initialized());
        if stale {
            slots.map.remove(key);
            gauge!("news_cache_entries").set(slots.map.len() as f64);
            debug!(target: "cache", company = %key, "dropped slot of failed build");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
