//! Explicit TTL caching for catalog reads.
//!
//! The backing store is a low-throughput, quota-limited remote
//! spreadsheet; batching whole-catalog reads and caching them for
//! minutes keeps interactive latency acceptable and avoids quota
//! exhaustion under bursty chat traffic. The cache is an explicit
//! service object constructed once at process start; time comes in
//! through a [`Clock`] so expiry is testable, and each entry class has
//! its own TTL. Refreshes replace entries atomically (last writer
//! wins); stale reads during a refresh are acceptable.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{Product, Vendor};

/// Vendor-list TTL in seconds.
const VENDOR_TTL_SECS: i64 = 600;

/// Product-catalog TTL in seconds.
const PRODUCT_TTL_SECS: i64 = 300;

/// Source of wall-clock time, injectable for tests.
pub trait Clock: core::fmt::Debug + Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A cached value together with the time it was stored.
#[derive(Debug)]
struct CacheEntry<T> {
    /// The cached value.
    value: T,
    /// When the value was stored.
    stored_at: DateTime<Utc>,
}

/// One cache slot with its own time-to-live.
///
/// The TTL is checked on read; entries are never proactively evicted.
#[derive(Debug)]
pub struct CacheSlot<T> {
    /// How long a stored value stays fresh.
    ttl: TimeDelta,
    /// The current entry, if any.
    entry: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> CacheSlot<T> {
    /// Creates an empty slot with the given TTL.
    #[inline]
    #[must_use]
    pub const fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Returns the cached value if it is still fresh at `now`.
    #[must_use]
    pub fn get(&self, now: DateTime<Utc>) -> Option<T> {
        let guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().and_then(|entry| {
            let age = now.signed_duration_since(entry.stored_at);
            if age < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    /// Stores a fresh value, replacing whatever was there.
    pub fn put(&self, now: DateTime<Utc>, value: T) {
        let mut guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(CacheEntry {
            value,
            stored_at: now,
        });
    }

    /// Drops the stored value unconditionally.
    pub fn invalidate(&self) {
        let mut guard = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

/// Cache service for the catalog gateway: one slot per entry class.
#[derive(Debug)]
pub struct CatalogCache {
    /// Cached vendor list.
    vendors: CacheSlot<Vec<Vendor>>,
    /// Cached whole-catalog product list.
    products: CacheSlot<Vec<Product>>,
}

impl CatalogCache {
    /// Creates a cache with the standard TTLs (vendors 600 s,
    /// products 300 s).
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttls(
            TimeDelta::seconds(VENDOR_TTL_SECS),
            TimeDelta::seconds(PRODUCT_TTL_SECS),
        )
    }

    /// Creates a cache with custom TTLs per entry class.
    #[inline]
    #[must_use]
    pub const fn with_ttls(vendor_ttl: TimeDelta, product_ttl: TimeDelta) -> Self {
        Self {
            vendors: CacheSlot::new(vendor_ttl),
            products: CacheSlot::new(product_ttl),
        }
    }

    /// Fresh vendor list, if cached.
    #[inline]
    #[must_use]
    pub fn vendors(&self, now: DateTime<Utc>) -> Option<Vec<Vendor>> {
        self.vendors.get(now)
    }

    /// Stores the vendor list.
    #[inline]
    pub fn store_vendors(&self, now: DateTime<Utc>, vendors: Vec<Vendor>) {
        self.vendors.put(now, vendors);
    }

    /// Fresh whole-catalog product list, if cached.
    #[inline]
    #[must_use]
    pub fn products(&self, now: DateTime<Utc>) -> Option<Vec<Product>> {
        self.products.get(now)
    }

    /// Stores the product list.
    #[inline]
    pub fn store_products(&self, now: DateTime<Utc>, products: Vec<Product>) {
        self.products.put(now, products);
    }

    /// Clears every slot unconditionally (operator-triggered refresh).
    #[inline]
    pub fn clear(&self) {
        self.vendors.invalidate();
        self.products.invalidate();
    }
}

impl Default for CatalogCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
