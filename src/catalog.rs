//! Remote catalog gateway.
//!
//! Typed access to the vendor/product/transaction collections with the
//! caching and retry discipline that makes a slow, quota-limited
//! spreadsheet tolerable behind a chat interface. Failure handling is
//! strictly contained at this boundary: reads degrade to an empty
//! sequence and writes to `false`, so upstream components can always
//! render a "no data" state instead of crashing the session.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{CatalogCache, Clock};
use crate::client::SheetsClient;
use crate::models::{
    PaymentMethod, Product, ProductId, TIMESTAMP_FORMAT, Transaction, TransactionId, Vendor,
    VendorId,
};
use crate::retry::RetryPolicy;

/// Collection name for vendors.
const VENDORS_COLLECTION: &str = "Vendors";

/// Collection name for products.
const PRODUCTS_COLLECTION: &str = "Products";

/// Collection name for the transaction ledger.
const TRANSACTIONS_COLLECTION: &str = "Transactions";

/// Gateway over the spreadsheet bridge: cached typed reads, retried
/// writes, and graceful degradation.
#[derive(Debug)]
pub struct CatalogGateway {
    /// Low-level bridge client.
    client: SheetsClient,
    /// Cache service, constructed at process start and shared.
    cache: CatalogCache,
    /// Wall-clock source for cache expiry and ledger timestamps.
    clock: Arc<dyn Clock>,
    /// Retry policy applied around each remote call.
    retry: RetryPolicy,
}

impl CatalogGateway {
    /// Creates a gateway from its collaborators.
    #[inline]
    #[must_use]
    pub fn new(
        client: SheetsClient,
        cache: CatalogCache,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            cache,
            clock,
            retry,
        }
    }

    /// All vendors. Cached for 10 minutes; any failure degrades to an
    /// empty list (logged, never raised).
    #[tracing::instrument(skip_all)]
    pub async fn list_vendors(&self) -> Vec<Vendor> {
        let now = self.clock.now();
        if let Some(vendors) = self.cache.vendors(now) {
            return vendors;
        }
        match self
            .retry
            .run(|| self.client.records(VENDORS_COLLECTION))
            .await
        {
            Ok(rows) => {
                let vendors: Vec<Vendor> = rows.iter().map(Vendor::from_row).collect();
                tracing::debug!(count = vendors.len(), "fetched vendors");
                self.cache.store_vendors(now, vendors.clone());
                vendors
            }
            Err(err) => {
                tracing::warn!(error = %err, "vendor fetch failed; serving empty list");
                Vec::new()
            }
        }
    }

    /// The whole product catalog in one fetch (avoids N+1 per-vendor
    /// calls). Cached for 5 minutes; failures degrade to empty.
    #[tracing::instrument(skip_all)]
    pub async fn list_all_products(&self) -> Vec<Product> {
        let now = self.clock.now();
        if let Some(products) = self.cache.products(now) {
            return products;
        }
        match self
            .retry
            .run(|| self.client.records(PRODUCTS_COLLECTION))
            .await
        {
            Ok(rows) => {
                let products: Vec<Product> = rows.iter().map(Product::from_row).collect();
                tracing::debug!(count = products.len(), "fetched products");
                self.cache.store_products(now, products.clone());
                products
            }
            Err(err) => {
                tracing::warn!(error = %err, "product fetch failed; serving empty list");
                Vec::new()
            }
        }
    }

    /// Products of one vendor: a filter over the cached full catalog,
    /// never a separate remote fetch.
    pub async fn list_products_by_vendor(&self, vendor_id: VendorId) -> Vec<Product> {
        self.list_all_products()
            .await
            .into_iter()
            .filter(|product| product.vendor_id == vendor_id)
            .collect()
    }

    /// Lottery-eligible products: a filter over the cached full
    /// catalog.
    pub async fn list_lottery_products(&self) -> Vec<Product> {
        self.list_all_products()
            .await
            .into_iter()
            .filter(|product| product.lottery_eligible)
            .collect()
    }

    /// Looks up a single product in the cached catalog.
    pub async fn find_product(&self, product_id: ProductId) -> Option<Product> {
        self.list_all_products()
            .await
            .into_iter()
            .find(|product| product.id == product_id)
    }

    /// Looks up a single vendor in the cached vendor list.
    pub async fn find_vendor(&self, vendor_id: VendorId) -> Option<Vendor> {
        self.list_vendors()
            .await
            .into_iter()
            .find(|vendor| vendor.id == vendor_id)
    }

    /// Appends one sale to the ledger; returns whether it was recorded.
    ///
    /// The transaction id is the current ledger length + 1. That is not
    /// safe under concurrent writers; a single effective writer stream
    /// is assumed.
    #[tracing::instrument(skip_all, fields(product = %product_id, vendor = %vendor_id))]
    pub async fn append_transaction(
        &self,
        product_id: ProductId,
        vendor_id: VendorId,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> bool {
        let ledger = match self
            .retry
            .run(|| self.client.records(TRANSACTIONS_COLLECTION))
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "ledger read failed; transaction not recorded");
                return false;
            }
        };
        let next_id = i64::try_from(ledger.len()).map_or(i64::MAX, |len| len.saturating_add(1));
        let transaction = Transaction {
            id: TransactionId::new(next_id),
            product_id,
            vendor_id,
            payment_method,
            amount,
            timestamp: self.clock.now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let row = transaction.to_row();
        match self
            .retry
            .run(|| self.client.append_record(TRANSACTIONS_COLLECTION, &row))
            .await
        {
            Ok(()) => {
                tracing::debug!(id = %transaction.id, amount, "transaction recorded");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "transaction append failed");
                false
            }
        }
    }

    /// Full ledger scan, optionally filtered to transactions whose
    /// timestamp date is on or after `since`. Failures degrade to an
    /// empty list.
    ///
    /// Under a since-filter, rows with unparseable timestamps are
    /// excluded (and logged); an unfiltered scan returns them as-is.
    #[tracing::instrument(skip_all)]
    pub async fn list_transactions(&self, since: Option<NaiveDate>) -> Vec<Transaction> {
        let rows = match self
            .retry
            .run(|| self.client.records(TRANSACTIONS_COLLECTION))
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "ledger read failed; serving empty list");
                return Vec::new();
            }
        };
        let transactions = rows.iter().map(Transaction::from_row);
        match since {
            Some(cutoff) => transactions
                .filter(|tx| match tx.date() {
                    Some(date) => date >= cutoff,
                    None => {
                        tracing::trace!(id = %tx.id, "skipping transaction with malformed timestamp");
                        false
                    }
                })
                .collect(),
            None => transactions.collect(),
        }
    }

    /// Clears every gateway cache unconditionally (operator refresh).
    #[inline]
    pub fn invalidate_caches(&self) {
        tracing::debug!("invalidating catalog caches");
        self.cache.clear();
    }

    /// Returns the retry policy in effect.
    #[inline]
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}
