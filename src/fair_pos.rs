//! High-level point-of-sale facade.
//!
//! Combines the [`CatalogGateway`] with the session state machine and
//! the reporting folds, so the interaction router talks to exactly one
//! type. Browsing reads never fail (they degrade to empty at the
//! gateway boundary); cart and checkout operations return domain
//! errors the router renders as status messages with a way back to a
//! known-good state.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::{CatalogCache, Clock, SystemClock};
use crate::catalog::CatalogGateway;
use crate::checkout::{CheckoutOutcome, PaymentInstructions, VendorCheckout};
use crate::client::SheetsClient;
use crate::error::{FairPosError, Result};
use crate::models::{PaymentMethod, Product, ProductId, Vendor, VendorId};
use crate::pricing::{self, PricedCart};
use crate::reporting::{self, TransactionDetail, VendorSummary};
use crate::retry::RetryPolicy;
use crate::session::{CartItem, Session};

/// Builder for constructing a [`FairPos`] facade.
#[derive(Debug, Default)]
pub struct FairPosBuilder {
    /// Bridge access token.
    token: Option<String>,
    /// Bridge base URL.
    base_url: Option<String>,
    /// Wall-clock source; defaults to the system clock.
    clock: Option<Arc<dyn Clock>>,
    /// Retry policy; defaults to 3 attempts with 1 s base backoff.
    retry: Option<RetryPolicy>,
    /// Cache service; defaults to the standard TTLs.
    cache: Option<CatalogCache>,
}

impl FairPosBuilder {
    /// Sets the access token for bridge authentication.
    #[inline]
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the bridge base URL (point this at a mock server in tests).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the wall-clock source.
    #[inline]
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Overrides the retry policy.
    #[inline]
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Overrides the cache service (custom TTLs).
    #[inline]
    #[must_use]
    pub fn cache(mut self, cache: CatalogCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the facade.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::MissingConfig`] if the token or base URL
    /// was not provided, or [`FairPosError::Http`] if the HTTP client
    /// fails to build.
    pub fn build(self) -> Result<FairPos> {
        let mut client_builder = SheetsClient::builder();
        if let Some(token) = self.token {
            client_builder = client_builder.token(token);
        }
        if let Some(url) = self.base_url {
            client_builder = client_builder.base_url(url);
        }
        let client = client_builder.build()?;

        let cache = self.cache.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let retry = self.retry.unwrap_or_default();
        Ok(FairPos {
            gateway: CatalogGateway::new(client, cache, clock, retry),
        })
    }
}

/// The point-of-sale core, one instance per process.
///
/// Use [`FairPos::builder()`] to construct an instance. Sessions are
/// owned by the caller (one per buyer) and passed into each operation.
#[derive(Debug)]
pub struct FairPos {
    /// Catalog gateway with its cache and retry policy.
    gateway: CatalogGateway,
}

impl FairPos {
    /// Creates a new builder for configuring the facade.
    #[inline]
    #[must_use]
    pub fn builder() -> FairPosBuilder {
        FairPosBuilder::default()
    }

    /// Wraps an already-configured gateway.
    #[inline]
    #[must_use]
    pub const fn from_gateway(gateway: CatalogGateway) -> Self {
        Self { gateway }
    }

    // ── Browsing ─────────────────────────────────────────────────────

    /// All vendors (empty on backend failure).
    #[inline]
    pub async fn vendors(&self) -> Vec<Vendor> {
        self.gateway.list_vendors().await
    }

    /// The whole product catalog (empty on backend failure).
    #[inline]
    pub async fn products(&self) -> Vec<Product> {
        self.gateway.list_all_products().await
    }

    /// One vendor's products, from the cached catalog.
    #[inline]
    pub async fn vendor_products(&self, vendor_id: VendorId) -> Vec<Product> {
        self.gateway.list_products_by_vendor(vendor_id).await
    }

    /// Products of one free-text category (e.g. "Книги"), from the
    /// cached catalog. Pagination is the transport's business.
    pub async fn products_by_type(&self, kind: &str) -> Vec<Product> {
        self.gateway
            .list_all_products()
            .await
            .into_iter()
            .filter(|product| product.product_type == kind)
            .collect()
    }

    /// Lottery-eligible products, from the cached catalog.
    #[inline]
    pub async fn lottery_products(&self) -> Vec<Product> {
        self.gateway.list_lottery_products().await
    }

    /// Looks up one product.
    #[inline]
    pub async fn product(&self, product_id: ProductId) -> Option<Product> {
        self.gateway.find_product(product_id).await
    }

    /// Looks up one vendor.
    #[inline]
    pub async fn vendor(&self, vendor_id: VendorId) -> Option<Vendor> {
        self.gateway.find_vendor(vendor_id).await
    }

    // ── Cart ─────────────────────────────────────────────────────────

    /// Adds a product to the session cart, optionally with its manual
    /// discount, and returns the snapshot that was stored.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::ProductNotFound`] if the product no
    /// longer resolves in the catalog; the cart is left untouched.
    #[tracing::instrument(skip_all, fields(product = %product_id))]
    pub async fn add_to_cart(
        &self,
        session: &mut Session,
        product_id: ProductId,
        with_discount: bool,
    ) -> Result<CartItem> {
        let product = self
            .gateway
            .find_product(product_id)
            .await
            .ok_or(FairPosError::ProductNotFound(product_id))?;
        let item = CartItem::snapshot(product, with_discount);
        session.add_item(item.clone());
        tracing::debug!(title = %item.product.title, price = item.effective_price, "added to cart");
        Ok(item)
    }

    /// Adds a product as a fixed-fee lottery redemption.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::ProductNotFound`] if the product no
    /// longer resolves in the catalog; the cart is left untouched.
    #[tracing::instrument(skip_all, fields(product = %product_id))]
    pub async fn add_lottery_to_cart(
        &self,
        session: &mut Session,
        product_id: ProductId,
    ) -> Result<CartItem> {
        let product = self
            .gateway
            .find_product(product_id)
            .await
            .ok_or(FairPosError::ProductNotFound(product_id))?;
        let item = CartItem::lottery(product);
        session.add_item(item.clone());
        tracing::debug!(title = %item.product.title, "added lottery item to cart");
        Ok(item)
    }

    /// Prices the whole cart (independent of any per-vendor
    /// computation).
    #[inline]
    #[must_use]
    pub fn price(&self, session: &Session) -> PricedCart {
        pricing::price_cart(session.cart())
    }

    // ── Checkout ─────────────────────────────────────────────────────

    /// Starts a checkout for one vendor: subtotal over that vendor's
    /// items alone, plus payment instructions.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::NothingToPay`] if the vendor has no
    /// unpaid cart items, or [`FairPosError::VendorNotFound`] if the
    /// vendor no longer resolves.
    #[tracing::instrument(skip_all, fields(vendor = %vendor_id, method = %method))]
    pub async fn start_vendor_checkout(
        &self,
        session: &Session,
        vendor_id: VendorId,
        method: PaymentMethod,
    ) -> Result<VendorCheckout> {
        if !session.has_unpaid_items(vendor_id) {
            return Err(FairPosError::NothingToPay(vendor_id));
        }
        let vendor = self
            .gateway
            .find_vendor(vendor_id)
            .await
            .ok_or(FairPosError::VendorNotFound(vendor_id))?;

        let items = session.vendor_items(vendor_id);
        let priced = pricing::price_cart(&items);
        let instructions = PaymentInstructions::for_vendor(&vendor, method);
        Ok(VendorCheckout {
            vendor,
            method,
            subtotal: priced.total,
            item_count: items.len(),
            instructions,
        })
    }

    /// Confirms a vendor's payment: records one ledger transaction per
    /// cart item of that vendor, then marks the vendor paid.
    ///
    /// Charges come from the vendor-scoped pricing run: an item that
    /// rides free in that grouping is recorded with amount `0`. Append
    /// failures do not abort the batch and do not prevent the paid
    /// mark; they are counted in the outcome. When this confirmation
    /// makes every vendor in the cart paid, the session resets and the
    /// outcome reports the cycle complete.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::NothingToPay`] if the vendor has no
    /// items in the cart.
    #[tracing::instrument(skip_all, fields(vendor = %vendor_id, method = %method))]
    pub async fn confirm_vendor_payment(
        &self,
        session: &mut Session,
        vendor_id: VendorId,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome> {
        let items = session.vendor_items(vendor_id);
        if items.is_empty() {
            return Err(FairPosError::NothingToPay(vendor_id));
        }
        let priced = pricing::price_cart(&items);

        let mut success_count = 0_usize;
        let mut failure_count = 0_usize;
        for (index, item) in items.iter().enumerate() {
            let amount = priced.charge_for(index, item);
            if self
                .gateway
                .append_transaction(item.product.id, vendor_id, method, amount)
                .await
            {
                success_count += 1;
            } else {
                failure_count += 1;
            }
        }

        session.mark_paid(vendor_id);
        let cycle_complete = session.all_paid();
        if cycle_complete {
            session.clear();
        }
        tracing::debug!(
            success_count,
            failure_count,
            cycle_complete,
            "vendor payment confirmed"
        );
        Ok(CheckoutOutcome {
            total: priced.total,
            success_count,
            failure_count,
            cycle_complete,
        })
    }

    /// Legacy single-pass confirmation: records the entire cart with
    /// whole-cart pricing, then clears the session unconditionally,
    /// regardless of per-item failures.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::EmptyCart`] if the cart is empty.
    #[tracing::instrument(skip_all, fields(method = %method))]
    pub async fn confirm_whole_cart_payment(
        &self,
        session: &mut Session,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome> {
        if session.is_empty() {
            return Err(FairPosError::EmptyCart);
        }
        let items = session.cart().to_vec();
        let priced = pricing::price_cart(&items);

        let mut success_count = 0_usize;
        let mut failure_count = 0_usize;
        for (index, item) in items.iter().enumerate() {
            let amount = priced.charge_for(index, item);
            if self
                .gateway
                .append_transaction(item.product.id, item.vendor_id(), method, amount)
                .await
            {
                success_count += 1;
            } else {
                failure_count += 1;
            }
        }

        session.clear();
        tracing::debug!(success_count, failure_count, "whole-cart payment confirmed");
        Ok(CheckoutOutcome {
            total: priced.total,
            success_count,
            failure_count,
            cycle_complete: true,
        })
    }

    // ── Reporting ────────────────────────────────────────────────────

    /// Per-vendor sales summary, optionally limited to transactions on
    /// or after `since`. Sorted descending by total.
    pub async fn sales_summary(&self, since: Option<NaiveDate>) -> Vec<VendorSummary> {
        let transactions = self.gateway.list_transactions(since).await;
        let vendors = self.gateway.list_vendors().await;
        reporting::sales_summary_by_vendor(&transactions, &vendors)
    }

    /// Itemized sales for one vendor, newest first, optionally limited
    /// to transactions on or after `since`.
    pub async fn vendor_detail(
        &self,
        vendor_id: VendorId,
        since: Option<NaiveDate>,
    ) -> Vec<TransactionDetail> {
        let transactions = self.gateway.list_transactions(since).await;
        let products = self.gateway.list_all_products().await;
        reporting::vendor_transaction_detail(&transactions, &products, vendor_id)
    }

    // ── Operator controls ────────────────────────────────────────────

    /// Clears every gateway cache unconditionally.
    #[inline]
    pub fn invalidate_caches(&self) {
        self.gateway.invalidate_caches();
    }

    /// Returns the underlying gateway.
    #[inline]
    #[must_use]
    pub const fn gateway(&self) -> &CatalogGateway {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_token() {
        let result = FairPos::builder().base_url("http://localhost:1").build();
        assert!(matches!(
            result,
            Err(FairPosError::MissingConfig("api token"))
        ));
    }

    #[test]
    fn builder_requires_base_url() {
        let result = FairPos::builder().token("test-token").build();
        assert!(matches!(result, Err(FairPosError::MissingConfig("base url"))));
    }

    #[test]
    fn builder_with_config_succeeds() {
        let result = FairPos::builder()
            .token("test-token")
            .base_url("http://localhost:8080")
            .retry(RetryPolicy::new(1, core::time::Duration::ZERO))
            .build();
        assert!(result.is_ok());
    }
}
