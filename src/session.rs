//! Per-session cart and payment state.
//!
//! One buyer session owns exactly one [`Session`] value; the
//! interaction router serializes actions per session, so no locking
//! happens here. The session lives only for the duration of a checkout
//! cycle; state is loaded and saved at the boundary of each
//! interaction and never persisted across process restarts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{Product, PromotionTag, VendorId};
use crate::pricing::LOTTERY_FEE;

/// A snapshot copy of a product at the moment it was added to the
/// cart, plus the annotations decided at add time.
///
/// Items are never mutated after addition; all later computation is
/// derived, not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product as it looked when added.
    pub product: Product,
    /// Price this item will actually be charged at (before bundle
    /// promotions, which are derived per pricing call).
    pub effective_price: f64,
    /// Manual per-item discount subtracted at add time, if any.
    pub discount_applied: f64,
    /// Whether this item is a fixed-fee lottery redemption.
    pub is_lottery: bool,
}

impl CartItem {
    /// Snapshots a catalog product, optionally applying its manual
    /// discount.
    ///
    /// With `with_discount` and a positive catalog discount the
    /// effective price is `max(0, price − discount)` and the discount
    /// is recorded; otherwise the catalog price is kept as-is.
    #[must_use]
    pub fn snapshot(product: Product, with_discount: bool) -> Self {
        if with_discount && product.has_discount() {
            let effective_price = (product.price - product.discount).max(0.0);
            let discount_applied = product.discount;
            Self {
                effective_price,
                discount_applied,
                is_lottery: false,
                product,
            }
        } else {
            Self {
                effective_price: product.price,
                discount_applied: 0.0,
                is_lottery: false,
                product,
            }
        }
    }

    /// Snapshots a product as a lottery redemption: the fixed
    /// [`LOTTERY_FEE`] overrides the catalog price unconditionally.
    #[must_use]
    pub fn lottery(product: Product) -> Self {
        Self {
            effective_price: LOTTERY_FEE,
            discount_applied: 0.0,
            is_lottery: true,
            product,
        }
    }

    /// The vendor this item's proceeds belong to.
    #[inline]
    #[must_use]
    pub const fn vendor_id(&self) -> VendorId {
        self.product.vendor_id
    }

    /// Whether this item participates in "3 for 2" bundle grouping.
    ///
    /// Lottery items never do, regardless of the catalog tag.
    #[inline]
    #[must_use]
    pub fn bundle_eligible(&self) -> bool {
        !self.is_lottery && self.product.promotion == Some(PromotionTag::ThreeForTwo)
    }
}

/// One buyer session: the cart plus the per-vendor paid flags.
///
/// Invariant: the payment map only ever holds keys for vendors
/// currently represented in the cart, and both are cleared together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Ordered cart contents.
    cart: Vec<CartItem>,
    /// Paid flag per vendor present in the cart.
    payments: BTreeMap<VendorId, bool>,
}

impl Session {
    /// Creates an empty session.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart contents, in add order.
    #[inline]
    #[must_use]
    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Whether the cart holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Appends an item snapshot to the cart.
    #[inline]
    pub fn add_item(&mut self, item: CartItem) {
        self.cart.push(item);
    }

    /// Empties the cart and the payment state together (both or
    /// neither).
    #[inline]
    pub fn clear(&mut self) {
        self.cart.clear();
        self.payments.clear();
    }

    /// The distinct vendors currently represented in the cart.
    #[must_use]
    pub fn vendors(&self) -> BTreeSet<VendorId> {
        self.cart.iter().map(CartItem::vendor_id).collect()
    }

    /// Clones out the cart items belonging to one vendor, preserving
    /// add order.
    #[must_use]
    pub fn vendor_items(&self, vendor_id: VendorId) -> Vec<CartItem> {
        self.cart
            .iter()
            .filter(|item| item.vendor_id() == vendor_id)
            .cloned()
            .collect()
    }

    /// Whether the cart holds any items for the vendor.
    #[must_use]
    pub fn has_items_for(&self, vendor_id: VendorId) -> bool {
        self.cart.iter().any(|item| item.vendor_id() == vendor_id)
    }

    /// Whether the vendor has been marked paid this cycle.
    #[inline]
    #[must_use]
    pub fn is_paid(&self, vendor_id: VendorId) -> bool {
        self.payments.get(&vendor_id).copied().unwrap_or(false)
    }

    /// Whether the vendor has cart items that are not yet paid for.
    #[must_use]
    pub fn has_unpaid_items(&self, vendor_id: VendorId) -> bool {
        self.has_items_for(vendor_id) && !self.is_paid(vendor_id)
    }

    /// Marks a vendor paid.
    ///
    /// A no-op for vendors not represented in the cart, which keeps the
    /// payment-state invariant structural.
    pub fn mark_paid(&mut self, vendor_id: VendorId) {
        if self.has_items_for(vendor_id) {
            let _prev = self.payments.insert(vendor_id, true);
        }
    }

    /// Whether every vendor represented in the cart is marked paid.
    #[must_use]
    pub fn all_paid(&self) -> bool {
        !self.cart.is_empty() && self.vendors().iter().all(|vendor| self.is_paid(*vendor))
    }

    /// The paid flags, keyed by vendor.
    #[inline]
    #[must_use]
    pub const fn payments(&self) -> &BTreeMap<VendorId, bool> {
        &self.payments
    }
}
