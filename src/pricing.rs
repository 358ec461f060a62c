//! Pure promotion engine.
//!
//! Computes a cart's payable total and per-item free attributions for
//! arbitrary mixes of regular, discounted, lottery, and bundle-eligible
//! items. Everything here is derived from the cart slice on every call;
//! nothing is stored, so whole-cart and per-vendor invocations stay
//! independent by construction.

use crate::models::ProductId;
use crate::session::CartItem;

/// Fixed fee charged for lottery items, overriding catalog price.
pub const LOTTERY_FEE: f64 = 200.0;

/// Number of bundle-eligible items that form one promotion group.
pub const BUNDLE_SIZE: usize = 3;

/// Human-readable reason attached to bundle free attributions.
pub const THREE_FOR_TWO_REASON: &str = "3 for 2";

/// One item instance that rides free on a complete bundle group.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeItem {
    /// Position of the item in the priced cart slice.
    pub index: usize,
    /// Product the item snapshots.
    pub product_id: ProductId,
    /// Product title, for rendering.
    pub title: String,
    /// Amount forgiven (the item's effective price).
    pub amount: f64,
    /// Why the item is free.
    pub reason: &'static str,
}

/// Result of pricing a cart slice.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    /// Payable total after promotions.
    pub total: f64,
    /// Items that ride free, attributed to specific cart positions.
    pub free_items: Vec<FreeItem>,
}

impl PricedCart {
    /// Whether the item at `index` of the priced slice rides free.
    #[inline]
    #[must_use]
    pub fn is_free(&self, index: usize) -> bool {
        self.free_items.iter().any(|free| free.index == index)
    }

    /// The amount to charge for the item at `index` of the priced
    /// slice: zero when it rides free, its effective price otherwise.
    #[inline]
    #[must_use]
    pub fn charge_for(&self, index: usize, item: &CartItem) -> f64 {
        if self.is_free(index) {
            0.0
        } else {
            item.effective_price
        }
    }

    /// Total amount forgiven by promotions.
    #[inline]
    #[must_use]
    pub fn savings(&self) -> f64 {
        self.free_items.iter().map(|free| free.amount).sum()
    }
}

/// Prices a cart slice.
///
/// Items partition into three disjoint groups, in precedence order:
/// lottery (always charged the fixed fee, never bundle-eligible),
/// bundle-eligible (tagged "3 for 2" and not lottery), and regular
/// (everything else, with any manual discount already baked into the
/// effective price at add time).
///
/// The bundle group is stable-sorted descending by price and chunked
/// into consecutive groups of exactly [`BUNDLE_SIZE`]; in each full
/// group the cheapest item is free, attributed to that specific item
/// instance. A partial trailing group pays full price.
#[must_use]
pub fn price_cart(items: &[CartItem]) -> PricedCart {
    let mut total = 0.0_f64;
    let mut bundle: Vec<(usize, &CartItem)> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if item.bundle_eligible() {
            bundle.push((index, item));
        } else {
            // Lottery fee and manual discounts are already baked into
            // the effective price.
            total += item.effective_price;
        }
    }

    // Stable sort: equal prices keep their original relative order.
    bundle.sort_by(|left, right| right.1.effective_price.total_cmp(&left.1.effective_price));

    let mut free_items = Vec::new();
    for chunk in bundle.chunks_exact(BUNDLE_SIZE) {
        if let Some(((free_index, free_item), charged)) = chunk.split_last() {
            for (_, item) in charged {
                total += item.effective_price;
            }
            free_items.push(FreeItem {
                index: *free_index,
                product_id: free_item.product.id,
                title: free_item.product.title.clone(),
                amount: free_item.effective_price,
                reason: THREE_FOR_TWO_REASON,
            });
        }
    }
    for (_, leftover) in bundle.chunks_exact(BUNDLE_SIZE).remainder() {
        total += leftover.effective_price;
    }

    PricedCart { total, free_items }
}
