//! Product model.

use serde::{Deserialize, Serialize};

use super::{ProductId, PromotionTag, Row, VendorId};

/// A catalog product offered by a vendor.
///
/// Immutable from the core's perspective. Prices are whole currency
/// units (no minor-unit scaling in the spreadsheet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier within the catalog.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Free-text description shown on the product card.
    pub description: String,
    /// Catalog price, non-negative whole units.
    pub price: f64,
    /// URL of the product photo, if any.
    pub photo_url: Option<String>,
    /// Owning vendor.
    pub vendor_id: VendorId,
    /// Free-text category, e.g. "Книги" or "Мерч".
    pub product_type: String,
    /// Optional fixed monetary reduction the seller may offer at the
    /// stand (`>= 0`; zero means no discount available).
    pub discount: f64,
    /// Recognized promotion marker, if the promotion column carries one.
    pub promotion: Option<PromotionTag>,
    /// Whether the product can be redeemed through the fixed-fee
    /// lottery.
    pub lottery_eligible: bool,
}

impl Product {
    /// Parses a product from a raw `Products` row, applying the
    /// default-on-missing policy once, here.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: ProductId::new(row.int_field("ProductID")),
            title: row.str_field("Title"),
            description: row.str_field("Description"),
            price: row.num_field("Price").max(0.0),
            photo_url: row.opt_str_field("Photo_URL"),
            vendor_id: VendorId::new(row.int_field("VendorID")),
            product_type: row.str_field("ProductType"),
            discount: row.num_field("Discount").max(0.0),
            promotion: PromotionTag::from_wire(&row.str_field("Promotion")),
            lottery_eligible: row.bool_field("Lottery"),
        }
    }

    /// Whether the seller offers a manual discount on this product.
    #[inline]
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }
}
