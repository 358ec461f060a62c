//! Transaction model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, ProductId, Row, TransactionId, VendorId};

/// Timestamp format stored in the ledger.
///
/// Fixed-width, so lexicographic ordering of the stored strings matches
/// chronological ordering.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed sale, appended to the `Transactions` collection.
///
/// Append-only: never mutated or deleted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonically assigned identifier (ledger length + 1 at append
    /// time; single-writer assumption).
    pub id: TransactionId,
    /// Product that was sold.
    pub product_id: ProductId,
    /// Vendor the proceeds belong to.
    pub vendor_id: VendorId,
    /// How the sale was paid for.
    pub payment_method: PaymentMethod,
    /// Final charged amount, post-promotion (`0` for items that rode
    /// free on a bundle).
    pub amount: f64,
    /// Wall-clock timestamp in [`TIMESTAMP_FORMAT`], kept as the stored
    /// string.
    pub timestamp: String,
}

impl Transaction {
    /// Parses a transaction from a raw `Transactions` row, applying the
    /// default-on-missing policy once, here.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: TransactionId::new(row.int_field("TransactionID")),
            product_id: ProductId::new(row.int_field("ProductID")),
            vendor_id: VendorId::new(row.int_field("VendorID")),
            payment_method: PaymentMethod::from_wire(&row.str_field("Payment_Method")),
            amount: row.num_field("Amount"),
            timestamp: row.str_field("Timestamp"),
        }
    }

    /// Serializes the transaction into a row for appending.
    #[must_use]
    pub fn to_row(&self) -> Row {
        Row::new()
            .with("TransactionID", self.id.into_inner())
            .with("ProductID", self.product_id.into_inner())
            .with("VendorID", self.vendor_id.into_inner())
            .with("Payment_Method", self.payment_method.as_str())
            .with("Amount", self.amount)
            .with("Timestamp", self.timestamp.clone())
    }

    /// Date portion of the timestamp, if it parses.
    ///
    /// Used for since-date ledger filtering; rows with malformed
    /// timestamps yield `None`.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.timestamp.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}
