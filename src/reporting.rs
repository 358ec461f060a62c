//! Reporting aggregator.
//!
//! Pure folds of the transaction ledger into per-vendor summaries and
//! itemized drill-downs. Date filtering happens in the gateway
//! (`list_transactions(since)`), so everything here works on plain
//! slices and stays trivially testable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, Product, Transaction, TransactionId, Vendor, VendorId};

/// Per-vendor sales totals for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    /// The vendor the proceeds belong to.
    pub vendor_id: VendorId,
    /// Vendor display name, resolved from the vendor list.
    pub name: String,
    /// Cash proceeds.
    pub cash: f64,
    /// Cashless proceeds.
    pub cashless: f64,
    /// Total proceeds.
    pub total: f64,
}

/// One ledger line of a vendor drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    /// Ledger transaction id.
    pub transaction_id: TransactionId,
    /// Product title, resolved from the cached catalog.
    pub product_title: String,
    /// Charged amount.
    pub amount: f64,
    /// How the sale was paid.
    pub payment_method: PaymentMethod,
    /// Stored timestamp string.
    pub timestamp: String,
}

/// Folds the ledger into per-vendor totals, sorted descending by
/// total.
///
/// Grouping uses the transaction's own vendor field; names are
/// resolved from `vendors` with a `vendor {id}` fallback for vendors
/// that have since disappeared from the catalog.
#[must_use]
pub fn sales_summary_by_vendor(
    transactions: &[Transaction],
    vendors: &[Vendor],
) -> Vec<VendorSummary> {
    let mut buckets: BTreeMap<VendorId, (f64, f64)> = BTreeMap::new();
    for tx in transactions {
        let entry = buckets.entry(tx.vendor_id).or_insert((0.0, 0.0));
        match tx.payment_method {
            PaymentMethod::Cash => entry.0 += tx.amount,
            PaymentMethod::Cashless => entry.1 += tx.amount,
        }
    }

    let mut summaries: Vec<VendorSummary> = buckets
        .into_iter()
        .map(|(vendor_id, (cash, cashless))| VendorSummary {
            vendor_id,
            name: vendors
                .iter()
                .find(|vendor| vendor.id == vendor_id)
                .map_or_else(|| format!("vendor {vendor_id}"), |vendor| vendor.name.clone()),
            cash,
            cashless,
            total: cash + cashless,
        })
        .collect();
    summaries.sort_by(|left, right| right.total.total_cmp(&left.total));
    summaries
}

/// Itemized ledger lines for one vendor, newest first.
///
/// The stored timestamp format is fixed-width, so the lexicographic
/// sort is chronological.
#[must_use]
pub fn vendor_transaction_detail(
    transactions: &[Transaction],
    products: &[Product],
    vendor_id: VendorId,
) -> Vec<TransactionDetail> {
    let mut details: Vec<TransactionDetail> = transactions
        .iter()
        .filter(|tx| tx.vendor_id == vendor_id)
        .map(|tx| TransactionDetail {
            transaction_id: tx.id,
            product_title: products
                .iter()
                .find(|product| product.id == tx.product_id)
                .map_or_else(
                    || format!("product {}", tx.product_id),
                    |product| product.title.clone(),
                ),
            amount: tx.amount,
            payment_method: tx.payment_method,
            timestamp: tx.timestamp.clone(),
        })
        .collect();
    details.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    details
}
