//! Checkout protocol types.
//!
//! Per-vendor payment partitioning: a cart spanning several vendors is
//! paid one vendor at a time, and each confirmation records that
//! vendor's items in the ledger. The types here carry the state the
//! transport renders between steps; the operations live on
//! [`crate::fair_pos::FairPos`].

use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, Vendor};

/// How the buyer should actually hand over the money.
///
/// For cashless payments this is a three-way fallback, not an error
/// path: QR code if the vendor has one, else their payment contact,
/// else an explicit "no payment info" state the operator resolves at
/// the stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentInstructions {
    /// Accept cash at the stand.
    CashDesk,
    /// Show the vendor's payment QR code image.
    QrCode(String),
    /// Show the vendor's payment contact string.
    Contact(String),
    /// The vendor has no payment routing info on file.
    NoPaymentInfo,
}

impl PaymentInstructions {
    /// Resolves instructions for a vendor and payment method.
    #[must_use]
    pub fn for_vendor(vendor: &Vendor, method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::CashDesk,
            PaymentMethod::Cashless => {
                if let Some(url) = vendor.qr_code_url.clone() {
                    Self::QrCode(url)
                } else if let Some(contact) = vendor.contact.clone() {
                    Self::Contact(contact)
                } else {
                    Self::NoPaymentInfo
                }
            }
        }
    }

    /// Image reference for the transport to render, if any.
    #[inline]
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::QrCode(url) => Some(url),
            Self::CashDesk | Self::Contact(_) | Self::NoPaymentInfo => None,
        }
    }
}

/// A started (not yet confirmed) checkout for one vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorCheckout {
    /// The vendor being paid.
    pub vendor: Vendor,
    /// Chosen payment method.
    pub method: PaymentMethod,
    /// Payable subtotal for this vendor's items alone, promotions
    /// applied to that subset independently of the whole cart.
    pub subtotal: f64,
    /// Number of cart items included.
    pub item_count: usize,
    /// How to hand over the money.
    pub instructions: PaymentInstructions,
}

/// Result of a confirmed payment batch.
///
/// Per-item append failures do not abort the batch and do not prevent
/// the vendor being marked paid; they are surfaced here for the
/// operator to reconcile against the ledger later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    /// Payable total the batch was charged at.
    pub total: f64,
    /// Items whose ledger append succeeded.
    pub success_count: usize,
    /// Items whose ledger append failed.
    pub failure_count: usize,
    /// Whether this confirmation completed the whole checkout cycle
    /// (every vendor paid, session reset).
    pub cycle_complete: bool,
}

impl CheckoutOutcome {
    /// Whether every item in the batch was recorded.
    #[inline]
    #[must_use]
    pub const fn all_recorded(&self) -> bool {
        self.failure_count == 0
    }
}
