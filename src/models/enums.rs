//! Enumeration types for constrained spreadsheet values.

use serde::{Deserialize, Serialize};

/// How a sale was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid in physical cash at the stand.
    Cash,
    /// Paid by card / transfer using the vendor's payment routing.
    Cashless,
}

impl PaymentMethod {
    /// Wire string stored in the ledger.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Cashless => "cashless",
        }
    }

    /// Parses a ledger value leniently.
    ///
    /// Matching is case-insensitive after trimming. Unknown or missing
    /// values default to [`PaymentMethod::Cash`], consistent with the
    /// default-on-missing policy at the row-parsing boundary.
    #[inline]
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("cashless") {
            Self::Cashless
        } else {
            Self::Cash
        }
    }

    /// Strict parse used by the action-token codec.
    #[inline]
    #[must_use]
    pub fn from_token(raw: &str) -> Option<Self> {
        match raw {
            "cash" => Some(Self::Cash),
            "cashless" => Some(Self::Cashless),
            _ => None,
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized values of the free-text promotion column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionTag {
    /// "3 for 2" bundle: every complete group of three eligible items
    /// sold, the cheapest one is free.
    #[serde(rename = "3for2")]
    ThreeForTwo,
}

impl PromotionTag {
    /// Parses the promotion column value.
    ///
    /// Matching is case-insensitive after trimming; anything other than
    /// the recognized `"3for2"` marker yields `None`.
    #[inline]
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("3for2") {
            Some(Self::ThreeForTwo)
        } else {
            None
        }
    }
}
