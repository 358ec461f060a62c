//! Error types for the fairpos core.

use crate::models::{ProductId, VendorId};

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, FairPosError>;

/// All errors that can occur when using the fairpos core.
#[derive(Debug, thiserror::Error)]
pub enum FairPosError {
    /// HTTP transport failed before a response was received.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The spreadsheet bridge returned a non-success status.
    #[error("api error: status {status}: {message}")]
    Api {
        /// HTTP status code returned by the bridge.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required configuration value was not provided to a builder.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The referenced vendor does not exist in the catalog.
    #[error("vendor {0} not found")]
    VendorNotFound(VendorId),

    /// The referenced product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Checkout was requested for a vendor with no unpaid cart items.
    #[error("nothing to pay for vendor {0}")]
    NothingToPay(VendorId),

    /// A checkout operation was requested on an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// An inbound action token could not be parsed.
    #[error("unknown action token: {0}")]
    UnknownAction(String),
}

impl FairPosError {
    /// Returns `true` for rate-limit-class errors (HTTP 429 or a
    /// quota-exceeded message), the only class the retry policy acts on.
    #[inline]
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::Api { status, message } => {
                let lower = message.to_lowercase();
                *status == 429 || lower.contains("quota") || lower.contains("rate limit")
            }
            Self::Http(_)
            | Self::Serialization(_)
            | Self::MissingConfig(_)
            | Self::VendorNotFound(_)
            | Self::ProductNotFound(_)
            | Self::NothingToPay(_)
            | Self::EmptyCart
            | Self::UnknownAction(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = FairPosError::from(serde_err);
        assert!(matches!(err, FairPosError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn rate_limit_detected_by_status() {
        let err = FairPosError::Api {
            status: 429,
            message: "too many requests".to_owned(),
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn rate_limit_detected_by_quota_message() {
        let err = FairPosError::Api {
            status: 503,
            message: "Quota exceeded for read requests".to_owned(),
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn permanent_api_error_is_not_rate_limit() {
        let err = FairPosError::Api {
            status: 403,
            message: "forbidden".to_owned(),
        };
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn domain_errors_are_not_rate_limit() {
        assert!(!FairPosError::EmptyCart.is_rate_limit());
        assert!(!FairPosError::VendorNotFound(VendorId::new(7)).is_rate_limit());
    }

    #[test]
    fn domain_error_display() {
        let err = FairPosError::ProductNotFound(ProductId::new(17));
        assert_eq!(err.to_string(), "product 17 not found");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FairPosError>();
    }
}
