//! Vendor model.

use serde::{Deserialize, Serialize};

use super::{Row, VendorId};

/// A participant (author) selling products at the fair.
///
/// Immutable from the core's perspective; sourced from the `Vendors`
/// collection of the backing store. For cashless flows at least one of
/// `qr_code_url` / `contact` should be present, but neither is
/// required; the checkout flow falls back through them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// Unique identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// URL of the payment QR code image, if the vendor provided one.
    pub qr_code_url: Option<String>,
    /// Free-text payment contact (phone, bank alias), if provided.
    pub contact: Option<String>,
}

impl Vendor {
    /// Parses a vendor from a raw `Vendors` row, applying the
    /// default-on-missing policy once, here.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: VendorId::new(row.int_field("VendorID")),
            name: row.str_field("Name"),
            qr_code_url: row.opt_str_field("QR_Code_URL"),
            contact: row.opt_str_field("Contact"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_full() {
        let row: Row = serde_json::from_str(
            r#"{"VendorID": 3, "Name": "Анна Иванова", "QR_Code_URL": "https://pay.example/3.png", "Contact": "@anna"}"#,
        )
        .unwrap();
        let vendor = Vendor::from_row(&row);
        assert_eq!(vendor.id, VendorId::new(3));
        assert_eq!(vendor.name, "Анна Иванова");
        assert_eq!(vendor.qr_code_url.as_deref(), Some("https://pay.example/3.png"));
        assert_eq!(vendor.contact.as_deref(), Some("@anna"));
    }

    #[test]
    fn from_row_missing_payment_info() {
        let row: Row = serde_json::from_str(r#"{"VendorID": 4, "Name": "Б. Петров"}"#).unwrap();
        let vendor = Vendor::from_row(&row);
        assert_eq!(vendor.id, VendorId::new(4));
        assert_eq!(vendor.qr_code_url, None);
        assert_eq!(vendor.contact, None);
    }

    #[test]
    fn from_row_blank_fields_default() {
        let row: Row =
            serde_json::from_str(r#"{"QR_Code_URL": "  ", "Contact": ""}"#).unwrap();
        let vendor = Vendor::from_row(&row);
        assert_eq!(vendor.id, VendorId::new(0));
        assert_eq!(vendor.name, "");
        assert_eq!(vendor.qr_code_url, None);
        assert_eq!(vendor.contact, None);
    }
}
