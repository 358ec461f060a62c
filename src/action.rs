//! Interaction boundary: action tokens and render payloads.
//!
//! Inbound user actions arrive from the chat transport as compact
//! opaque tokens: an action name and its arguments joined by a fixed
//! delimiter. Each token maps 1:1 to one core operation. In the other
//! direction the core emits a [`RenderPayload`]: body text, an ordered
//! list of labeled action buttons, and optionally an image reference.
//! Whether the transport edits an existing message or sends a new one
//! is its own business.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FairPosError, Result};
use crate::models::{PaymentMethod, ProductId, VendorId};

/// Delimiter joining an action name and its arguments.
pub const ACTION_DELIMITER: char = ':';

/// Date format used inside summary/detail tokens.
const TOKEN_DATE_FORMAT: &str = "%Y-%m-%d";

/// Marker for "no date filter" in summary/detail tokens.
const ALL_TIME: &str = "all";

/// One inbound user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the main menu.
    MainMenu,
    /// Show the vendor list.
    VendorList,
    /// Show one vendor's products.
    VendorProducts(VendorId),
    /// Show the product-type menu.
    ProductTypes,
    /// Show one page of products of a type.
    ProductsByType {
        /// Free-text product type, e.g. "Книги".
        kind: String,
        /// Zero-based page number.
        page: usize,
    },
    /// Show a product card.
    ProductDetails(ProductId),
    /// Add a product to the cart.
    AddToCart {
        /// The product to add.
        product: ProductId,
        /// Whether to apply the product's manual discount.
        with_discount: bool,
    },
    /// Show lottery-eligible products.
    LotteryList,
    /// Add a product as a fixed-fee lottery redemption.
    AddLottery(ProductId),
    /// Show the cart.
    ViewCart,
    /// Clear the cart and payment state.
    ClearCart,
    /// Start a vendor checkout with the chosen method.
    StartCheckout {
        /// Vendor being paid.
        vendor: VendorId,
        /// Chosen payment method.
        method: PaymentMethod,
    },
    /// Confirm a vendor payment and record its transactions.
    ConfirmVendor {
        /// Vendor being paid.
        vendor: VendorId,
        /// Chosen payment method.
        method: PaymentMethod,
    },
    /// Legacy single-pass confirmation over the whole cart.
    ConfirmCart(PaymentMethod),
    /// Show the totals period menu.
    Totals,
    /// Show the sales summary since a date (`None` = all time).
    Summary(Option<NaiveDate>),
    /// Show one vendor's itemized sales since a date.
    VendorDetail {
        /// Vendor to drill into.
        vendor: VendorId,
        /// Period start (`None` = all time).
        since: Option<NaiveDate>,
    },
    /// Operator action: clear every gateway cache.
    Refresh,
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MainMenu => f.write_str("menu"),
            Self::VendorList => f.write_str("vendors"),
            Self::VendorProducts(vendor) => write!(f, "vendor:{vendor}"),
            Self::ProductTypes => f.write_str("types"),
            Self::ProductsByType { kind, page } => write!(f, "type:{kind}:{page}"),
            Self::ProductDetails(product) => write!(f, "product:{product}"),
            Self::AddToCart {
                product,
                with_discount,
            } => {
                if *with_discount {
                    write!(f, "add:{product}:discount")
                } else {
                    write!(f, "add:{product}")
                }
            }
            Self::LotteryList => f.write_str("lottery"),
            Self::AddLottery(product) => write!(f, "lottery-add:{product}"),
            Self::ViewCart => f.write_str("cart"),
            Self::ClearCart => f.write_str("cart-clear"),
            Self::StartCheckout { vendor, method } => write!(f, "checkout:{vendor}:{method}"),
            Self::ConfirmVendor { vendor, method } => write!(f, "confirm:{vendor}:{method}"),
            Self::ConfirmCart(method) => write!(f, "confirm-cart:{method}"),
            Self::Totals => f.write_str("totals"),
            Self::Summary(since) => write!(f, "summary:{}", format_since(*since)),
            Self::VendorDetail { vendor, since } => {
                write!(f, "detail:{vendor}:{}", format_since(*since))
            }
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

impl FromStr for Action {
    type Err = FairPosError;

    fn from_str(token: &str) -> Result<Self> {
        let (name, args) = match token.split_once(ACTION_DELIMITER) {
            Some((name, args)) => (name, Some(args)),
            None => (token, None),
        };
        match (name, args) {
            ("menu", None) => Ok(Self::MainMenu),
            ("vendors", None) => Ok(Self::VendorList),
            ("vendor", Some(rest)) => Ok(Self::VendorProducts(VendorId::new(parse_id(rest, token)?))),
            ("types", None) => Ok(Self::ProductTypes),
            ("type", Some(rest)) => {
                let (kind, page) = rest
                    .rsplit_once(ACTION_DELIMITER)
                    .ok_or_else(|| unknown(token))?;
                let page: usize = page.parse().map_err(|_err| unknown(token))?;
                Ok(Self::ProductsByType {
                    kind: kind.to_owned(),
                    page,
                })
            }
            ("product", Some(rest)) => Ok(Self::ProductDetails(ProductId::new(parse_id(rest, token)?))),
            ("add", Some(rest)) => match rest.split_once(ACTION_DELIMITER) {
                None => Ok(Self::AddToCart {
                    product: ProductId::new(parse_id(rest, token)?),
                    with_discount: false,
                }),
                Some((id, "discount")) => Ok(Self::AddToCart {
                    product: ProductId::new(parse_id(id, token)?),
                    with_discount: true,
                }),
                Some(_) => Err(unknown(token)),
            },
            ("lottery", None) => Ok(Self::LotteryList),
            ("lottery-add", Some(rest)) => {
                Ok(Self::AddLottery(ProductId::new(parse_id(rest, token)?)))
            }
            ("cart", None) => Ok(Self::ViewCart),
            ("cart-clear", None) => Ok(Self::ClearCart),
            ("checkout", Some(rest)) => {
                let (vendor, method) = parse_vendor_method(rest, token)?;
                Ok(Self::StartCheckout { vendor, method })
            }
            ("confirm", Some(rest)) => {
                let (vendor, method) = parse_vendor_method(rest, token)?;
                Ok(Self::ConfirmVendor { vendor, method })
            }
            ("confirm-cart", Some(rest)) => Ok(Self::ConfirmCart(
                PaymentMethod::from_token(rest).ok_or_else(|| unknown(token))?,
            )),
            ("totals", None) => Ok(Self::Totals),
            ("summary", Some(rest)) => Ok(Self::Summary(parse_since(rest, token)?)),
            ("detail", Some(rest)) => {
                let (vendor, since) = rest
                    .split_once(ACTION_DELIMITER)
                    .ok_or_else(|| unknown(token))?;
                Ok(Self::VendorDetail {
                    vendor: VendorId::new(parse_id(vendor, token)?),
                    since: parse_since(since, token)?,
                })
            }
            ("refresh", None) => Ok(Self::Refresh),
            _ => Err(unknown(token)),
        }
    }
}

/// Builds the parse-failure error for a token.
fn unknown(token: &str) -> FairPosError {
    FairPosError::UnknownAction(token.to_owned())
}

/// Parses a numeric id argument.
fn parse_id(raw: &str, token: &str) -> Result<i64> {
    raw.parse().map_err(|_err| unknown(token))
}

/// Parses a `{vendor}:{method}` argument pair.
fn parse_vendor_method(raw: &str, token: &str) -> Result<(VendorId, PaymentMethod)> {
    let (vendor, method) = raw
        .split_once(ACTION_DELIMITER)
        .ok_or_else(|| unknown(token))?;
    Ok((
        VendorId::new(parse_id(vendor, token)?),
        PaymentMethod::from_token(method).ok_or_else(|| unknown(token))?,
    ))
}

/// Parses an `all`-or-date argument.
fn parse_since(raw: &str, token: &str) -> Result<Option<NaiveDate>> {
    if raw == ALL_TIME {
        Ok(None)
    } else {
        NaiveDate::parse_from_str(raw, TOKEN_DATE_FORMAT)
            .map(Some)
            .map_err(|_err| unknown(token))
    }
}

/// Formats the `all`-or-date token segment.
fn format_since(since: Option<NaiveDate>) -> String {
    since.map_or_else(
        || ALL_TIME.to_owned(),
        |date| date.format(TOKEN_DATE_FORMAT).to_string(),
    )
}

/// A labeled control the transport lays out however it likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Visible label.
    pub label: String,
    /// Encoded action token fired when selected.
    pub action: String,
}

impl Button {
    /// Creates a button firing the given action.
    #[inline]
    #[must_use]
    pub fn new<L: Into<String>>(label: L, action: &Action) -> Self {
        Self {
            label: label.into(),
            action: action.to_string(),
        }
    }
}

/// What the core asks the transport to render for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPayload {
    /// Body text.
    pub text: String,
    /// Ordered labeled controls.
    pub buttons: Vec<Button>,
    /// Optional image reference (product photo, payment QR code).
    pub image: Option<String>,
}

impl RenderPayload {
    /// Creates a text-only payload.
    #[inline]
    #[must_use]
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            image: None,
        }
    }

    /// Appends a button, returning the payload for chaining.
    #[inline]
    #[must_use]
    pub fn with_button<L: Into<String>>(mut self, label: L, action: &Action) -> Self {
        self.buttons.push(Button::new(label, action));
        self
    }

    /// Sets the image reference, returning the payload for chaining.
    #[inline]
    #[must_use]
    pub fn with_image<U: Into<String>>(mut self, url: U) -> Self {
        self.image = Some(url.into());
        self
    }
}
