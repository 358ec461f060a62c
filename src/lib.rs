//! Point-of-sale core for a multi-vendor book fair.
//!
//! Buyers browse products by vendor or category through a chat
//! interface, accumulate a cart, and pay per vendor; proceeds land as
//! append-only rows in a shared spreadsheet that is the system of
//! record. This crate is the core behind that flow: the
//! pricing/promotion engine, the per-vendor split-checkout state
//! machine, and the caching/retry discipline over the slow remote
//! store. The chat transport itself is a thin collaborator that speaks
//! to the core through [`action`] tokens and render payloads.
//!
//! # Layers
//!
//! - [`client`]: thin HTTP client for the spreadsheet bridge.
//! - [`catalog`]: the gateway: cached typed reads, retried writes,
//!   graceful degradation ([`retry`], [`cache`]).
//! - [`pricing`]: the pure "3 for 2" promotion engine.
//! - [`session`] / [`checkout`]: per-buyer cart and the split-checkout
//!   state machine.
//! - [`reporting`]: per-vendor sales summaries and drill-downs.
//! - [`fair_pos`]: the facade tying it all together.
//!
//! # Example
//!
//! ```no_run
//! use fairpos::fair_pos::FairPos;
//! use fairpos::session::Session;
//!
//! # async fn demo() -> fairpos::error::Result<()> {
//! let pos = FairPos::builder()
//!     .token("bridge-token")
//!     .base_url("https://sheets-bridge.example")
//!     .build()?;
//!
//! let mut session = Session::new();
//! for product in pos.vendor_products(fairpos::models::VendorId::new(3)).await {
//!     let _item = pos.add_to_cart(&mut session, product.id, false).await?;
//! }
//! let priced = pos.price(&session);
//! println!("payable: {}", priced.total);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod cache;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod error;
pub mod fair_pos;
pub mod models;
pub mod pricing;
pub mod reporting;
pub mod retry;
pub mod session;
