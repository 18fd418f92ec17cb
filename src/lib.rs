//! Catalog search, filtering, and AI-assisted ranking core for the
//! HarbourMart storefront.
//!
//! The synchronous half ([`search`]) is a pure engine: each render pass
//! hands it an immutable [`Catalog`] snapshot, the active [`QueryMode`],
//! the shopper's [`FilterState`], and their [`PurchaseHistory`], and gets
//! back the ordered visible subset. The async half ([`ai`]) talks to a
//! generative backend for natural-language search, visual search, and
//! post-purchase recommendations, guarded by [`AiSearchSession`] so that
//! only the newest in-flight request can reach the screen and any backend
//! failure degrades to an empty result instead of an error.

pub mod ai;
pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod types;

pub use ai::{AiBackend, AiSearchSession, GeminiClient, SearchOutcome};
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use search::{similar_in_stock, visible_products};
pub use types::{
   FilterState, Product, ProductId, PurchaseHistory, QueryMode, Recommendation, StockStatus,
};
