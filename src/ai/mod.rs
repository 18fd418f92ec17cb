//! AI shopping-assistant boundary.
//!
//! The engine never talks to the network itself: it consumes ordered
//! product-id lists produced behind the [`AiBackend`] trait, so tests swap
//! in a deterministic fake and production wires up [`GeminiClient`].
//! [`AiSearchSession`] sits between the two, enforcing the single-in-flight
//! latest-wins rule and degrading failures to empty results.

pub mod gemini;
pub mod session;

use std::sync::Arc;

pub use gemini::GeminiClient;
pub use session::{AiSearchSession, SearchOutcome};

use crate::{
   catalog::Catalog,
   error::Result,
   types::{Product, ProductId, Recommendation},
};

/// Natural-language and visual search over the catalog, served by an
/// external generative model.
///
/// All three calls are single-shot request/response. An empty id list is a
/// valid answer, and an empty `query` asks the backend for a themed
/// "discovery" selection instead of a ranking.
#[async_trait::async_trait]
pub trait AiBackend: Send + Sync {
   /// Ranks catalog products against a free-text query.
   async fn search_by_text(&self, query: &str, catalog: &Catalog) -> Result<Vec<ProductId>>;

   /// Ranks catalog products against a photo of an item.
   async fn search_by_image(&self, image: &[u8], catalog: &Catalog) -> Result<Vec<ProductId>>;

   /// Suggests complements to a just-completed purchase.
   async fn recommend(&self, purchased: &[Product], catalog: &Catalog) -> Result<Recommendation>;
}

#[async_trait::async_trait]
impl<T: AiBackend + ?Sized> AiBackend for Arc<T> {
   async fn search_by_text(&self, query: &str, catalog: &Catalog) -> Result<Vec<ProductId>> {
      (**self).search_by_text(query, catalog).await
   }

   async fn search_by_image(&self, image: &[u8], catalog: &Catalog) -> Result<Vec<ProductId>> {
      (**self).search_by_image(image, catalog).await
   }

   async fn recommend(&self, purchased: &[Product], catalog: &Catalog) -> Result<Recommendation> {
      (**self).recommend(purchased, catalog).await
   }
}
