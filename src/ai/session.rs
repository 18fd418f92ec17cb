//! Latest-wins request guard around an [`AiBackend`].
//!
//! The storefront fires a new AI search every time the shopper edits the
//! query or uploads a photo. Only the newest response may reach the
//! screen: issuing a request cancels its predecessor, and a stale slow
//! response that still completes is reported as superseded instead of its
//! ids. Backend failures and timeouts degrade to an empty ranking; they
//! never escape this module as errors.

use std::{
   future::Future,
   sync::{
      Mutex,
      atomic::{AtomicBool, AtomicU64, Ordering},
   },
   time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
   ai::AiBackend,
   catalog::Catalog,
   config,
   error::Result,
   types::{Product, ProductId, Recommendation},
};

/// What became of one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
   /// The request is still the newest one; these ids feed the engine's
   /// `AiRanked` mode. Empty means the backend found nothing or failed.
   Ranked(Vec<ProductId>),
   /// A newer request replaced this one while it was in flight; discard.
   Superseded,
}

pub struct AiSearchSession<B> {
   backend:    B,
   generation: AtomicU64,
   current:    Mutex<CancellationToken>,
   timeout:    Duration,
   loading:    AtomicBool,
}

impl<B: AiBackend> AiSearchSession<B> {
   pub fn new(backend: B) -> Self {
      Self::with_timeout(backend, Duration::from_millis(config::request_timeout_ms()))
   }

   pub fn with_timeout(backend: B, timeout: Duration) -> Self {
      Self {
         backend,
         generation: AtomicU64::new(0),
         current: Mutex::new(CancellationToken::new()),
         timeout,
         loading: AtomicBool::new(false),
      }
   }

   /// True while the newest request is in flight. The UI uses this, not
   /// the engine, to tell "loading" from "no matches".
   pub fn is_loading(&self) -> bool {
      self.loading.load(Ordering::Acquire)
   }

   /// Free-text search; an empty query asks the backend for a discovery
   /// selection.
   pub async fn search_text(&self, query: &str, catalog: &Catalog) -> SearchOutcome {
      self
         .run("text search", self.backend.search_by_text(query, catalog))
         .await
   }

   /// Visual search over raw image bytes.
   pub async fn search_image(&self, image: &[u8], catalog: &Catalog) -> SearchOutcome {
      self
         .run("image search", self.backend.search_by_image(image, catalog))
         .await
   }

   /// Post-purchase recommendations. Single-shot and best-effort: failures
   /// and timeouts collapse to an empty set with a stock reason line.
   pub async fn recommend(&self, purchased: &[Product], catalog: &Catalog) -> Recommendation {
      match tokio::time::timeout(self.timeout, self.backend.recommend(purchased, catalog)).await {
         Ok(Ok(recommendation)) => recommendation,
         Ok(Err(error)) => {
            warn!(%error, "recommendation request failed");
            Recommendation::fallback()
         },
         Err(_) => {
            warn!(timeout_ms = self.timeout.as_millis() as u64, "recommendation request timed out");
            Recommendation::fallback()
         },
      }
   }

   async fn run(
      &self,
      op: &'static str,
      request: impl Future<Output = Result<Vec<ProductId>>>,
   ) -> SearchOutcome {
      let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
      let token = {
         let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
         };
         current.cancel();
         *current = CancellationToken::new();
         current.clone()
      };
      debug!(op, generation, "AI request issued");

      self.loading.store(true, Ordering::Release);

      let ids = tokio::select! {
         () = token.cancelled() => return SearchOutcome::Superseded,
         outcome = tokio::time::timeout(self.timeout, request) => match outcome {
            Ok(Ok(ids)) => ids,
            Ok(Err(error)) => {
               warn!(op, %error, "AI request failed; degrading to no results");
               Vec::new()
            },
            Err(_) => {
               warn!(op, timeout_ms = self.timeout.as_millis() as u64, "AI request timed out");
               Vec::new()
            },
         },
      };

      // The token can lag behind the counter: a sibling may have bumped the
      // generation between our completion and this check.
      if self.generation.load(Ordering::Acquire) != generation {
         return SearchOutcome::Superseded;
      }

      self.loading.store(false, Ordering::Release);
      SearchOutcome::Ranked(ids)
   }
}

#[cfg(test)]
mod tests {
   use std::sync::Arc;

   use super::*;
   use crate::error::Error;

   #[derive(Clone)]
   struct FakeBackend {
      delay: Duration,
      fail:  bool,
   }

   impl FakeBackend {
      fn instant() -> Self {
         Self { delay: Duration::ZERO, fail: false }
      }

      fn slow(delay: Duration) -> Self {
         Self { delay, fail: false }
      }

      fn failing() -> Self {
         Self { delay: Duration::ZERO, fail: true }
      }
   }

   #[async_trait::async_trait]
   impl AiBackend for FakeBackend {
      async fn search_by_text(&self, query: &str, _catalog: &Catalog) -> Result<Vec<ProductId>> {
         tokio::time::sleep(self.delay).await;
         if self.fail {
            return Err(Error::Backend { op: "text search", reason: "quota".to_string() });
         }
         Ok(vec![format!("match:{query}")])
      }

      async fn search_by_image(&self, _image: &[u8], _catalog: &Catalog) -> Result<Vec<ProductId>> {
         tokio::time::sleep(self.delay).await;
         if self.fail {
            return Err(Error::Backend { op: "image search", reason: "quota".to_string() });
         }
         Ok(vec!["visual-1".to_string()])
      }

      async fn recommend(&self, _purchased: &[Product], _catalog: &Catalog) -> Result<Recommendation> {
         tokio::time::sleep(self.delay).await;
         if self.fail {
            return Err(Error::Backend { op: "recommendation", reason: "quota".to_string() });
         }
         Ok(Recommendation {
            product_ids: vec!["rec-1".to_string()],
            reason:      "Pairs well with your order".to_string(),
         })
      }
   }

   #[tokio::test(start_paused = true)]
   async fn newest_request_wins() {
      let session = Arc::new(AiSearchSession::with_timeout(
         FakeBackend::slow(Duration::from_secs(5)),
         Duration::from_secs(30),
      ));
      let catalog = Catalog::default();

      let stale = tokio::spawn({
         let session = Arc::clone(&session);
         let catalog = catalog.clone();
         async move { session.search_text("first", &catalog).await }
      });
      // Let the first request register its token before superseding it.
      tokio::task::yield_now().await;

      let fresh = session.search_text("second", &catalog).await;
      assert_eq!(fresh, SearchOutcome::Ranked(vec!["match:second".to_string()]));
      assert_eq!(stale.await.unwrap(), SearchOutcome::Superseded);
      assert!(!session.is_loading());
   }

   #[tokio::test(start_paused = true)]
   async fn image_search_supersedes_text_search() {
      let session = Arc::new(AiSearchSession::with_timeout(
         FakeBackend::slow(Duration::from_secs(5)),
         Duration::from_secs(30),
      ));
      let catalog = Catalog::default();

      let stale = tokio::spawn({
         let session = Arc::clone(&session);
         let catalog = catalog.clone();
         async move { session.search_text("mug", &catalog).await }
      });
      tokio::task::yield_now().await;

      let fresh = session.search_image(&[0xFF, 0xD8], &catalog).await;
      assert_eq!(fresh, SearchOutcome::Ranked(vec!["visual-1".to_string()]));
      assert_eq!(stale.await.unwrap(), SearchOutcome::Superseded);
   }

   #[tokio::test(start_paused = true)]
   async fn failure_degrades_to_empty_ranking() {
      let session = AiSearchSession::with_timeout(FakeBackend::failing(), Duration::from_secs(30));
      let catalog = Catalog::default();

      let outcome = session.search_text("mug", &catalog).await;
      assert_eq!(outcome, SearchOutcome::Ranked(Vec::new()));
      assert!(!session.is_loading());
   }

   #[tokio::test(start_paused = true)]
   async fn timeout_degrades_to_empty_ranking() {
      let session = AiSearchSession::with_timeout(
         FakeBackend::slow(Duration::from_secs(120)),
         Duration::from_secs(1),
      );
      let catalog = Catalog::default();

      let outcome = session.search_text("mug", &catalog).await;
      assert_eq!(outcome, SearchOutcome::Ranked(Vec::new()));
   }

   #[tokio::test(start_paused = true)]
   async fn loading_reflects_the_newest_request() {
      let session = Arc::new(AiSearchSession::with_timeout(
         FakeBackend::slow(Duration::from_secs(5)),
         Duration::from_secs(30),
      ));
      let catalog = Catalog::default();
      assert!(!session.is_loading());

      let request = tokio::spawn({
         let session = Arc::clone(&session);
         let catalog = catalog.clone();
         async move { session.search_text("mug", &catalog).await }
      });
      tokio::task::yield_now().await;
      assert!(session.is_loading());

      request.await.unwrap();
      assert!(!session.is_loading());
   }

   #[tokio::test(start_paused = true)]
   async fn recommendation_failure_uses_fallback_reason() {
      let session = AiSearchSession::with_timeout(FakeBackend::failing(), Duration::from_secs(30));
      let catalog = Catalog::default();

      let recommendation = session.recommend(&[], &catalog).await;
      assert!(recommendation.product_ids.is_empty());
      assert_eq!(recommendation.reason, "Top picks for you");
   }

   #[tokio::test(start_paused = true)]
   async fn recommendation_passes_through_on_success() {
      let session = AiSearchSession::with_timeout(FakeBackend::instant(), Duration::from_secs(30));
      let catalog = Catalog::default();

      let recommendation = session.recommend(&[], &catalog).await;
      assert_eq!(recommendation.product_ids, vec!["rec-1".to_string()]);
   }

   #[tokio::test(start_paused = true)]
   async fn recommendation_timeout_uses_fallback() {
      let session = AiSearchSession::with_timeout(
         FakeBackend::slow(Duration::from_secs(120)),
         Duration::from_secs(1),
      );
      let catalog = Catalog::default();

      let recommendation = session.recommend(&[], &catalog).await;
      assert_eq!(recommendation, Recommendation::fallback());
   }
}
