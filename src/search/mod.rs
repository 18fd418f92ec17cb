//! The visible-products engine: membership selection, attribute filtering,
//! and affinity reordering over the read-only catalog.
//!
//! Every render pass calls [`visible_products`] with fresh snapshots of the
//! query, filters, and purchase history. The engine is pure and has no
//! error path: no matches is a valid empty result, and "loading" vs
//! "empty" is the AI session's distinction, not the engine's.

pub mod ranking;

use std::collections::HashSet;

use crate::{
   catalog::Catalog,
   types::{FilterState, Product, PurchaseHistory, QueryMode, StockStatus},
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
   if needle.is_empty() {
      return true;
   }
   haystack
      .as_bytes()
      .windows(needle.len())
      .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Computes the ordered visible subset of the catalog.
///
/// Precedence, in order:
/// 1. sold-out suppression, skipped while a text or AI search is active so
///    an explicit search can still surface items with a restock date;
/// 2. exactly one membership branch: AI id-list (its order is
///    authoritative), text match on name/tags/category, category equality,
///    or everything;
/// 3. price/origin/color attribute filters, on every branch;
/// 4. affinity reorder when the shopper has purchase history and no AI
///    ordering is in effect.
pub fn visible_products(
   catalog: &Catalog,
   query: &QueryMode,
   filters: &FilterState,
   history: &PurchaseHistory,
) -> Vec<Product> {
   let searching = query.is_active_search();

   let mut result: Vec<Product> = match query {
      QueryMode::AiRanked(ids) => {
         // Walk the id list rather than the catalog so the backend's
         // ordering carries through. Unknown ids are skipped (backends
         // hallucinate); a duplicate id keeps its first position.
         let mut seen = HashSet::new();
         ids.iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| catalog.get(id))
            .cloned()
            .collect()
      },
      QueryMode::Text(query_text) if searching => {
         let needle = query_text.trim();
         catalog
            .iter()
            .filter(|p| matches_text(p, needle))
            .cloned()
            .collect()
      },
      QueryMode::Category(category) => catalog
         .iter()
         .filter(|p| p.category == *category)
         .cloned()
         .collect(),
      QueryMode::All | QueryMode::Text(_) => catalog.products().to_vec(),
   };

   if !searching {
      result.retain(|p| p.stock_status != StockStatus::SoldOut);
   }

   result.retain(|p| p.price >= filters.min_price && p.price <= filters.max_price);
   if !filters.origins.is_empty() {
      result.retain(|p| filters.origins.contains(&p.origin));
   }
   if !filters.colors.is_empty() {
      result.retain(|p| filters.colors.contains(&p.color));
   }

   // An explicit AI ordering always wins over history-based reordering.
   if !history.is_empty() && !matches!(query, QueryMode::AiRanked(_)) {
      ranking::rank_by_affinity(&mut result, history.items());
   }

   result
}

fn matches_text(product: &Product, needle: &str) -> bool {
   contains_ci(&product.name, needle)
      || product.tags.iter().any(|tag| contains_ci(tag, needle))
      || contains_ci(&product.category, needle)
}

/// In-stock products from the same category, ranked by shared-tag overlap
/// with `product`. Shown on a sold-out detail view as alternatives.
pub fn similar_in_stock(catalog: &Catalog, product: &Product, limit: usize) -> Vec<Product> {
   let mut candidates: Vec<Product> = catalog
      .iter()
      .filter(|p| {
         p.category == product.category
            && p.id != product.id
            && p.stock_status == StockStatus::InStock
      })
      .cloned()
      .collect();

   candidates.sort_by_cached_key(|candidate| {
      let shared = candidate
         .tags
         .iter()
         .filter(|tag| product.tags.contains(tag))
         .count();
      std::cmp::Reverse(shared)
   });
   candidates.truncate(limit);
   candidates
}
