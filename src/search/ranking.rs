//! Purchase-affinity scoring used to reorder browse and text-search
//! results toward what the shopper keeps buying.

use std::{cmp::Reverse, collections::HashMap};

use crate::types::Product;

/// Relative weights for the affinity table.
///
/// Category dominates tags and color 3:1:1 to bias strongly toward
/// repeat-category purchases. This is a tuning parameter, not a derived
/// constant; override it only through [`AffinityModel::with_weights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityWeights {
   pub tag:      u32,
   pub category: u32,
   pub color:    u32,
}

impl Default for AffinityWeights {
   fn default() -> Self {
      Self { tag: 1, category: 3, color: 1 }
   }
}

/// Frequency table over a purchase history, keyed by lowercased tag,
/// category, and color names. Built once per scoring pass.
#[derive(Debug, Clone, Default)]
pub struct AffinityModel {
   counts: HashMap<String, u32>,
}

impl AffinityModel {
   pub fn from_history(history: &[Product]) -> Self {
      Self::with_weights(history, AffinityWeights::default())
   }

   pub fn with_weights(history: &[Product], weights: AffinityWeights) -> Self {
      let mut counts: HashMap<String, u32> = HashMap::new();
      for purchased in history {
         for tag in &purchased.tags {
            *counts.entry(tag.to_lowercase()).or_insert(0) += weights.tag;
         }
         *counts.entry(purchased.category.to_lowercase()).or_insert(0) += weights.category;
         *counts.entry(purchased.color.to_lowercase()).or_insert(0) += weights.color;
      }
      Self { counts }
   }

   /// Additive relevance: the sum of the candidate's tag counts plus its
   /// category and color counts, 0 for anything the history never touched.
   pub fn score(&self, product: &Product) -> u32 {
      let mut score = 0;
      for tag in &product.tags {
         score += self.count(tag);
      }
      score += self.count(&product.category);
      score += self.count(&product.color);
      score
   }

   fn count(&self, key: &str) -> u32 {
      self.counts.get(&key.to_lowercase()).copied().unwrap_or(0)
   }
}

/// Sorts descending by affinity score. Stable: equal scores keep their
/// relative input order, and each candidate is scored exactly once.
pub fn rank_by_affinity(products: &mut [Product], history: &[Product]) {
   if history.is_empty() {
      return;
   }

   let model = AffinityModel::from_history(history);
   products.sort_by_cached_key(|product| Reverse(model.score(product)));
}
