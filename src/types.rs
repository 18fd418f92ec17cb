use serde::{Deserialize, Serialize};

pub type ProductId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StockStatus {
   #[default]
   #[serde(rename = "In Stock")]
   InStock,
   #[serde(rename = "Sold Out")]
   SoldOut,
}

/// One catalog record. Created once at catalog load and never mutated by
/// the core; flash-sale price overrides are copies made by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
   pub id:             ProductId,
   pub name:           String,
   pub description:    String,
   pub price:          f64,
   pub category:       String,
   pub origin:         String,
   pub color:          String,
   pub tags:           Vec<String>,
   pub rating:         f64,
   #[serde(default)]
   pub stock_status:   StockStatus,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub original_price: Option<f64>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub restock_date:   Option<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub image_url:      Option<String>,
}

/// Attribute constraints owned by the filter UI. Empty origin/color lists
/// mean "no constraint"; an inverted price range yields an empty result
/// set rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
   pub min_price: f64,
   pub max_price: f64,
   pub origins:   Vec<String>,
   pub colors:    Vec<String>,
}

impl Default for FilterState {
   fn default() -> Self {
      Self {
         min_price: 0.0,
         max_price: f64::MAX,
         origins:   Vec::new(),
         colors:    Vec::new(),
      }
   }
}

/// The single active query mode. Exactly one variant is live at a time;
/// "All" browsing and category browsing are distinct variants, so the
/// impossible string/id-list/category combinations cannot be represented.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryMode {
   #[default]
   All,
   Text(String),
   AiRanked(Vec<ProductId>),
   Category(String),
}

impl QueryMode {
   /// An active search keeps sold-out products visible. Whitespace-only
   /// text does not count as searching.
   pub fn is_active_search(&self) -> bool {
      match self {
         Self::Text(query) => !query.trim().is_empty(),
         Self::AiRanked(_) => true,
         Self::All | Self::Category(_) => false,
      }
   }
}

/// Append-only sequence of purchased product snapshots; read input to the
/// affinity ranker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseHistory {
   items: Vec<Product>,
}

impl PurchaseHistory {
   pub fn new() -> Self {
      Self::default()
   }

   /// Appends a completed order's items.
   pub fn record(&mut self, purchased: &[Product]) {
      self.items.extend_from_slice(purchased);
   }

   pub fn items(&self) -> &[Product] {
      &self.items
   }

   pub fn len(&self) -> usize {
      self.items.len()
   }

   pub fn is_empty(&self) -> bool {
      self.items.is_empty()
   }
}

/// Post-purchase recommendation set from the AI backend. An empty id list
/// is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
   #[serde(default)]
   pub product_ids: Vec<ProductId>,
   #[serde(default)]
   pub reason:      String,
}

impl Recommendation {
   /// Shown when the backend fails or times out.
   pub fn fallback() -> Self {
      Self {
         product_ids: Vec::new(),
         reason:      "Top picks for you".to_string(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn whitespace_text_is_not_an_active_search() {
      assert!(!QueryMode::Text("   ".to_string()).is_active_search());
      assert!(QueryMode::Text("mug".to_string()).is_active_search());
      assert!(QueryMode::AiRanked(vec![]).is_active_search());
      assert!(!QueryMode::Category("Food".to_string()).is_active_search());
      assert!(!QueryMode::All.is_active_search());
   }

   #[test]
   fn stock_status_uses_wire_names() {
      let parsed: StockStatus = serde_json::from_str("\"Sold Out\"").unwrap();
      assert_eq!(parsed, StockStatus::SoldOut);
      assert_eq!(serde_json::to_string(&StockStatus::InStock).unwrap(), "\"In Stock\"");
   }

   #[test]
   fn history_is_append_only() {
      let item = Product {
         id:             "p1".to_string(),
         name:           "Mug".to_string(),
         description:    String::new(),
         price:          12.0,
         category:       "Home".to_string(),
         origin:         "Japan".to_string(),
         color:          "White".to_string(),
         tags:           vec!["kitchen".to_string()],
         rating:         4.5,
         stock_status:   StockStatus::InStock,
         original_price: None,
         restock_date:   None,
         image_url:      None,
      };

      let mut history = PurchaseHistory::new();
      history.record(std::slice::from_ref(&item));
      history.record(&[item.clone(), item]);
      assert_eq!(history.len(), 3);
   }
}
