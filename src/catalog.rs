use std::collections::HashMap;

use crate::{
   error::Result,
   types::{Product, ProductId},
};

/// The full set of known products, loaded once and read-only afterwards.
///
/// Keeps an id index so AI-ordered lookups stay O(1) per id. The loader
/// that produces the records is a separate collaborator; entries are
/// assumed pre-validated.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
   products: Vec<Product>,
   index:    HashMap<ProductId, usize>,
}

impl Catalog {
   pub fn new(products: Vec<Product>) -> Self {
      let mut index = HashMap::with_capacity(products.len());
      for (position, product) in products.iter().enumerate() {
         // First record wins on a duplicate id.
         index.entry(product.id.clone()).or_insert(position);
      }
      Self { products, index }
   }

   pub fn from_json_str(json: &str) -> Result<Self> {
      Ok(Self::new(serde_json::from_str(json)?))
   }

   pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
      Ok(Self::new(serde_json::from_reader(reader)?))
   }

   pub fn get(&self, id: &str) -> Option<&Product> {
      self.index.get(id).map(|&position| &self.products[position])
   }

   pub fn products(&self) -> &[Product] {
      &self.products
   }

   pub fn iter(&self) -> impl Iterator<Item = &Product> {
      self.products.iter()
   }

   pub fn len(&self) -> usize {
      self.products.len()
   }

   pub fn is_empty(&self) -> bool {
      self.products.is_empty()
   }
}
