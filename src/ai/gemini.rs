//! Gemini-backed implementation of [`AiBackend`].
//!
//! Every call is one `generateContent` request in JSON mode. The catalog
//! travels inside the prompt as compact records to keep token counts and
//! latency down.

use std::time::Duration;

use base64::Engine as _;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{
   ai::AiBackend,
   catalog::Catalog,
   config,
   error::{Error, Result},
   types::{Product, ProductId, Recommendation},
};

const DISCOVERY_PERSONAS: &[&str] = &[
   "a tech enthusiast looking for the latest gadgets",
   "someone planning a cozy weekend at home with comfort food and relaxation",
   "a fashionista looking for a stylish, color-coordinated outfit",
   "someone looking for a healthy lifestyle upgrade with fitness gear",
   "a student organizing their desk for productivity",
   "a coffee lover looking for the perfect morning setup",
   "a traveler packing for a weekend getaway",
];

/// Compact product view embedded in prompts.
#[derive(Serialize)]
struct SlimProduct<'a> {
   id:          &'a str,
   name:        &'a str,
   description: &'a str,
   tags:        &'a [String],
   category:    &'a str,
   price:       f64,
   color:       &'a str,
}

impl<'a> From<&'a Product> for SlimProduct<'a> {
   fn from(product: &'a Product) -> Self {
      Self {
         id:          &product.id,
         name:        &product.name,
         description: &product.description,
         tags:        &product.tags,
         category:    &product.category,
         price:       product.price,
         color:       &product.color,
      }
   }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
   contents:          Vec<Content>,
   generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
   parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
   #[serde(skip_serializing_if = "Option::is_none")]
   text:        Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   inline_data: Option<InlineData>,
}

impl Part {
   fn text(text: String) -> Self {
      Self { text: Some(text), inline_data: None }
   }

   fn inline(mime_type: &str, data: String) -> Self {
      Self {
         text:        None,
         inline_data: Some(InlineData { mime_type: mime_type.to_string(), data }),
      }
   }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
   mime_type: String,
   data:      String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
   response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
   #[serde(default)]
   candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
   #[serde(default)]
   content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
   #[serde(default)]
   parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
   #[serde(default)]
   text: String,
}

pub struct GeminiClient {
   http:     reqwest::Client,
   api_key:  String,
   base_url: String,
}

impl GeminiClient {
   /// Builds a client from `HARBOURMART_API_KEY` (or `GEMINI_API_KEY`).
   pub fn from_env() -> Result<Self> {
      let api_key = config::api_key().ok_or(Error::MissingApiKey("HARBOURMART_API_KEY"))?;
      Self::new(api_key, config::base_url())
   }

   /// `base_url` override exists for tests pointed at a local mock server.
   pub fn new(api_key: String, base_url: String) -> Result<Self> {
      let http = reqwest::Client::builder()
         .timeout(Duration::from_millis(config::request_timeout_ms()))
         .build()
         .map_err(|source| Error::Http { op: "client setup", source })?;

      Ok(Self { http, api_key, base_url })
   }

   async fn generate(&self, op: &'static str, model: &str, parts: Vec<Part>) -> Result<String> {
      let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model, self.api_key);
      let request = GenerateRequest {
         contents:          vec![Content { parts }],
         generation_config: GenerationConfig { response_mime_type: "application/json" },
      };

      let response = self
         .http
         .post(&url)
         .json(&request)
         .send()
         .await
         .map_err(|source| Error::Http { op, source })?;

      if !response.status().is_success() {
         return Err(Error::Backend { op, reason: format!("HTTP {}", response.status()) });
      }

      let payload: GenerateResponse = response
         .json()
         .await
         .map_err(|source| Error::Http { op, source })?;

      let text: String = payload
         .candidates
         .into_iter()
         .next()
         .map(|candidate| {
            candidate
               .content
               .parts
               .into_iter()
               .map(|part| part.text)
               .collect()
         })
         .unwrap_or_default();

      if text.is_empty() {
         return Err(Error::Backend { op, reason: "no candidate text".to_string() });
      }
      Ok(text)
   }

   fn catalog_json(catalog: &Catalog) -> Result<String> {
      let slim: Vec<SlimProduct<'_>> = catalog.iter().map(SlimProduct::from).collect();
      Ok(serde_json::to_string(&slim)?)
   }

   fn parse_ids(op: &'static str, text: &str) -> Result<Vec<ProductId>> {
      serde_json::from_str(text).map_err(|e| Error::Backend { op, reason: e.to_string() })
   }

   fn parse_recommendation(op: &'static str, text: &str) -> Result<Recommendation> {
      serde_json::from_str(text).map_err(|e| Error::Backend { op, reason: e.to_string() })
   }
}

#[async_trait::async_trait]
impl AiBackend for GeminiClient {
   async fn search_by_text(&self, query: &str, catalog: &Catalog) -> Result<Vec<ProductId>> {
      let catalog_json = Self::catalog_json(catalog)?;

      let prompt = if query.trim().is_empty() {
         // Discovery mode: no query means "surprise me".
         let persona = DISCOVERY_PERSONAS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DISCOVERY_PERSONAS[0]);
         format!(
            "You are an intelligent shopping curator.\n\
             The user has asked for a surprise recommendation.\n\
             Curate a collection for: {persona}.\n\n\
             Here is the product catalog:\n{catalog_json}\n\n\
             Task: Pick 5-7 products that fit this specific persona perfectly.\n\
             Return a JSON array of product IDs (strings)."
         )
      } else {
         format!(
            "You are an intelligent shopping assistant.\n\
             User Query: \"{query}\"\n\n\
             Here is the product catalog:\n{catalog_json}\n\n\
             Task: Return a JSON array of product IDs (strings) that best match the user's \
             intent.\n\
             Consider synonyms, semantic meaning, pricing constraints, and usage context \
             (e.g., \"beach\" matches sunglasses or towels).\n\
             Sort the IDs by relevance. Return AT MOST {max} IDs.",
            max = config::MAX_TEXT_MATCHES
         )
      };

      let text = self
         .generate("text search", config::TEXT_MODEL, vec![Part::text(prompt)])
         .await?;
      Self::parse_ids("text search", &text)
   }

   async fn search_by_image(&self, image: &[u8], catalog: &Catalog) -> Result<Vec<ProductId>> {
      let catalog_json = Self::catalog_json(catalog)?;

      let prompt = format!(
         "I am providing an image of a product I want to buy.\n\
          Look at the image visually and find the best matches from the provided Product \
          Catalog below.\n\n\
          Product Catalog:\n{catalog_json}\n\n\
          Task:\n\
          1. Analyze the image for item type, color, style, and context.\n\
          2. Return a JSON array of the top {max} Product IDs from the catalog that visually \
          resemble the image.",
         max = config::MAX_VISUAL_MATCHES
      );

      let data = base64::engine::general_purpose::STANDARD.encode(image);
      let parts = vec![Part::inline("image/jpeg", data), Part::text(prompt)];

      let text = self
         .generate("image search", config::VISION_MODEL, parts)
         .await?;
      Self::parse_ids("image search", &text)
   }

   async fn recommend(&self, purchased: &[Product], catalog: &Catalog) -> Result<Recommendation> {
      let catalog_json = Self::catalog_json(catalog)?;
      let purchased_summary: Vec<&str> = purchased.iter().map(|p| p.name.as_str()).collect();

      let prompt = format!(
         "The user just bought the following items: {summary}.\n\n\
          Catalog:\n{catalog_json}\n\n\
          Task: Recommend {count} other products from the catalog that complement the \
          purchase.\n\
          Return a JSON object with two properties:\n\
          1. \"productIds\": an array of {count} product ID strings.\n\
          2. \"reason\": A short, catchy sentence explaining why these were picked \
          (e.g., \"Great matches for your new gear!\").\n\n\
          Do not recommend items that are already in the purchased list.",
         summary = purchased_summary.join(", "),
         count = config::RECOMMENDATION_COUNT
      );

      let text = self
         .generate("recommendation", config::TEXT_MODEL, vec![Part::text(prompt)])
         .await?;
      Self::parse_recommendation("recommendation", &text)
   }
}
