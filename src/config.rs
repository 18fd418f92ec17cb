pub const TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const VISION_MODEL: &str = "gemini-2.5-flash-image";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Result caps baked into the backend prompts.
pub const MAX_TEXT_MATCHES: usize = 6;
pub const MAX_VISUAL_MATCHES: usize = 4;
pub const RECOMMENDATION_COUNT: usize = 3;

/// Default similar-product count on a sold-out detail view.
pub const SIMILAR_LIMIT: usize = 4;

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const MAX_TIMEOUT_MS: u64 = 30_000;

pub fn api_key() -> Option<String> {
   std::env::var("HARBOURMART_API_KEY")
      .or_else(|_| std::env::var("GEMINI_API_KEY"))
      .ok()
      .filter(|key| !key.is_empty())
}

pub fn base_url() -> String {
   std::env::var("HARBOURMART_AI_BASE_URL")
      .ok()
      .filter(|url| !url.is_empty())
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn request_timeout_ms() -> u64 {
   std::env::var("HARBOURMART_AI_TIMEOUT_MS")
      .ok()
      .and_then(|s| s.parse().ok())
      .unwrap_or(DEFAULT_TIMEOUT_MS)
      .min(MAX_TIMEOUT_MS)
}
