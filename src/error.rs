use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
   #[error("no API key configured: set {0}")]
   MissingApiKey(&'static str),

   #[error("{op} request failed: {source}")]
   Http {
      op:     &'static str,
      #[source]
      source: reqwest::Error,
   },

   #[error("{op} returned an unusable payload: {reason}")]
   Backend { op: &'static str, reason: String },

   #[error(transparent)]
   Json(#[from] serde_json::Error),
}
