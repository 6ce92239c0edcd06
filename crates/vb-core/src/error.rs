//! Error types for the block model.

use thiserror::Error;

/// Errors raised at the JSON boundary of the block model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The payload was not valid JSON, or not shaped like a block list / model.
    #[error("invalid block data: {0}")]
    Json(#[from] serde_json::Error),
}
