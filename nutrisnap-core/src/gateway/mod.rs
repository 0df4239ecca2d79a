//! Boundary to the external image-analysis service.
//!
//! The core only sees the [`AnalysisGateway`] trait. Responses are
//! validated into a complete [`FoodAnalysis`] or rejected; partial data
//! never crosses this boundary.

mod gemini;

pub use gemini::{GeminiGateway, DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FoodAnalysis;

/// Turns a meal photo into a nutrient estimate.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<FoodAnalysis, GatewayError>;
}

/// Errors surfaced by an analysis call. The Display text is shown to the
/// user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API key not configured. Add api_key to the config file or set NUTRISNAP_API_KEY.")]
    MissingCredential,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Analysis service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Analysis service returned no result")]
    EmptyResponse,

    #[error("Analysis service returned an unexpected result: {0}")]
    MalformedResponse(String),
}
