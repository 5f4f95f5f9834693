//! # Recommendation Gateway
//!
//! Narrow boundary to an external generative-AI advisory service. The core
//! defines the request/response contract and the fault taxonomy; transport
//! lives behind the [`Advisor`] trait so business logic is testable with a
//! fake backend.
//!
//! Recommendations are informational only: nothing returned here is ever
//! merged into the persisted catalog.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiAdvisor;

/// One suggested tool from the advisory service. All fields are required in
/// the service's structured-output schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedTool {
    pub name: String,
    pub paid_alternative: String,
    pub description: String,
    pub why_recommend: String,
    pub official_link: String,
}

/// Structured advisory reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub advice: String,
    pub recommended_tools: Vec<RecommendedTool>,
}

/// Faults the external call can produce. All of them are recoverable: the
/// caller converts them into a retry-able message, never a crash.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("recommendation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("recommendation service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("recommendation reply was not in the expected shape: {0}")]
    MalformedReply(String),
}

/// Result of asking for a recommendation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Input was blank; no remote call was made
    Skipped,
    /// The service answered
    Advice(RecommendationPayload),
}

/// The injected black-box advisory backend
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Send one free-text request and get the structured reply
    async fn ask(&self, request: &str) -> Result<RecommendationPayload, RecommendError>;
}

/// Gateway in front of an [`Advisor`]: trims input, short-circuits blank
/// queries without touching the backend, and forwards everything else.
pub struct RecommendationGateway {
    advisor: Box<dyn Advisor>,
}

impl RecommendationGateway {
    pub fn new(advisor: Box<dyn Advisor>) -> Self {
        Self { advisor }
    }

    /// Ask for recommendations. Blank input yields [`Outcome::Skipped`],
    /// which is distinguishable from a service error.
    pub async fn recommend(&self, request: &str) -> Result<Outcome, RecommendError> {
        let trimmed = request.trim();
        if trimmed.is_empty() {
            tracing::debug!("Blank recommendation request, skipping remote call");
            return Ok(Outcome::Skipped);
        }
        let payload = self.advisor.ask(trimmed).await?;
        Ok(Outcome::Advice(payload))
    }
}
