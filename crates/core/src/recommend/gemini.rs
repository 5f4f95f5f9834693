//! Gemini REST backend for the recommendation gateway.
//!
//! Calls `generateContent` with a fixed structured-output schema so the
//! model's reply deserializes straight into [`RecommendationPayload`].

use super::{Advisor, RecommendError, RecommendationPayload};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Prompt template; `{{request}}` is replaced with the trimmed user text
const ADVISOR_PROMPT: &str = include_str!("advisor.md");

/// Advisor backed by the Gemini API. The API key comes from the
/// `GEMINI_API_KEY` environment variable.
pub struct GeminiAdvisor {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
}

impl GeminiAdvisor {
    /// Build a client with the default model and a 30s request timeout.
    /// A missing key is not an error until a call is actually made.
    pub fn from_env() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The structured-output schema the service must honor: every field of
    /// every recommended tool is required.
    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "recommendedTools": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "paidAlternative": { "type": "STRING" },
                            "description": { "type": "STRING" },
                            "whyRecommend": { "type": "STRING" },
                            "officialLink": { "type": "STRING" }
                        },
                        "required": ["name", "paidAlternative", "description", "whyRecommend", "officialLink"]
                    }
                },
                "advice": { "type": "STRING" }
            },
            "required": ["recommendedTools", "advice"]
        })
    }

    fn request_body(request: &str) -> Value {
        let prompt = ADVISOR_PROMPT.replace("{{request}}", request);
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema()
            }
        })
    }

    /// Dig the model's JSON text out of the candidate envelope
    fn extract_text(reply: &Value) -> Option<&str> {
        reply
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    async fn ask(&self, request: &str) -> Result<RecommendationPayload, RecommendError> {
        let api_key = self.api_key.as_ref().ok_or(RecommendError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", API_BASE, self.model);

        tracing::debug!("Requesting recommendation from model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| RecommendError::MalformedReply(e.to_string()))?;

        let text = Self::extract_text(&reply)
            .ok_or_else(|| RecommendError::MalformedReply("no candidate text".to_string()))?;

        serde_json::from_str(text).map_err(|e| RecommendError::MalformedReply(e.to_string()))
    }
}
