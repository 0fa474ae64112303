use anyhow::Result;

use crate::models::InferenceRequest;

/// Trait for hosted multimodal models (Gemini, test doubles, ...)
#[async_trait::async_trait]
pub trait InferenceService: Send + Sync {
    /// One request/response exchange. The returned text is shown as-is.
    async fn generate(&self, request: &InferenceRequest<'_>) -> Result<String>;
}
