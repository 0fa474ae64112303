use anyhow::Result;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use super::InferenceService;
use crate::config::Config;
use crate::models::InferenceRequest;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            api_key,
            model,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.google_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_base.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_body<'a>(request: &'a InferenceRequest<'a>) -> GenerateContentRequest<'a> {
        let mut parts = vec![Part::Text { text: request.prompt }];

        for image in &request.images {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.media_type.as_mime(),
                    data: general_purpose::STANDARD.encode(image.data),
                },
            });
        }

        // The API rejects empty text parts
        if !request.context.trim().is_empty() {
            parts.push(Part::Text { text: request.context });
        }

        GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            anyhow::bail!("Gemini returned no answer (block reason: {})", reason);
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }

        Ok(text)
    }

    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) => format!("Gemini API error ({}, {}): {}", status, code, envelope.error.message),
                None => format!("Gemini API error ({}): {}", status, envelope.error.message),
            },
            Err(_) => format!("Gemini API error ({}): {}", status, body.trim()),
        }
    }
}

#[async_trait::async_trait]
impl InferenceService for GeminiClient {
    async fn generate(&self, request: &InferenceRequest<'_>) -> Result<String> {
        let body = Self::build_body(request);

        log::info!("🤖 Sending request to Gemini with model: {}", self.model);
        log::debug!(
            "📤 Request carries {} image byte(s) and {} context char(s)",
            request.images.iter().map(|i| i.data.len()).sum::<usize>(),
            request.context.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Gemini API error response: {}", error_text);
            anyhow::bail!(Self::error_message(status, &error_text));
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw Gemini response size: {} bytes", response_text.len());

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)?;
        let text = Self::extract_text(parsed)?;
        log::info!("✅ Received calorie breakdown ({} chars)", text.len());

        Ok(text)
    }
}
