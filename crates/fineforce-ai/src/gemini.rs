//! Gemini REST client for structured image analysis.

use async_trait::async_trait;
use fineforce_core::AnalysisResult;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::image::ProcessedImage;
use crate::prompt::{ANALYSIS_PROMPT, analysis_schema};
use crate::wire::{Content, GenerateRequest, GenerateResponse, InlineData, Part};
use crate::{AiError, ImageAnalyzer};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client. A missing API key is tolerated at construction and
/// reported as [`AiError::NotConfigured`] on first use.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("Gemini API key not set; AI features will not function");
        }
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn key(&self) -> Result<&str, AiError> {
        self.api_key.as_deref().ok_or(AiError::NotConfigured)
    }

    pub(crate) fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model)
    }

    pub(crate) fn post(&self, url: &str, key: &str) -> reqwest::RequestBuilder {
        self.client.post(url).header("x-goog-api-key", key)
    }

    /// One `generateContent` call with the image inline and a JSON response
    /// schema; the reply is parsed into an [`AnalysisResult`].
    pub async fn analyze_image(&self, image: &ProcessedImage) -> Result<AnalysisResult, AiError> {
        let key = self.key()?;
        let contents = [Content {
            role: "user".into(),
            parts: vec![
                Part {
                    inline_data: Some(InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    }),
                    ..Default::default()
                },
                Part::text(ANALYSIS_PROMPT),
            ],
        }];
        let request = GenerateRequest {
            system_instruction: None,
            contents: &contents,
            generation_config: Some(analysis_config()),
        };

        let url = self.endpoint("generateContent");
        info!(url = %url, mime_type = %image.mime_type, "requesting image analysis");
        let resp = self.post(&url, key).json(&request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await?;
        let result = parse_analysis(&raw)?;
        info!(
            violation_type = %result.violation_type,
            confidence = result.confidence_score.value(),
            "image analysed"
        );
        Ok(result)
    }
}

fn analysis_config() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": analysis_schema(),
        "thinkingConfig": { "thinkingBudget": 0 },
    })
}

/// Parse a raw `generateContent` body into an [`AnalysisResult`]. Any
/// structural problem is [`AiError::Malformed`].
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AiError> {
    let resp: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| AiError::malformed(format!("response envelope: {e}"), raw))?;
    let text = resp
        .text()
        .ok_or_else(|| AiError::malformed("response contained no text", raw))?;
    serde_json::from_str(text.trim())
        .map_err(|e| AiError::malformed(format!("analysis JSON: {e}"), &text))
}

#[async_trait]
impl ImageAnalyzer for GeminiClient {
    async fn analyze(&self, image: &ProcessedImage) -> Result<AnalysisResult, AiError> {
        self.analyze_image(image).await
    }
}
