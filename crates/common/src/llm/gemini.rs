//! Google Gemini client (`models/{model}:generateContent`)

use super::{EncodedDocument, MetadataModel};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const SERVICE: &str = "gemini";

/// Gemini multimodal client
///
/// One blocking round trip per document. No retries and no client-side
/// timeout: a failed call surfaces as [`AppError::Upstream`].
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| crate::DEFAULT_EXTRACTION_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl MetadataModel for GeminiClient {
    async fn extract_metadata(&self, document: &EncodedDocument, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &document.mime_type,
                            data: &document.data,
                        },
                    },
                ],
            }],
        };

        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("Failed to read response: {}", e))
        })?;

        decode_response(status, &body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate
/// Map an HTTP reply to the model text; non-2xx and undecodable bodies are upstream failures
fn decode_response(status: reqwest::StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(AppError::upstream(SERVICE, format!("API error {}: {}", status, body)));
    }

    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        AppError::upstream(SERVICE, format!("Failed to decode response: {}", e))
    })?;

    response_text(response)
}

fn response_text(response: GenerateContentResponse) -> Result<String> {
    let block_reason = response
        .prompt_feedback
        .and_then(|f| f.block_reason);

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        AppError::upstream(
            SERVICE,
            match block_reason {
                Some(reason) => format!("Prompt blocked: {}", reason),
                None => "Response contained no candidates".to_string(),
            },
        )
    })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(text)
}
