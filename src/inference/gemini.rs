//! Google Gemini over its REST `generateContent` endpoint.
//!
//! The request holds one user turn whose parts follow
//! [`super::ordered_parts`]: `text`, `inlineData`, `text`. Error bodies from
//! the API are surfaced with their own message so the user sees what the
//! provider said.

use super::{ordered_parts, InferenceBackend, RequestPart};
use crate::config::AtsConfig;
use crate::error::AtsError;
use crate::pipeline::encode::RasterizedPage;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PROVIDER: &str = "gemini";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
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
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

// ── Backend ──────────────────────────────────────────────────────────────

/// [`InferenceBackend`] talking to the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    generation_config: Option<GenerationConfigValues>,
}

#[derive(Debug, Clone, Copy)]
struct GenerationConfigValues {
    temperature: Option<f32>,
    max_output_tokens: Option<usize>,
}

impl GeminiBackend {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// [`AtsError::ProviderNotConfigured`] when no API key is present.
    pub fn new(config: &AtsConfig) -> Result<Self, AtsError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AtsError::ProviderNotConfigured {
                provider: PROVIDER.into(),
                hint: format!("Set {} before starting.", crate::config::API_KEY_ENV),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| AtsError::Internal(format!("HTTP client: {e}")))?;

        let generation_config = (config.temperature.is_some()
            || config.max_output_tokens.is_some())
        .then_some(GenerationConfigValues {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        });

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config
                .model
                .trim_start_matches("models/")
                .to_string(),
            generation_config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    fn build_request<'a>(
        &self,
        instruction: &'a str,
        image: &'a RasterizedPage,
        context: &'a str,
    ) -> GenerateContentRequest<'a> {
        let parts = ordered_parts(instruction, image, context)
            .into_iter()
            .map(|part| match part {
                RequestPart::Text(text) => Part::Text { text },
                RequestPart::Image(img) => Part::Inline {
                    inline_data: Blob {
                        mime_type: &img.mime_type,
                        data: &img.data,
                    },
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: self.generation_config.map(|g| GenerationConfig {
                temperature: g.temperature,
                max_output_tokens: g.max_output_tokens,
            }),
        }
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        instruction: &str,
        image: &RasterizedPage,
        context: &str,
    ) -> Result<String, AtsError> {
        let start = Instant::now();
        let body = self.build_request(instruction, image, context);
        info!("Calling {} model {}", PROVIDER, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AtsError::ApiTimeout {
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    }
                } else {
                    AtsError::LlmApiError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            let err = map_error_status(status, &text, retry_after);
            warn!("{} returned HTTP {}: {}", PROVIDER, status.as_u16(), err);
            return Err(err);
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| AtsError::MalformedResponse {
                    provider: PROVIDER.into(),
                    detail: e.to_string(),
                })?;

        let text = extract_text(parsed)?;
        debug!(
            "{} answered {} chars in {:?}",
            PROVIDER,
            text.len(),
            start.elapsed()
        );
        Ok(text)
    }
}

/// Map a non-2xx Gemini answer onto an [`AtsError`].
fn map_error_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> AtsError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.message, env.error.status),
        Err(_) if body.trim().is_empty() => (
            status.canonical_reason().unwrap_or("unknown error").to_string(),
            None,
        ),
        Err(_) => (body.trim().to_string(), None),
    };

    // An invalid key comes back as 400 INVALID_ARGUMENT, not 401.
    let bad_key = status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AtsError::AuthError {
            provider: PROVIDER.into(),
            detail: message,
        },
        _ if bad_key => AtsError::AuthError {
            provider: PROVIDER.into(),
            detail: message,
        },
        StatusCode::TOO_MANY_REQUESTS => AtsError::RateLimitExceeded {
            provider: PROVIDER.into(),
            retry_after_secs: retry_after,
        },
        _ => AtsError::LlmApiError {
            message: match api_status {
                Some(s) => format!("HTTP {} {}: {}", status.as_u16(), s, message),
                None => format!("HTTP {}: {}", status.as_u16(), message),
            },
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, AtsError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AtsError::MalformedResponse {
            provider: PROVIDER.into(),
            detail: format!("request blocked: {reason}"),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AtsError::MalformedResponse {
            provider: PROVIDER.into(),
            detail: "no candidates in response".into(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(AtsError::MalformedResponse {
            provider: PROVIDER.into(),
            detail: format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> GeminiBackend {
        let config = AtsConfig::builder().api_key("test-key").build().unwrap();
        GeminiBackend::new(&config).unwrap()
    }

    #[test]
    fn request_parts_are_text_image_text() {
        let b = backend();
        let page = RasterizedPage::new("QUJD", "image/jpeg");
        let req = b.build_request("INSTRUCTION", &page, "CONTEXT");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "INSTRUCTION" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "QUJD" } },
                        { "text": "CONTEXT" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn generation_config_only_when_set() {
        let config = AtsConfig::builder()
            .api_key("k")
            .temperature(0.2)
            .build()
            .unwrap();
        let b = GeminiBackend::new(&config).unwrap();
        let page = RasterizedPage::new("QUJD", "image/jpeg");
        let value = serde_json::to_value(b.build_request("a", &page, "b")).unwrap();
        let temp = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6);
        assert!(value["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn endpoint_strips_models_prefix() {
        let config = AtsConfig::builder()
            .api_key("k")
            .model("models/gemini-1.5-pro")
            .api_base("http://localhost:8080/")
            .build()
            .unwrap();
        let b = GeminiBackend::new(&config).unwrap();
        assert_eq!(
            b.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn text_parts_are_concatenated() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "85%\n" }, { "text": "Missing: Django" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "85%\nMissing: Django");
    }

    #[test]
    fn no_candidates_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_text(resp),
            Err(AtsError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err();
        assert!(matches!(err, AtsError::MalformedResponse { .. }));
        assert!(err.to_string().contains("SAFETY"), "{err}");
    }

    #[test]
    fn invalid_key_400_maps_to_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let err = map_error_status(StatusCode::BAD_REQUEST, body, None);
        assert!(matches!(err, AtsError::AuthError { .. }), "{err}");
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn server_error_keeps_provider_message() {
        let body = r#"{"error":{"code":500,"message":"Internal error encountered.","status":"INTERNAL"}}"#;
        let err = map_error_status(StatusCode::INTERNAL_SERVER_ERROR, body, None);
        assert_eq!(
            err.to_string(),
            "LLM API error: HTTP 500 INTERNAL: Internal error encountered."
        );
    }

    #[test]
    fn non_json_error_body_passes_through() {
        let err = map_error_status(StatusCode::BAD_GATEWAY, "upstream down", None);
        assert!(err.to_string().contains("upstream down"));
    }
}
