//! Any vision provider known to `edgequake-llm`.
//!
//! The three request elements become three consecutive user turns in the
//! order [`super::ordered_parts`] gives them, since a chat message carries
//! either text or images but not text interleaved around an image.

use super::{ordered_parts, InferenceBackend, RequestPart};
use crate::config::AtsConfig;
use crate::error::AtsError;
use crate::pipeline::encode::RasterizedPage;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// [`InferenceBackend`] wrapping an `edgequake-llm` provider.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    name: String,
    model: String,
    options: CompletionOptions,
    timeout: Duration,
}

impl ProviderBackend {
    /// Create the named provider through [`ProviderFactory`]; it reads its own
    /// credential (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).
    pub fn from_config(name: &str, config: &AtsConfig) -> Result<Self, AtsError> {
        let provider = ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
            AtsError::ProviderNotConfigured {
                provider: name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::with_provider(provider, name, config))
    }

    /// Wrap a provider the caller already built.
    pub fn with_provider(provider: Arc<dyn LLMProvider>, name: &str, config: &AtsConfig) -> Self {
        Self {
            provider,
            name: name.to_string(),
            model: config.model.clone(),
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }
}

/// Build `CompletionOptions` from the config; unset values stay provider defaults.
fn build_options(config: &AtsConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: config.max_output_tokens,
        ..Default::default()
    }
}

fn build_messages(instruction: &str, image: &RasterizedPage, context: &str) -> Vec<ChatMessage> {
    ordered_parts(instruction, image, context)
        .into_iter()
        .map(|part| match part {
            RequestPart::Text(text) => ChatMessage::user(text),
            RequestPart::Image(img) => ChatMessage::user_with_images(
                "",
                vec![
                    ImageData::new(img.data.clone(), img.mime_type.as_str()).with_detail("high"),
                ],
            ),
        })
        .collect()
}

#[async_trait]
impl InferenceBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.name
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
        let messages = build_messages(instruction, image, context);
        info!("Calling {} model {}", self.name, self.model);

        let response = tokio::time::timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await
        .map_err(|_| AtsError::ApiTimeout {
            elapsed_ms: start.elapsed().as_millis() as u64,
        })?
        .map_err(|e| AtsError::LlmApiError {
            message: format!("{}", e),
        })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.name,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults_leave_provider_in_charge() {
        let config = AtsConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, None);
        assert_eq!(opts.max_tokens, None);
    }

    #[test]
    fn build_options_forwards_overrides() {
        let mut config = AtsConfig::default();
        config.temperature = Some(0.3);
        config.max_output_tokens = Some(2048);
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.3));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[test]
    fn one_message_per_request_part() {
        let page = RasterizedPage::new("QUJD", "image/jpeg");
        assert_eq!(build_messages("instruction", &page, "context").len(), 3);
        assert_eq!(build_messages("instruction", &page, "").len(), 3);
    }
}
