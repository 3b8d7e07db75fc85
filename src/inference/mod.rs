//! Remote model calls.
//!
//! Every backend receives the same three elements in the same order:
//!
//! ```text
//! [ instruction text, page image (mime + base64), job description text ]
//! ```
//!
//! [`ordered_parts`] is the single place that order is defined; backends map
//! its output onto their wire format without reordering. The model's answer
//! is returned as-is. Nothing here retries or falls back to another model.

pub mod gemini;
pub mod provider;

use crate::config::{AtsConfig, Backend};
use crate::error::AtsError;
use crate::pipeline::encode::RasterizedPage;
use async_trait::async_trait;
use std::sync::Arc;

pub use gemini::GeminiBackend;
pub use provider::ProviderBackend;

/// A service that turns (instruction, image, context) into text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Short provider name for logs and output, e.g. `gemini`.
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    async fn generate(
        &self,
        instruction: &str,
        image: &RasterizedPage,
        context: &str,
    ) -> Result<String, AtsError>;
}

/// One element of an inference request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPart<'a> {
    Text(&'a str),
    Image(&'a RasterizedPage),
}

/// The request layout shared by all backends.
pub fn ordered_parts<'a>(
    instruction: &'a str,
    image: &'a RasterizedPage,
    context: &'a str,
) -> [RequestPart<'a>; 3] {
    [
        RequestPart::Text(instruction),
        RequestPart::Image(image),
        RequestPart::Text(context),
    ]
}

/// Build the backend selected by `config`.
pub fn backend_from_config(config: &AtsConfig) -> Result<Arc<dyn InferenceBackend>, AtsError> {
    match &config.backend {
        Backend::Gemini => Ok(Arc::new(GeminiBackend::new(config)?)),
        Backend::Provider(name) => Ok(Arc::new(ProviderBackend::from_config(name, config)?)),
    }
}
