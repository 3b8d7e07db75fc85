//! Configuration for résumé analysis.
//!
//! Every knob lives in [`AtsConfig`], built through [`AtsConfigBuilder`] or
//! read from the process environment with [`AtsConfig::from_env`]. The
//! credential is part of the config and handed to the inference backend at
//! construction time, so nothing downstream reads the environment.

use crate::error::AtsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Default Gemini model, a fast multimodal tier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Primary credential variable. `GEMINI_API_KEY` is accepted as a fallback.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Which service answers inference calls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    /// Google Gemini over its REST API (default).
    #[default]
    Gemini,
    /// Any vision-capable provider known to `edgequake-llm`, by name
    /// (`openai`, `anthropic`, `ollama`, …). The provider reads its own key.
    Provider(String),
}

impl Backend {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "gemini" | "google" => Backend::Gemini,
            other => Backend::Provider(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Backend::Gemini => "gemini",
            Backend::Provider(name) => name,
        }
    }
}

/// Configuration for the résumé pipeline and its inference backend.
///
/// # Example
/// ```rust
/// use resume_ats::AtsConfig;
///
/// let config = AtsConfig::builder()
///     .api_key("test-key")
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct AtsConfig {
    /// Inference service. Default: [`Backend::Gemini`].
    pub backend: Backend,

    /// Provider credential. Required for [`Backend::Gemini`].
    pub api_key: Option<String>,

    /// Model identifier sent to the provider. Default: `gemini-1.5-flash`.
    pub model: String,

    /// Base URL for the Gemini REST API. Overridable for proxies and tests.
    pub api_base: String,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Sampling temperature. `None` leaves the provider default in place,
    /// which is what the hosted model is tuned for.
    pub temperature: Option<f32>,

    /// Output token cap. `None` leaves the provider default.
    pub max_output_tokens: Option<usize>,

    /// Longest edge of the rendered first page, in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// JPEG quality 1–100. Default: 90.
    pub jpeg_quality: u8,

    /// Directory holding libpdfium. `None` tries the working directory then
    /// the system library path.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for AtsConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_timeout_secs: 60,
            temperature: None,
            max_output_tokens: None,
            max_rendered_pixels: 2000,
            jpeg_quality: 90,
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for AtsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtsConfig")
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl AtsConfig {
    /// Create a new builder for `AtsConfig`.
    pub fn builder() -> AtsConfigBuilder {
        AtsConfigBuilder {
            config: Self::default(),
        }
    }

    /// Seed a builder from the environment (after loading `.env`, if any).
    ///
    /// | Variable               | Field              |
    /// |------------------------|--------------------|
    /// | `GOOGLE_API_KEY`       | `api_key`          |
    /// | `GEMINI_API_KEY`       | `api_key` fallback |
    /// | `RESUME_ATS_PROVIDER`  | `backend`          |
    /// | `RESUME_ATS_MODEL`     | `model`            |
    /// | `RESUME_ATS_API_BASE`  | `api_base`         |
    /// | `PDFIUM_LIB_PATH`      | `pdfium_lib_path`  |
    ///
    /// Callers that want to layer CLI flags on top use this and then
    /// `build()`; [`AtsConfig::from_env`] does both.
    pub fn builder_from_env() -> AtsConfigBuilder {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let mut builder = Self::builder();
        if let Some(key) = env_non_empty(API_KEY_ENV).or_else(|| env_non_empty("GEMINI_API_KEY")) {
            builder = builder.api_key(key);
        }
        if let Some(provider) = env_non_empty("RESUME_ATS_PROVIDER") {
            builder = builder.backend(Backend::from_name(&provider));
        }
        if let Some(model) = env_non_empty("RESUME_ATS_MODEL") {
            builder = builder.model(model);
        }
        if let Some(base) = env_non_empty("RESUME_ATS_API_BASE") {
            builder = builder.api_base(base);
        }
        if let Some(path) = env_non_empty("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(path);
        }
        builder
    }

    /// Build the configuration from the environment.
    ///
    /// # Errors
    /// [`AtsError::ProviderNotConfigured`] when the Gemini backend is selected
    /// and no key is set. This is meant to be called once at startup.
    pub fn from_env() -> Result<Self, AtsError> {
        Self::builder_from_env().build()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`AtsConfig`].
#[derive(Debug)]
pub struct AtsConfigBuilder {
    config: AtsConfig,
}

impl AtsConfigBuilder {
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AtsConfig, AtsError> {
        let c = &self.config;
        if c.backend == Backend::Gemini
            && c.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(AtsError::ProviderNotConfigured {
                provider: "gemini".into(),
                hint: format!("Set {API_KEY_ENV} in the environment or in a .env file."),
            });
        }
        if c.model.trim().is_empty() {
            return Err(AtsError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(AtsError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.backend == Backend::Gemini && reqwest::Url::parse(&c.api_base).is_err() {
            return Err(AtsError::InvalidConfig(format!(
                "API base is not a valid URL: '{}'",
                c.api_base
            )));
        }
        Ok(self.config)
    }
}
