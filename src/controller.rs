//! The sequence behind each action button.
//!
//! ```text
//!            press                  rasterise + infer
//!   Idle ─────────────▶ Processing ─────────────────────▶ Result
//!    ▲   (no résumé)        │                                │
//!    │  ──────────────▶ Error ◀────── (any failure) ─────────┘ (next press)
//!    └────────────────────────────────────────────────────────
//! ```
//!
//! Both actions run the same steps and differ only in the [`PromptKind`]
//! they bind. Each press re-rasterises and re-infers; nothing is cached
//! between presses. The controller is immutable and can be shared across
//! requests behind an `Arc`.

use crate::config::AtsConfig;
use crate::error::{AtsError, ErrorKind};
use crate::inference::{backend_from_config, InferenceBackend};
use crate::output::{ActionStats, AnalysisOutput};
use crate::pipeline::encode::{self, RasterizedPage};
use crate::pipeline::render::{self, PdfiumRasterizer, Rasterizer};
use crate::pipeline::upload::{require_upload, UploadedResume};
use crate::prompts::PromptKind;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Where an action stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    Idle,
    Processing { kind: PromptKind },
    Result { output: AnalysisOutput },
    Error {
        kind: PromptKind,
        error_kind: ErrorKind,
        message: String,
    },
}

impl ActionState {
    fn label(&self) -> &'static str {
        match self {
            ActionState::Idle => "Idle",
            ActionState::Processing { .. } => "Processing",
            ActionState::Result { .. } => "Result",
            ActionState::Error { .. } => "Error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionState::Result { .. } | ActionState::Error { .. })
    }
}

/// Wires the two actions to rasterisation and inference.
#[derive(Clone)]
pub struct InteractionController {
    rasterizer: Arc<dyn Rasterizer>,
    backend: Arc<dyn InferenceBackend>,
    jpeg_quality: u8,
}

impl InteractionController {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        backend: Arc<dyn InferenceBackend>,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            rasterizer,
            backend,
            jpeg_quality,
        }
    }

    /// pdfium rasteriser plus the backend `config` selects.
    pub fn from_config(config: &AtsConfig) -> Result<Self, AtsError> {
        let backend = backend_from_config(config)?;
        Ok(Self::new(
            Arc::new(PdfiumRasterizer::new(config)),
            backend,
            config.jpeg_quality,
        ))
    }

    pub fn backend(&self) -> &Arc<dyn InferenceBackend> {
        &self.backend
    }

    /// Run one action to completion.
    ///
    /// # Errors
    /// [`AtsError::MissingInput`] when `resume` is absent, before anything
    /// else runs. Conversion and inference errors pass through unchanged.
    pub async fn run(
        &self,
        kind: PromptKind,
        resume: Option<UploadedResume>,
        job_description: &str,
    ) -> Result<AnalysisOutput, AtsError> {
        let total_start = Instant::now();
        let resume = require_upload(resume)?;
        info!(
            "{}: processing '{}' ({} bytes)",
            kind,
            resume.name(),
            resume.len()
        );

        // ── Step 1: Rasterise + encode page one ──────────────────────────
        let render_start = Instant::now();
        let page = self.rasterize(resume).await?;
        let render_ms = render_start.elapsed().as_millis() as u64;

        // ── Step 2: Inference ────────────────────────────────────────────
        let inference_start = Instant::now();
        let text = self
            .backend
            .generate(kind.template(), &page, job_description)
            .await?;
        let inference_ms = inference_start.elapsed().as_millis() as u64;

        let stats = ActionStats {
            render_ms,
            inference_ms,
            total_ms: total_start.elapsed().as_millis() as u64,
            image_bytes: page.data.len(),
        };
        info!(
            "{}: complete in {}ms (render {}ms, inference {}ms)",
            kind, stats.total_ms, render_ms, inference_ms
        );

        Ok(AnalysisOutput {
            kind,
            text,
            provider: self.backend.name().to_string(),
            model: self.backend.model().to_string(),
            stats,
        })
    }

    /// Run one action and return the state it ends in.
    ///
    /// Never fails: every error becomes [`ActionState::Error`] so the caller
    /// can show it and stay usable.
    pub async fn trigger(
        &self,
        kind: PromptKind,
        resume: Option<UploadedResume>,
        job_description: &str,
    ) -> ActionState {
        let mut state = ActionState::Idle;
        if resume.is_some() {
            state = transition(state, ActionState::Processing { kind });
        }

        let next = match self.run(kind, resume, job_description).await {
            Ok(output) => ActionState::Result { output },
            Err(e) => {
                match e.kind() {
                    ErrorKind::MissingInput => warn!("{}: {}", kind, e),
                    _ => error!("{}: {}", kind, e),
                }
                ActionState::Error {
                    kind,
                    error_kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };
        transition(state, next)
    }

    async fn rasterize(&self, resume: UploadedResume) -> Result<RasterizedPage, AtsError> {
        let image = render::render_first_page(Arc::clone(&self.rasterizer), resume).await?;
        encode::encode_page(&image, self.jpeg_quality)
    }
}

fn transition(from: ActionState, to: ActionState) -> ActionState {
    debug!("{} → {}", from.label(), to.label());
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::sync::Mutex;

    struct WhitePage;

    impl Rasterizer for WhitePage {
        fn rasterize_first_page(&self, _resume: &UploadedResume) -> Result<DynamicImage, AtsError> {
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                8,
                8,
                Rgba([255, 255, 255, 255]),
            )))
        }
    }

    #[derive(Default)]
    struct EchoBackend {
        instructions: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InferenceBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn generate(
            &self,
            instruction: &str,
            _image: &RasterizedPage,
            context: &str,
        ) -> Result<String, AtsError> {
            self.instructions.lock().unwrap().push(instruction.to_string());
            Ok(format!("echo: {context}"))
        }
    }

    fn controller(backend: Arc<EchoBackend>) -> InteractionController {
        InteractionController::new(Arc::new(WhitePage), backend, 90)
    }

    fn resume() -> Option<UploadedResume> {
        Some(UploadedResume::new("cv.pdf", b"%PDF-1.4\n".to_vec()))
    }

    #[tokio::test]
    async fn run_binds_prompt_and_context() {
        let backend = Arc::new(EchoBackend::default());
        let out = controller(backend.clone())
            .run(PromptKind::Match, resume(), "Python Developer")
            .await
            .unwrap();
        assert_eq!(out.text, "echo: Python Developer");
        assert_eq!(out.kind, PromptKind::Match);
        assert_eq!(out.provider, "echo");
        assert!(out.stats.image_bytes > 0);
        assert_eq!(
            backend.instructions.lock().unwrap().as_slice(),
            [PromptKind::Match.template().to_string()]
        );
    }

    #[tokio::test]
    async fn trigger_without_resume_ends_in_error_state() {
        let backend = Arc::new(EchoBackend::default());
        let state = controller(backend.clone())
            .trigger(PromptKind::Critique, None, "anything")
            .await;
        match state {
            ActionState::Error {
                error_kind,
                message,
                kind,
            } => {
                assert_eq!(kind, PromptKind::Critique);
                assert_eq!(error_kind, ErrorKind::MissingInput);
                assert_eq!(message, "Please upload a resume to proceed.");
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(backend.instructions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn trigger_success_is_terminal_result() {
        let backend = Arc::new(EchoBackend::default());
        let state = controller(backend)
            .trigger(PromptKind::Critique, resume(), "")
            .await;
        assert!(state.is_terminal());
        assert!(matches!(state, ActionState::Result { .. }));
    }

    #[test]
    fn state_serialises_with_tag() {
        let json = serde_json::to_value(ActionState::Processing {
            kind: PromptKind::Match,
        })
        .unwrap();
        assert_eq!(json["state"], "processing");
        assert_eq!(json["kind"], "match");
    }
}
