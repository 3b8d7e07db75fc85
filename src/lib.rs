//! # resume-ats
//!
//! Review a résumé against a job description with a hosted vision model.
//!
//! The user uploads a PDF and pastes a job description, then presses one of
//! two buttons. "Analyze Resume" asks the model for a critique; "Match
//! Percentage" asks for a score, the missing keywords and final thoughts.
//! The model reads the résumé as an image of its first page, so layout and
//! typography reach it intact.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Upload   presence and %PDF checks (fails fast when absent)
//!  ├─ 2. Render   page index 0 via pdfium (spawn_blocking)
//!  ├─ 3. Encode   JPEG → base64 RasterizedPage
//!  ├─ 4. Infer    [instruction, image, job description] → model
//!  └─ 5. Output   raw model text + timings
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_ats::{AtsConfig, InteractionController, PromptKind, UploadedResume};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GOOGLE_API_KEY (and a .env file, if present)
//!     let config = AtsConfig::from_env()?;
//!     let controller = InteractionController::from_config(&config)?;
//!
//!     let resume = UploadedResume::from_path("resume.pdf").await?;
//!     let output = controller
//!         .run(PromptKind::Match, Some(resume), "Looking for a Python Developer")
//!         .await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-ats` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AtsConfig, AtsConfigBuilder, Backend};
pub use controller::{ActionState, InteractionController};
pub use error::{AtsError, ErrorKind, MISSING_RESUME_MESSAGE};
pub use inference::{backend_from_config, InferenceBackend};
pub use output::{ActionStats, AnalysisOutput};
pub use pipeline::encode::RasterizedPage;
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use pipeline::upload::UploadedResume;
pub use prompts::PromptKind;
