//! Result of one action.

use crate::prompts::PromptKind;
use serde::{Deserialize, Serialize};

/// The model's answer plus where and how fast it came.
///
/// `text` is exactly what the provider returned; it is not parsed, trimmed
/// or validated against the layout the prompt asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub kind: PromptKind,
    pub text: String,
    pub provider: String,
    pub model: String,
    pub stats: ActionStats,
}

/// Wall-clock timings for one action, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    /// Rasterise + encode.
    pub render_ms: u64,
    pub inference_ms: u64,
    pub total_ms: u64,
    /// Size of the base64 image sent to the model.
    pub image_bytes: usize,
}
