//! Error types for the resume-ats library.
//!
//! Every failure an action can hit is an [`AtsError`]. Callers rarely care
//! about the exact variant; they care about which of four buckets it falls
//! into, because that decides what the user sees and which HTTP status the
//! API answers with. [`AtsError::kind`] gives that bucket.
//!
//! | [`ErrorKind`]   | Raised when                                         |
//! |-----------------|-----------------------------------------------------|
//! | `MissingInput`  | an action runs with no résumé uploaded              |
//! | `Conversion`    | the upload is not a readable PDF, or render failed  |
//! | `Inference`     | the remote model call failed                        |
//! | `Configuration` | no credential, bad settings, pdfium not loadable    |
//! | `InvalidRequest`| the HTTP request carried no usable action or form   |
//!
//! All of them end the triggering action only. Nothing here is retried.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// User-facing message for an action triggered without a résumé.
pub const MISSING_RESUME_MESSAGE: &str = "Please upload a resume to proceed.";

/// All errors returned by the resume-ats library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// An action was triggered but no résumé was uploaded.
    #[error("{}", MISSING_RESUME_MESSAGE)]
    MissingInput,

    /// Input file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload was read, but is not a PDF.
    #[error("'{name}' is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' could not be read: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password. Encrypted résumés are not supported.
    #[error("PDF '{name}' is password protected. Upload an unencrypted copy.")]
    PasswordRequired { name: String },

    /// The PDF parsed but has no pages to render.
    #[error("PDF '{name}' has no pages")]
    EmptyDocument { name: String },

    /// pdfium-render returned an error for the first page.
    #[error("Rasterisation of the first page failed: {detail}")]
    RasterisationFailed { detail: String },

    /// The rendered page could not be JPEG-encoded.
    #[error("Image encoding failed: {detail}")]
    ImageEncodingFailed { detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error, passed through verbatim.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// API returned HTTP 401/403.
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// API returned HTTP 429.
    #[error("Rate limit exceeded for provider '{provider}'{}", retry_hint(.retry_after_secs))]
    RateLimitExceeded {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// API call did not answer within the configured timeout.
    #[error("API call timed out after {elapsed_ms}ms")]
    ApiTimeout { elapsed_ms: u64 },

    /// The provider answered 2xx but the body held no usable text.
    #[error("Malformed response from provider '{provider}': {detail}")]
    MalformedResponse { provider: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium or set PDFIUM_LIB_PATH to the directory that contains it."
    )]
    PdfiumBindingFailed(String),

    // ── Request errors ────────────────────────────────────────────────────
    /// The HTTP request itself was unusable: bad multipart body, unknown
    /// or missing action.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

/// Coarse classification of an [`AtsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingInput,
    Conversion,
    Inference,
    Configuration,
    InvalidRequest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::MissingInput => "missing_input",
            ErrorKind::Conversion => "conversion",
            ErrorKind::Inference => "inference",
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidRequest => "invalid_request",
        };
        f.write_str(s)
    }
}

impl AtsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AtsError::MissingInput => ErrorKind::MissingInput,
            AtsError::FileNotFound { .. }
            | AtsError::PermissionDenied { .. }
            | AtsError::NotAPdf { .. }
            | AtsError::CorruptPdf { .. }
            | AtsError::PasswordRequired { .. }
            | AtsError::EmptyDocument { .. }
            | AtsError::RasterisationFailed { .. }
            | AtsError::ImageEncodingFailed { .. }
            | AtsError::Internal(_) => ErrorKind::Conversion,
            AtsError::LlmApiError { .. }
            | AtsError::AuthError { .. }
            | AtsError::RateLimitExceeded { .. }
            | AtsError::ApiTimeout { .. }
            | AtsError::MalformedResponse { .. } => ErrorKind::Inference,
            AtsError::ProviderNotConfigured { .. }
            | AtsError::InvalidConfig(_)
            | AtsError::PdfiumBindingFailed(_) => ErrorKind::Configuration,
            AtsError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_uses_user_message() {
        assert_eq!(
            AtsError::MissingInput.to_string(),
            "Please upload a resume to proceed."
        );
        assert_eq!(AtsError::MissingInput.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn rate_limit_display_with_retry() {
        let e = AtsError::RateLimitExceeded {
            provider: "gemini".into(),
            retry_after_secs: Some(30),
        };
        let msg = e.to_string();
        assert!(msg.contains("gemini"), "got: {msg}");
        assert!(msg.contains("retry after 30s"), "got: {msg}");
    }

    #[test]
    fn rate_limit_display_without_retry() {
        let e = AtsError::RateLimitExceeded {
            provider: "gemini".into(),
            retry_after_secs: None,
        };
        assert!(!e.to_string().contains("retry after"));
    }

    #[test]
    fn not_a_pdf_is_conversion_error() {
        let e = AtsError::NotAPdf {
            name: "resume.pdf".into(),
            magic: b"John".to_vec(),
        };
        assert_eq!(e.kind(), ErrorKind::Conversion);
        assert!(e.to_string().contains("resume.pdf"));
    }

    #[test]
    fn inference_errors_classify_together() {
        let errors = [
            AtsError::AuthError {
                provider: "gemini".into(),
                detail: "API key not valid".into(),
            },
            AtsError::ApiTimeout { elapsed_ms: 60_000 },
            AtsError::LlmApiError {
                message: "quota".into(),
            },
        ];
        for e in errors {
            assert_eq!(e.kind(), ErrorKind::Inference, "{e}");
        }
    }

    #[test]
    fn kind_serialises_snake_case() {
        let json = serde_json::to_string(&ErrorKind::MissingInput).unwrap();
        assert_eq!(json, "\"missing_input\"");
        assert_eq!(ErrorKind::Configuration.to_string(), "configuration");
        assert_eq!(
            serde_json::to_string(&ErrorKind::InvalidRequest).unwrap(),
            "\"invalid_request\""
        );
    }

    #[test]
    fn bad_request_is_not_missing_input() {
        let e = AtsError::InvalidRequest("unknown action 'summarise'".into());
        assert_eq!(e.kind(), ErrorKind::InvalidRequest);
        assert_eq!(e.to_string(), "Invalid request: unknown action 'summarise'");
    }
}
