use crate::error::{AtsError, ErrorKind};
use crate::pipeline::upload::UploadedResume;
use serde::Serialize;

/// Fields of one form submission.
#[derive(Debug, Default)]
pub struct Submission {
    pub resume: Option<UploadedResume>,
    pub job_description: String,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&AtsError> for ErrorResponse {
    fn from(e: &AtsError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: String,
    pub model: String,
}
