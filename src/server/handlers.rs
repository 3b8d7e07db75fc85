use super::page::{self, PageView};
use super::types::{ErrorResponse, HealthResponse, Submission};
use crate::controller::InteractionController;
use crate::error::{AtsError, ErrorKind};
use crate::output::AnalysisOutput;
use crate::pipeline::upload::UploadedResume;
use crate::prompts::PromptKind;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<InteractionController>,
}

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

/// `GET /`: the empty form.
pub async fn index() -> PageResult {
    html_page(&PageView::default())
}

/// `POST /`: one button press from the form.
///
/// User-facing failures (no résumé, unreadable PDF, provider error) are
/// shown in the page with HTTP 200 so the form stays usable.
pub async fn submit(State(state): State<AppState>, multipart: Multipart) -> PageResult {
    let (kind, submission) = match parse_request(multipart).await {
        Ok(parsed) => parsed,
        Err((status, e)) => {
            warn!("Rejected form submit: {}", e);
            let page = html_page(&PageView::with_banner(&e.to_string()))?;
            return Err((status, page));
        }
    };

    let upload_name = submission.resume.as_ref().map(|r| r.name().to_string());
    info!(
        "Form submit: action={}, resume={}",
        kind,
        upload_name.as_deref().unwrap_or("<none>")
    );

    let outcome = state
        .controller
        .trigger(kind, submission.resume, &submission.job_description)
        .await;

    html_page(&PageView {
        job_description: submission.job_description,
        upload_name,
        outcome: Some(outcome),
        banner: None,
    })
}

/// `POST /api/analyze`: same fields as the form, JSON in and out.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisOutput>, (StatusCode, Json<ErrorResponse>)> {
    let (kind, submission) = parse_request(multipart).await.map_err(|(status, e)| {
        warn!("Rejected API request: {}", e);
        (status, Json(ErrorResponse::from(&e)))
    })?;

    state
        .controller
        .run(kind, submission.resume, &submission.job_description)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("API {} failed: {}", kind, e);
            (status_for(&e), Json(ErrorResponse::from(&e)))
        })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.controller.backend();
    Json(HealthResponse {
        status: "ok",
        provider: backend.name().to_string(),
        model: backend.model().to_string(),
    })
}

/// HTTP status for an action failure on the JSON API.
pub fn status_for(e: &AtsError) -> StatusCode {
    match (e, e.kind()) {
        (AtsError::Internal(_), _) => StatusCode::INTERNAL_SERVER_ERROR,
        (_, ErrorKind::MissingInput | ErrorKind::Conversion | ErrorKind::InvalidRequest) => {
            StatusCode::BAD_REQUEST
        }
        (_, ErrorKind::Inference) => StatusCode::BAD_GATEWAY,
        (_, ErrorKind::Configuration) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn html_page(view: &PageView) -> PageResult {
    page::render(view).map(Html).map_err(|e| {
        error!("{}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("Internal error".to_string()),
        )
    })
}

/// Read the form and resolve the pressed button.
///
/// Failures here mean the request itself was unusable; they carry the HTTP
/// status to answer with (400, or 413 for an over-limit body).
async fn parse_request(
    multipart: Multipart,
) -> Result<(PromptKind, Submission), (StatusCode, AtsError)> {
    let submission = read_submission(multipart)
        .await
        .map_err(|e| (e.status(), AtsError::InvalidRequest(e.body_text())))?;
    let kind = parse_action(submission.action.as_deref())
        .map_err(|msg| (StatusCode::BAD_REQUEST, AtsError::InvalidRequest(msg)))?;
    Ok((kind, submission))
}

fn parse_action(action: Option<&str>) -> Result<PromptKind, String> {
    action
        .ok_or_else(|| "No action selected: expected 'analyze' or 'match'".to_string())?
        .parse()
}

/// Collect the `resume`, `job_description` and `action` fields.
///
/// Unknown fields are ignored. A file part with neither a file name nor
/// content is what browsers send when the picker was left empty, so it
/// counts as no upload. A named but empty file is kept and fails later as
/// a conversion error.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, MultipartError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("resume") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if !(filename.is_empty() && data.is_empty()) {
                    submission.resume = Some(UploadedResume::new(filename, data.to_vec()));
                }
            }
            Some("job_description") => {
                submission.job_description = field.text().await?;
            }
            Some("action") => {
                submission.action = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(submission)
}
