//! Server-rendered HTML for the single page (`templates/index.html`).
//!
//! askama escapes every interpolated value, so user input and model output
//! can be handed to the template as-is.

use crate::controller::ActionState;
use crate::error::AtsError;
use crate::prompts::PromptKind;
use askama::Template;

pub const TITLE: &str = "Application Tracking System";
pub const SUBTITLE: &str = "Optimize your Resume for top job opportunities with AI insights";
pub const UPLOAD_OK: &str = "Resume Uploaded Successfully ✅";
pub const UPLOAD_PROMPT: &str = "Please upload your resume to proceed.";

/// Everything needed to draw the page once.
#[derive(Debug, Default)]
pub struct PageView {
    pub job_description: String,
    /// File name of the résumé that came with this submission.
    pub upload_name: Option<String>,
    pub outcome: Option<ActionState>,
    /// Error shown above the form when the request itself was unusable.
    pub banner: Option<String>,
}

impl PageView {
    pub fn with_banner(message: &str) -> Self {
        Self {
            banner: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    title: &'static str,
    subtitle: &'static str,
    upload_ok: &'static str,
    upload_prompt: &'static str,
    job_description: &'a str,
    upload_name: Option<&'a str>,
    banner: Option<&'a str>,
    buttons: Vec<ActionButton>,
    result: Option<ResultPanel<'a>>,
    error: Option<&'a str>,
}

struct ActionButton {
    value: &'static str,
    label: &'static str,
    help: &'static str,
    progress: &'static str,
}

struct ResultPanel<'a> {
    success: &'static str,
    heading: &'static str,
    text: &'a str,
}

impl<'a> IndexPage<'a> {
    fn new(view: &'a PageView) -> Self {
        let (result, error) = match view.outcome {
            Some(ActionState::Result { ref output }) => (
                Some(ResultPanel {
                    success: output.kind.success_message(),
                    heading: output.kind.result_heading(),
                    text: &output.text,
                }),
                None,
            ),
            Some(ActionState::Error { ref message, .. }) => (None, Some(message.as_str())),
            Some(ActionState::Idle | ActionState::Processing { .. }) | None => (None, None),
        };

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            upload_ok: UPLOAD_OK,
            upload_prompt: UPLOAD_PROMPT,
            job_description: &view.job_description,
            upload_name: view.upload_name.as_deref(),
            banner: view.banner.as_deref(),
            buttons: PromptKind::ALL
                .iter()
                .map(|kind| ActionButton {
                    value: kind.action(),
                    label: kind.button_label(),
                    help: kind.button_help(),
                    progress: kind.progress_message(),
                })
                .collect(),
            result,
            error,
        }
    }
}

pub fn render(view: &PageView) -> Result<String, AtsError> {
    IndexPage::new(view)
        .render()
        .map_err(|e| AtsError::Internal(format!("page template: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::output::{ActionStats, AnalysisOutput};

    #[test]
    fn empty_form_has_both_buttons_and_upload_prompt() {
        let html = render(&PageView::default()).unwrap();
        assert!(html.contains("value=\"analyze\""));
        assert!(html.contains("value=\"match\""));
        assert!(html.contains("Analyze Resume"));
        assert!(html.contains("Match Percentage"));
        assert!(html.contains(UPLOAD_PROMPT));
        assert!(!html.contains("id=\"result\""));
    }

    #[test]
    fn job_description_markup_is_escaped() {
        let view = PageView {
            job_description: "</textarea><script>alert(1)</script>".into(),
            ..PageView::default()
        };
        let html = render(&view).unwrap();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
    }

    #[test]
    fn result_is_escaped_and_titled() {
        let view = PageView {
            job_description: "Python <dev>".into(),
            upload_name: Some("cv.pdf".into()),
            outcome: Some(ActionState::Result {
                output: AnalysisOutput {
                    kind: PromptKind::Match,
                    text: "85% <script>".into(),
                    provider: "gemini".into(),
                    model: "gemini-1.5-flash".into(),
                    stats: ActionStats::default(),
                },
            }),
            banner: None,
        };
        let html = render(&view).unwrap();
        assert!(html.contains("Match Calculation Complete!"));
        assert!(html.contains("Match Results:"));
        assert!(html.contains("85% &lt;script&gt;"));
        assert!(html.contains("Python &lt;dev&gt;"));
        assert!(html.contains(UPLOAD_OK));
    }

    #[test]
    fn error_outcome_shows_message() {
        let view = PageView {
            outcome: Some(ActionState::Error {
                kind: PromptKind::Critique,
                error_kind: ErrorKind::MissingInput,
                message: "Please upload a resume to proceed.".into(),
            }),
            ..PageView::default()
        };
        let html = render(&view).unwrap();
        assert!(html.contains("<div class=\"banner error\">Please upload a resume to proceed.</div>"));
    }

    #[test]
    fn banner_is_shown_above_form() {
        let html = render(&PageView::with_banner("Invalid request: no action")).unwrap();
        let banner = html.find("Invalid request: no action").unwrap();
        assert!(banner < html.find("<form").unwrap());
    }
}
