//! Instruction text sent to the model, one per action.
//!
//! The two prompts are fixed: users pick one by pressing a button and never
//! edit them. [`PromptKind`] is what flows through the rest of the crate;
//! the literal text only appears here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruction for the "Analyze Resume" action.
pub const CRITIQUE_PROMPT: &str = r#"
You are an experienced HR with Technical Experience in the field of any one job role from Data Science, Data Analyst, DevOPS, Machine Learning Engineer, Prompt Engineer, AI Engineer, Full Stack Web Development, Big Data Engineering, Marketing Analyst, Human Resource Manager, Software Developer your task is to review the provided resume against the job description for these profiles.
Please share your professional evaluation on whether the candidate's profile aligns with the role.
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.
"#;

/// Instruction for the "Match Percentage" action.
///
/// The answer layout (percentage, missing keywords, final thoughts) is only
/// requested here; nothing checks that the model follows it.
pub const MATCH_PROMPT: &str = r#"
You are an skilled ATS (Applicant Tracking System) scanner with a deep understanding of any one job role from Data Science, Data Analyst, DevOPS, Machine Learning Engineer, Prompt Engineering, AI Engineer, Full Stack Web Development, Big Data Engineering, Marketing Analyst, Human Resource Manager, Software Developer and deep ATS functionality,
your task is to evaluate the resume against the provided job description, give me only the Percentage of match if the resume matches
the job description. First the output should come as Percentage and then list of Keywords Missing and last final thoughts.
"#;

/// Which action the user triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// "Analyze Resume": strengths and weaknesses against the job description.
    #[serde(rename = "analyze", alias = "critique")]
    Critique,
    /// "Match Percentage": score, missing keywords, final thoughts.
    Match,
}

impl PromptKind {
    pub const ALL: [PromptKind; 2] = [PromptKind::Critique, PromptKind::Match];

    /// The instruction text bound to this action.
    pub fn template(self) -> &'static str {
        match self {
            PromptKind::Critique => CRITIQUE_PROMPT,
            PromptKind::Match => MATCH_PROMPT,
        }
    }

    /// Form value submitted by this action's button.
    pub fn action(self) -> &'static str {
        match self {
            PromptKind::Critique => "analyze",
            PromptKind::Match => "match",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            PromptKind::Critique => "🔎 Analyze Resume",
            PromptKind::Match => "📈 Match Percentage",
        }
    }

    pub fn button_help(self) -> &'static str {
        match self {
            PromptKind::Critique => "Get detailed evaluation of your resume",
            PromptKind::Match => "Find out how well your resume matches the job description",
        }
    }

    /// Shown while the action is running.
    pub fn progress_message(self) -> &'static str {
        match self {
            PromptKind::Critique => "Processing...",
            PromptKind::Match => "Calculating match...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            PromptKind::Critique => "Analysis Complete!",
            PromptKind::Match => "Match Calculation Complete!",
        }
    }

    pub fn result_heading(self) -> &'static str {
        match self {
            PromptKind::Critique => "Evaluation Results:",
            PromptKind::Match => "Match Results:",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

impl FromStr for PromptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analyze" | "analyse" | "critique" => Ok(PromptKind::Critique),
            "match" | "percentage" => Ok(PromptKind::Match),
            other => Err(format!(
                "unknown action '{other}': expected 'analyze' or 'match'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_its_own_template() {
        assert_eq!(PromptKind::Critique.template(), CRITIQUE_PROMPT);
        assert_eq!(PromptKind::Match.template(), MATCH_PROMPT);
        assert_ne!(CRITIQUE_PROMPT, MATCH_PROMPT);
    }

    #[test]
    fn match_prompt_asks_for_percentage_first() {
        let p = MATCH_PROMPT;
        let pct = p.find("Percentage and then").expect("ordering instruction");
        let kw = p.find("Keywords Missing").expect("keywords instruction");
        let thoughts = p.find("final thoughts").expect("thoughts instruction");
        assert!(pct < kw && kw < thoughts);
    }

    #[test]
    fn action_round_trips_through_from_str() {
        for kind in PromptKind::ALL {
            assert_eq!(kind.action().parse::<PromptKind>().unwrap(), kind);
        }
        assert!("summarise".parse::<PromptKind>().is_err());
    }

    #[test]
    fn user_facing_copy() {
        assert_eq!(PromptKind::Critique.result_heading(), "Evaluation Results:");
        assert_eq!(PromptKind::Match.success_message(), "Match Calculation Complete!");
        assert!(PromptKind::Critique.button_label().ends_with("Analyze Resume"));
        assert!(PromptKind::Match.button_label().ends_with("Match Percentage"));
    }
}
