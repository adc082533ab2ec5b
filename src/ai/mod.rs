pub mod chat;
pub mod prompt;

use crate::ai::chat::ChatClient;
use crate::ai::prompt::{generate_summary_prompt, parse_response};
use crate::error::{Result, TrendingError};
use crate::github::Repository;
use std::fmt;
use tracing::{debug, warn};

/// Text shown wherever a summary could not be produced
pub const NO_SUMMARY: &str = "no summary";

/// Result of summarizing one repository
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// Model-generated bullet summary
    Generated(String),
    /// Placeholder case with the reason it applies
    Unavailable(SkipReason),
}

/// Why a repository has no summary
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No API key configured
    NotConfigured,
    /// Neither README nor description to work from
    NoContent,
    /// The request or its response failed
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "summaries not configured"),
            Self::NoContent => write!(f, "no README or description"),
            Self::Failed(reason) => write!(f, "request failed: {}", reason),
        }
    }
}

impl SummaryOutcome {
    /// Summary text for the record, `None` for the placeholder case
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Generated(text) => Some(text),
            Self::Unavailable(_) => None,
        }
    }

    /// Text to render, falling back to the placeholder
    pub fn display_text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Unavailable(_) => NO_SUMMARY,
        }
    }
}

/// Produces short summaries; degrades to the placeholder without a key
pub struct Summarizer {
    client: Option<ChatClient>,
}

impl Summarizer {
    /// Create a summarizer; `None` disables network calls entirely
    pub fn new(client: Option<ChatClient>) -> Self {
        Self { client }
    }

    /// Summarizer that never calls out
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Summarize one repository. Failures become `Unavailable`, never errors.
    pub async fn summarize(&self, repo: &Repository, readme: Option<&str>) -> SummaryOutcome {
        let Some(client) = &self.client else {
            return SummaryOutcome::Unavailable(SkipReason::NotConfigured);
        };

        let has_description = repo
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if readme.is_none() && !has_description {
            debug!(repo = %repo.full_name, "Nothing to summarize");
            return SummaryOutcome::Unavailable(SkipReason::NoContent);
        }

        match self.request(client, repo, readme).await {
            Ok(text) => SummaryOutcome::Generated(text),
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "Summary request failed");
                SummaryOutcome::Unavailable(SkipReason::Failed(e.to_string()))
            }
        }
    }

    async fn request(
        &self,
        client: &ChatClient,
        repo: &Repository,
        readme: Option<&str>,
    ) -> Result<String> {
        let prompt = generate_summary_prompt(repo, readme);
        debug!(repo = %repo.full_name, prompt_chars = prompt.len(), "Requesting summary");

        let response = client.complete(prompt).await?;
        parse_response(&response)
            .ok_or_else(|| TrendingError::summarizer("empty completion"))
    }
}
