pub mod console;
pub mod dataset;
pub mod markdown;

use crate::github::Repository;
use std::collections::HashMap;

/// Aggregate figures over one ranked list
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub repo_count: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Repository count per language, highest count first, ties by name
    pub languages: Vec<(String, usize)>,
}

impl Analysis {
    pub fn from_repositories(repos: &[Repository]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for repo in repos {
            *counts.entry(repo.language_label()).or_insert(0) += 1;
        }

        let mut languages: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(language, count)| (language.to_string(), count))
            .collect();
        languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            repo_count: repos.len(),
            total_stars: repos.iter().map(|r| r.stars).sum(),
            total_forks: repos.iter().map(|r| r.forks).sum(),
            languages,
        }
    }

    pub fn count_for(&self, language: &str) -> usize {
        self.languages
            .iter()
            .find(|(name, _)| name == language)
            .map_or(0, |(_, count)| *count)
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Signed percentage, or `N/A` when undefined
pub(crate) fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(value) => format!("{:+.2}%", value),
        None => "N/A".to_string(),
    }
}
