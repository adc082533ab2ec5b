use crate::ai::NO_SUMMARY;
use crate::github::Repository;
use crate::report::{format_pct, truncate_chars, Analysis};
use crate::trend::TrendReport;
use std::fmt::Write;

const CONSOLE_DESCRIPTION_CHARS: usize = 100;

/// Plain-text ranking for the terminal
pub fn render(repos: &[Repository], analysis: &Analysis) -> String {
    let mut out = String::new();
    let header = "GitHub Trending Report";
    let separator = "=".repeat(60);

    let _ = writeln!(out, "{}\n{}\n{}", separator, header, separator);
    let _ = writeln!(out, "Found {} trending projects", analysis.repo_count);

    if repos.is_empty() {
        out.push_str("No trending projects found\n");
        return out;
    }

    for (i, repo) in repos.iter().enumerate() {
        let _ = writeln!(out, "\n#{} {}", i + 1, repo.full_name);
        let _ = writeln!(out, "  Link:        {}", repo.html_url);

        let description = repo
            .description
            .as_deref()
            .map(|d| truncate_chars(d.trim(), CONSOLE_DESCRIPTION_CHARS))
            .unwrap_or_else(|| "No description".to_string());
        let _ = writeln!(out, "  Description: {}", description);
        let _ = writeln!(out, "  Stars:       {}", repo.stars);
        let _ = writeln!(out, "  Language:    {}", repo.language_label());

        if let Some(created) = repo.created_at {
            let _ = writeln!(out, "  Created:     {}", created.format("%Y-%m-%d"));
        }
        if let Some(pushed) = repo.pushed_at {
            let _ = writeln!(out, "  Pushed:      {}", pushed.format("%Y-%m-%d"));
        }

        match repo.ai_summary.as_deref() {
            Some(summary) => {
                out.push_str("  Summary:\n");
                for line in summary.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            }
            None => {
                let _ = writeln!(out, "  Summary:     {}", NO_SUMMARY);
            }
        }
        let _ = writeln!(out, "{}", "-".repeat(50));
    }

    out.push_str("\nLanguage distribution:\n");
    for (language, count) in &analysis.languages {
        let _ = writeln!(out, "  {}: {}", language, count);
    }

    let _ = writeln!(out, "\nTotal stars: {}", analysis.total_stars);
    let _ = writeln!(out, "Total forks: {}", analysis.total_forks);
    let _ = writeln!(out, "{}", separator);
    out
}

/// Plain-text trend comparison for the terminal
pub fn render_trend(trend: &TrendReport) -> String {
    let mut out = String::new();
    let separator = "=".repeat(60);

    let _ = writeln!(out, "{}\nTrend Comparison\n{}", separator, separator);
    let _ = writeln!(
        out,
        "Total stars: {} -> {} ({:+}, {})",
        trend.total_stars.previous,
        trend.total_stars.current,
        trend.total_stars.delta(),
        format_pct(trend.total_stars.pct())
    );
    let _ = writeln!(
        out,
        "Total forks: {} -> {} ({:+}, {})",
        trend.total_forks.previous,
        trend.total_forks.current,
        trend.total_forks.delta(),
        format_pct(trend.total_forks.pct())
    );

    if !trend.languages.is_empty() {
        out.push_str("\nLanguage changes:\n");
        for language in &trend.languages {
            let _ = writeln!(
                out,
                "  - {}: {} -> {} ({:+}, {})",
                language.language,
                language.change.previous,
                language.change.current,
                language.change.delta(),
                format_pct(language.change.pct())
            );
        }
    }

    let entrants: Vec<_> = trend.new_entrants().collect();
    if !entrants.is_empty() {
        let _ = writeln!(out, "\nNew entrants ({}):", entrants.len());
        for entry in entrants {
            let _ = writeln!(out, "  #{} {} ({} stars)", entry.rank, entry.full_name, entry.stars);
        }
    }

    if !trend.dropped.is_empty() {
        let _ = writeln!(out, "\nDropped ({}):", trend.dropped.len());
        for entry in &trend.dropped {
            let _ = writeln!(out, "  was #{} {}", entry.previous_rank, entry.full_name);
        }
    }

    let changes = trend.rank_changes();
    if !changes.is_empty() {
        let _ = writeln!(out, "\nRank changes ({}):", changes.len());
        for entry in changes {
            let _ = writeln!(
                out,
                "  {} #{} -> #{} ({:+}, stars {})",
                entry.full_name,
                entry.previous_rank.unwrap_or(entry.rank),
                entry.rank,
                entry.delta().unwrap_or(0),
                format_pct(entry.star_change_pct())
            );
        }
    }

    if trend.is_unchanged() {
        out.push_str("\nNo ranking changes since the previous run.\n");
    }

    let _ = writeln!(out, "{}", separator);
    out
}
