use crate::ai::NO_SUMMARY;
use crate::github::Repository;
use crate::report::{format_pct, truncate_chars, Analysis};
use crate::trend::TrendReport;
use chrono::NaiveDate;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Description characters shown in the ranking table
const TABLE_DESCRIPTION_CHARS: usize = 50;

/// Everything the Markdown report is rendered from
pub struct ReportContext<'a> {
    pub date: NaiveDate,
    pub window_days: u32,
    pub repos: &'a [Repository],
    pub analysis: &'a Analysis,
    pub trend: Option<&'a TrendReport>,
    /// Date of the dataset the trend was computed against
    pub compared_with: Option<NaiveDate>,
}

/// Report path for a run: `github_trending_{days}days_{date}.md`
pub fn report_path(reports_dir: &Path, window_days: u32, date: NaiveDate) -> PathBuf {
    reports_dir.join(format!(
        "github_trending_{}days_{}.md",
        window_days,
        date.format("%Y-%m-%d")
    ))
}

/// Render the full Markdown report
pub fn render(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("# 🔥 GitHub Trending Report\n\n");
    let _ = writeln!(
        out,
        "**Date:** {}  **Window:** last {} days  **Projects:** {}\n",
        ctx.date.format("%Y-%m-%d"),
        ctx.window_days,
        ctx.repos.len()
    );

    out.push_str("## 🏆 Ranking\n\n");
    out.push_str("| Rank | Project | Author | ⭐ Stars | 🍴 Forks | Language | Description |\n");
    out.push_str("|------|---------|--------|---------|---------|----------|-------------|\n");
    for (i, repo) in ctx.repos.iter().enumerate() {
        let _ = writeln!(out, "{}", ranking_row(i + 1, repo));
    }
    out.push('\n');

    out.push_str("## 📊 Language Distribution\n\n");
    out.push_str("| Language | Projects |\n");
    out.push_str("| :--- | :--- |\n");
    for (language, count) in &ctx.analysis.languages {
        let _ = writeln!(out, "| {} | {} |", language, count);
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "⭐ Total stars: {}  🍴 Total forks: {}\n",
        ctx.analysis.total_stars, ctx.analysis.total_forks
    );

    if let Some(trend) = ctx.trend {
        render_trend(&mut out, trend, ctx.compared_with);
    }

    out.push_str("> `unknown` marks projects without a detected primary language.\n");
    out
}

fn ranking_row(rank: usize, repo: &Repository) -> String {
    let author = if repo.owner_url.is_empty() {
        escape_cell(&repo.owner)
    } else {
        format!("[{}]({})", escape_link_text(&repo.owner), repo.owner_url)
    };

    let description = repo
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| truncate_chars(&escape_cell(d), TABLE_DESCRIPTION_CHARS))
        .unwrap_or_else(|| "No description".to_string());

    let summary = repo
        .ai_summary
        .as_deref()
        .map(|s| {
            s.lines()
                .map(escape_cell)
                .collect::<Vec<_>>()
                .join("<br>")
        })
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    format!(
        "| {} | [{}]({}) | {} | {} | {} | {} | {}<br>🤖 **AI summary:** {} |",
        rank,
        escape_link_text(&repo.name),
        repo.html_url,
        author,
        repo.stars,
        repo.forks,
        escape_cell(repo.language_label()),
        description,
        summary
    )
}

fn render_trend(out: &mut String, trend: &TrendReport, compared_with: Option<NaiveDate>) {
    out.push_str("## 📈 Trend\n\n");
    if let Some(date) = compared_with {
        let _ = writeln!(out, "Compared with the run of {}.\n", date.format("%Y-%m-%d"));
    }

    let _ = writeln!(
        out,
        "- ⭐ Total stars: {} → {} ({:+}, {})",
        trend.total_stars.previous,
        trend.total_stars.current,
        trend.total_stars.delta(),
        format_pct(trend.total_stars.pct())
    );
    let _ = writeln!(
        out,
        "- 🍴 Total forks: {} → {} ({:+}, {})\n",
        trend.total_forks.previous,
        trend.total_forks.current,
        trend.total_forks.delta(),
        format_pct(trend.total_forks.pct())
    );

    let entrants: Vec<_> = trend.new_entrants().collect();
    let _ = writeln!(out, "### 🆕 New entrants ({})\n", entrants.len());
    for entry in &entrants {
        let _ = writeln!(out, "- #{} {} ⭐{}", entry.rank, entry.full_name, entry.stars);
    }
    out.push('\n');

    let _ = writeln!(out, "### 👋 Dropped ({})\n", trend.dropped.len());
    for entry in &trend.dropped {
        let _ = writeln!(
            out,
            "- {} (was #{}, ⭐{})",
            entry.full_name, entry.previous_rank, entry.stars
        );
    }
    out.push('\n');

    let changes = trend.rank_changes();
    let _ = writeln!(out, "### 📊 Rank changes ({})\n", changes.len());
    for entry in changes {
        let delta = entry.delta().unwrap_or(0);
        let arrow = if delta > 0 { "📈" } else { "📉" };
        let _ = writeln!(
            out,
            "- {} {}: #{} → #{} ({:+}, stars {})",
            arrow,
            entry.full_name,
            entry.previous_rank.unwrap_or(entry.rank),
            entry.rank,
            delta,
            format_pct(entry.star_change_pct())
        );
    }
    out.push('\n');

    if !trend.languages.is_empty() {
        out.push_str("### 💻 Language changes\n\n");
        for language in &trend.languages {
            let _ = writeln!(
                out,
                "- {}: {} → {} ({:+})",
                language.language,
                language.change.previous,
                language.change.current,
                language.change.delta()
            );
        }
        out.push('\n');
    }
}

/// Keep a value from breaking the table layout
fn escape_cell(text: &str) -> String {
    text.replace(['\r', '\n'], " ").replace('|', "\\|")
}

/// Table-safe text that also cannot close a `[text](url)` link early
fn escape_link_text(text: &str) -> String {
    escape_cell(text).replace('[', "\\[").replace(']', "\\]")
}
