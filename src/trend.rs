//! Rank comparison between the current run and a persisted earlier run.

use crate::github::Repository;
use crate::report::Analysis;
use std::collections::{BTreeSet, HashMap};

/// Position of one of today's repositories relative to the earlier run
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub full_name: String,
    pub name: String,
    /// 1-based rank today
    pub rank: usize,
    /// 1-based rank in the earlier run, `None` for new entrants
    pub previous_rank: Option<usize>,
    pub stars: u64,
    pub previous_stars: Option<u64>,
}

impl RankedEntry {
    /// Positive when the repository moved up, `None` for new entrants
    pub fn delta(&self) -> Option<i64> {
        self.previous_rank
            .map(|previous| previous as i64 - self.rank as i64)
    }

    pub fn is_new(&self) -> bool {
        self.previous_rank.is_none()
    }

    /// Star change in percent relative to the earlier run
    pub fn star_change_pct(&self) -> Option<f64> {
        self.previous_stars
            .and_then(|previous| percent_change(previous, self.stars))
    }
}

/// A repository present in the earlier run but gone today
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedEntry {
    pub full_name: String,
    pub name: String,
    pub previous_rank: usize,
    pub stars: u64,
}

/// Before/after pair for an aggregate figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricChange {
    pub previous: u64,
    pub current: u64,
}

impl MetricChange {
    pub fn delta(&self) -> i64 {
        self.current as i64 - self.previous as i64
    }

    /// Percent change, `None` when the previous value is zero
    pub fn pct(&self) -> Option<f64> {
        percent_change(self.previous, self.current)
    }
}

/// Per-language repository count change
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageChange {
    pub language: String,
    pub change: MetricChange,
}

/// Outcome of comparing today's list against an earlier one
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    /// One entry per repository of today, in today's order
    pub entries: Vec<RankedEntry>,
    /// Earlier repositories missing today, in their earlier order
    pub dropped: Vec<DroppedEntry>,
    pub total_stars: MetricChange,
    pub total_forks: MetricChange,
    /// Languages whose count changed, by name
    pub languages: Vec<LanguageChange>,
}

impl TrendReport {
    pub fn new_entrants(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter().filter(|e| e.is_new())
    }

    /// Entries whose rank moved, largest move first
    pub fn rank_changes(&self) -> Vec<&RankedEntry> {
        let mut moved: Vec<&RankedEntry> = self
            .entries
            .iter()
            .filter(|e| matches!(e.delta(), Some(d) if d != 0))
            .collect();
        moved.sort_by_key(|e| std::cmp::Reverse(e.delta().map_or(0, i64::abs)));
        moved
    }

    /// True when the two runs hold the same repositories in the same order
    pub fn is_unchanged(&self) -> bool {
        self.dropped.is_empty() && self.entries.iter().all(|e| e.delta() == Some(0))
    }
}

/// Compare today's ranked list with the earlier one. Ranks are positions in
/// the lists as given.
pub fn compare(previous: &[Repository], current: &[Repository]) -> TrendReport {
    let previous_ranks: HashMap<&str, (usize, &Repository)> = previous
        .iter()
        .enumerate()
        .map(|(i, repo)| (repo.full_name.as_str(), (i + 1, repo)))
        .collect();

    let entries: Vec<RankedEntry> = current
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let before = previous_ranks.get(repo.full_name.as_str());
            RankedEntry {
                full_name: repo.full_name.clone(),
                name: repo.name.clone(),
                rank: i + 1,
                previous_rank: before.map(|(rank, _)| *rank),
                stars: repo.stars,
                previous_stars: before.map(|(_, r)| r.stars),
            }
        })
        .collect();

    let current_names: BTreeSet<&str> = current.iter().map(|r| r.full_name.as_str()).collect();
    let dropped = previous
        .iter()
        .enumerate()
        .filter(|(_, repo)| !current_names.contains(repo.full_name.as_str()))
        .map(|(i, repo)| DroppedEntry {
            full_name: repo.full_name.clone(),
            name: repo.name.clone(),
            previous_rank: i + 1,
            stars: repo.stars,
        })
        .collect();

    let before = Analysis::from_repositories(previous);
    let after = Analysis::from_repositories(current);

    TrendReport {
        entries,
        dropped,
        total_stars: MetricChange {
            previous: before.total_stars,
            current: after.total_stars,
        },
        total_forks: MetricChange {
            previous: before.total_forks,
            current: after.total_forks,
        },
        languages: language_changes(&before, &after),
    }
}

fn language_changes(before: &Analysis, after: &Analysis) -> Vec<LanguageChange> {
    let all: BTreeSet<&str> = before
        .languages
        .iter()
        .chain(after.languages.iter())
        .map(|(language, _)| language.as_str())
        .collect();

    all.into_iter()
        .filter_map(|language| {
            let change = MetricChange {
                previous: before.count_for(language) as u64,
                current: after.count_for(language) as u64,
            };
            (change.previous != change.current).then(|| LanguageChange {
                language: language.to_string(),
                change,
            })
        })
        .collect()
}

fn percent_change(previous: u64, current: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}
