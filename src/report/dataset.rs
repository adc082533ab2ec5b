use crate::error::{Result, TrendingError};
use crate::github::Repository;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_PATTERN: &str = r"^data_(\d{4}-\d{2}-\d{2})\.json$";

/// Persisted ranked list of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub generated_at: DateTime<Utc>,
    pub window_days: u32,
    pub repositories: Vec<Repository>,
}

/// A dataset loaded from disk together with its file date
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub dataset: Dataset,
}

/// Directory of `data_YYYY-MM-DD.json` files, one per run
pub struct DatasetStore {
    dir: PathBuf,
    pattern: Regex,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let pattern = Regex::new(FILE_PATTERN)
            .map_err(|e| TrendingError::config(format!("invalid dataset pattern: {}", e)))?;
        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("data_{}.json", date.format("%Y-%m-%d")))
    }

    /// Write the dataset for `date`, replacing an earlier run of the same day
    pub fn save(&self, date: NaiveDate, dataset: &Dataset) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        fs::write(&path, serde_json::to_string_pretty(dataset)?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Dataset> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Dated dataset files, oldest first; unrelated names are skipped
    pub fn list(&self) -> Result<Vec<(NaiveDate, PathBuf)>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(date) = self
                .pattern
                .captures(name)
                .and_then(|c| c.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
            else {
                continue;
            };
            files.push((date, entry.path()));
        }

        files.sort();
        Ok(files)
    }

    /// Most recent dataset by file date
    pub fn latest(&self) -> Result<Option<HistoricalDataset>> {
        match self.list()?.pop() {
            Some((date, path)) => Self::read_historical(date, path).map(Some),
            None => Ok(None),
        }
    }

    /// Dataset whose date is closest to `target`, only within `tolerance_days`.
    /// On equal distance the later file wins.
    pub fn closest_to(
        &self,
        target: NaiveDate,
        tolerance_days: i64,
    ) -> Result<Option<HistoricalDataset>> {
        let best = self
            .list()?
            .into_iter()
            .map(|(date, path)| ((date - target).num_days().abs(), date, path))
            .filter(|(distance, _, _)| *distance <= tolerance_days)
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

        match best {
            Some((_, date, path)) => Self::read_historical(date, path).map(Some),
            None => Ok(None),
        }
    }

    fn read_historical(date: NaiveDate, path: PathBuf) -> Result<HistoricalDataset> {
        debug!(path = %path.display(), "Loading historical dataset");
        let dataset = Self::load(&path)?;
        Ok(HistoricalDataset {
            date,
            path,
            dataset,
        })
    }
}
