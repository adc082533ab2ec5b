use crate::ai::chat::ChatClient;
use crate::ai::{Summarizer, SummaryOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::github::cache::ReadmeCache;
use crate::github::client::GitHubClient;
use crate::github::{Repository, Window};
use crate::report::dataset::{Dataset, DatasetStore, HistoricalDataset};
use crate::report::markdown::{self, ReportContext};
use crate::report::{console, Analysis};
use crate::trend::{self, TrendReport};
use chrono::{Days, NaiveDate, Utc};
use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Dataset files further than this from the requested date are not compared against
const COMPARISON_TOLERANCE_DAYS: i64 = 2;

/// Which earlier run the trend is computed against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistorySelection {
    /// Most recent dataset on disk
    Latest,
    /// Dataset closest to `days_ago` days before today
    Closest { days_ago: u32 },
}

/// Parameters of one pipeline run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub window_days: u32,
    pub limit: u32,
    pub history: HistorySelection,
    /// Date used for file names and history lookup
    pub today: NaiveDate,
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunOutput {
    pub repositories: Vec<Repository>,
    pub analysis: Analysis,
    pub trend: Option<TrendReport>,
    pub compared_with: Option<NaiveDate>,
    pub console: String,
    pub report_path: PathBuf,
    pub dataset_path: PathBuf,
}

/// Orchestrator for the fetch, summarize, compare and report pipeline
pub struct Orchestrator {
    config: Config,
    github: GitHubClient,
    cache: ReadmeCache,
    summarizer: Summarizer,
    datasets: DatasetStore,
}

impl Orchestrator {
    /// Create a new orchestrator. Fails without a GitHub token.
    pub fn new(config: Config) -> Result<Self> {
        let github = GitHubClient::new(
            config.github_token()?.to_string(),
            config.github_api_url.clone(),
        )?;

        let summarizer = match config.ai_api_key() {
            Some(key) => Summarizer::new(Some(ChatClient::new(
                key.to_string(),
                &config.ai_api_url,
                config.ai_model.clone(),
            )?)),
            None => {
                info!("No AI API key configured, summaries disabled");
                Summarizer::disabled()
            }
        };

        let cache = ReadmeCache::new(config.resolved_cache_dir()?);
        let datasets = DatasetStore::new(config.data_dir.clone())?;

        Ok(Self {
            config,
            github,
            cache,
            summarizer,
            datasets,
        })
    }

    /// Fetch the ranked trending list
    pub async fn fetch_trending(&self, window: &Window, limit: u32) -> Result<Vec<Repository>> {
        self.github.search_trending(window, limit).await
    }

    /// README from cache, else from GitHub. Failures are logged and yield `None`.
    pub async fn readme_for(&self, repo: &Repository) -> Option<String> {
        if let Some(text) = self.cache.get(&repo.full_name) {
            debug!(repo = %repo.full_name, "README cache hit");
            return Some(text);
        }

        match self.github.fetch_readme(&repo.full_name).await {
            Ok(Some(text)) => {
                if let Err(e) = self.cache.put(&repo.full_name, &text) {
                    warn!(repo = %repo.full_name, error = %e, "Failed to cache README");
                }
                Some(text)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "Failed to fetch README");
                None
            }
        }
    }

    /// Summarize a single repository
    pub async fn summarize_repository(&self, repo: &Repository) -> SummaryOutcome {
        if !self.summarizer.is_enabled() {
            return self.summarizer.summarize(repo, None).await;
        }

        let readme = self.readme_for(repo).await;
        self.summarizer.summarize(repo, readme.as_deref()).await
    }

    /// Attach summaries in fetch order; one failure never affects the others
    pub async fn enrich_all(
        &self,
        repos: Vec<Repository>,
        progress: &ProgressBar,
    ) -> Vec<Repository> {
        progress.set_length(repos.len() as u64);
        let interval = Duration::from_millis(self.config.ai_request_interval_ms);

        let mut enriched = Vec::with_capacity(repos.len());
        for (i, mut repo) in repos.into_iter().enumerate() {
            progress.set_message(format!("Summarizing {}", repo.full_name));

            if self.summarizer.is_enabled() && i > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            let outcome = self.summarize_repository(&repo).await;
            match &outcome {
                SummaryOutcome::Unavailable(reason) => {
                    debug!(repo = %repo.full_name, %reason, "{}", outcome.display_text());
                }
                SummaryOutcome::Generated(_) => debug!(repo = %repo.full_name, "Summary generated"),
            }
            repo.ai_summary = outcome.into_text();
            enriched.push(repo);

            progress.inc(1);
        }

        enriched
    }

    /// Earlier dataset to compare against; unreadable history counts as none
    pub fn load_history(
        &self,
        selection: HistorySelection,
        today: NaiveDate,
    ) -> Option<HistoricalDataset> {
        let result = match selection {
            HistorySelection::Latest => self.datasets.latest(),
            HistorySelection::Closest { days_ago } => {
                let target = today
                    .checked_sub_days(Days::new(days_ago as u64))
                    .unwrap_or(today);
                self.datasets.closest_to(target, COMPARISON_TOLERANCE_DAYS)
            }
        };

        match result {
            Ok(Some(found)) => {
                info!(path = %found.path.display(), date = %found.date, "Comparing against earlier run");
                Some(found)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not load historical dataset, skipping trend comparison");
                None
            }
        }
    }

    /// Run the whole pipeline once
    pub async fn run(&self, request: &RunRequest, progress: &ProgressBar) -> Result<RunOutput> {
        let window = Window::days_back(request.window_days)?;

        progress.set_message("Searching GitHub...");
        let repos = self.fetch_trending(&window, request.limit).await?;
        info!(count = repos.len(), "Fetched trending repositories");

        let repos = self.enrich_all(repos, progress).await;
        progress.finish_and_clear();

        let history = self.load_history(request.history, request.today);
        self.write_outputs(request, repos, history)
    }

    /// Compare, render and persist a finished ranked list
    fn write_outputs(
        &self,
        request: &RunRequest,
        repos: Vec<Repository>,
        history: Option<HistoricalDataset>,
    ) -> Result<RunOutput> {
        let analysis = Analysis::from_repositories(&repos);
        let compared_with = history.as_ref().map(|h| h.date);
        let trend = history
            .as_ref()
            .map(|h| trend::compare(&h.dataset.repositories, &repos));

        let mut console_text = console::render(&repos, &analysis);
        match &trend {
            Some(trend) => {
                console_text.push('\n');
                console_text.push_str(&console::render_trend(trend));
            }
            None => console_text.push_str("\nNo earlier run to compare against.\n"),
        }

        let markdown_text = markdown::render(&ReportContext {
            date: request.today,
            window_days: request.window_days,
            repos: &repos,
            analysis: &analysis,
            trend: trend.as_ref(),
            compared_with,
        });

        fs::create_dir_all(&self.config.reports_dir)?;
        let report_path =
            markdown::report_path(&self.config.reports_dir, request.window_days, request.today);
        fs::write(&report_path, markdown_text)?;

        let dataset = Dataset {
            generated_at: Utc::now(),
            window_days: request.window_days,
            repositories: repos,
        };
        let dataset_path = self.datasets.save(request.today, &dataset)?;

        info!(
            report = %report_path.display(),
            data = %dataset_path.display(),
            "Report written"
        );

        Ok(RunOutput {
            repositories: dataset.repositories,
            analysis,
            trend,
            compared_with,
            console: console_text,
            report_path,
            dataset_path,
        })
    }
}
