use crate::config::{MAX_DAYS, MAX_LIMIT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trending-digest")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Daily digest of trending GitHub repositories with AI summaries",
    long_about = "trending-digest finds the most starred GitHub repositories created in a \
                  recent window, optionally summarizes each one with an AI model, and writes \
                  a Markdown report that compares the ranking against earlier runs."
)]
pub struct Cli {
    /// Number of days to look back
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Number of repositories to report
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<u32>,

    /// Path to config file (default: ~/.config/trending-digest/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compare with the run closest to this many days ago instead of the latest run
    #[arg(long, value_name = "DAYS")]
    pub compare_days: Option<u32>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Chat completion API key; summaries are skipped without one
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,

    /// Skip AI summaries even if a key is configured
    #[arg(long)]
    pub no_ai: bool,

    /// Never prompt; use flags or configured defaults
    #[arg(long)]
    pub non_interactive: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,

    /// Clear the README cache
    ClearCache,

    /// Show README cache statistics
    CacheStats,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if let Some(days) = self.days {
            if days == 0 || days > MAX_DAYS {
                return Err(format!("--days must be between 1 and {}", MAX_DAYS));
            }
        }

        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_LIMIT {
                return Err(format!("--limit must be between 1 and {}", MAX_LIMIT));
            }
        }

        Ok(())
    }

    /// Whether the days/limit prompts should be skipped
    pub fn is_non_interactive(&self) -> bool {
        self.non_interactive || (self.days.is_some() && self.limit.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_basic() {
        let cli = Cli::parse_from(vec!["trending-digest"]);
        assert!(cli.days.is_none());
        assert!(cli.limit.is_none());
        assert!(cli.command.is_none());
        assert!(!cli.is_non_interactive());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::parse_from(vec![
            "trending-digest",
            "--days",
            "14",
            "-n",
            "25",
            "--compare-days",
            "7",
            "--no-ai",
            "-vv",
        ]);
        assert_eq!(cli.days, Some(14));
        assert_eq!(cli.limit, Some(25));
        assert_eq!(cli.compare_days, Some(7));
        assert!(cli.no_ai);
        assert_eq!(cli.verbose, 2);
        assert!(cli.is_non_interactive());
    }

    #[test]
    fn test_cli_init_command() {
        let cli = Cli::parse_from(vec!["trending-digest", "init", "--force"]);
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }

    #[test]
    fn test_cli_cache_commands() {
        let cli = Cli::parse_from(vec!["trending-digest", "clear-cache"]);
        assert!(matches!(cli.command, Some(Commands::ClearCache)));

        let cli = Cli::parse_from(vec!["trending-digest", "cache-stats"]);
        assert!(matches!(cli.command, Some(Commands::CacheStats)));
    }

    #[test]
    fn test_cli_validation_zero_days() {
        let cli = Cli::parse_from(vec!["trending-digest", "--days", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_days_upper_bound() {
        let cli = Cli::parse_from(vec!["trending-digest", "--days", "100000000"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(vec!["trending-digest", "--days", "3650"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_limit_range() {
        let cli = Cli::parse_from(vec!["trending-digest", "--limit", "101"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(vec!["trending-digest", "--limit", "100"]);
        assert!(cli.validate().is_ok());
    }
}
