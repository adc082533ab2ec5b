mod ai;
mod cli;
mod config;
mod error;
mod github;
mod logger;
mod orchestrator;
mod report;
mod trend;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, MAX_DAYS, MAX_LIMIT};
use error::{Result, TrendingError};
use github::cache::ReadmeCache;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{HistorySelection, Orchestrator, RunRequest};
use std::io::{self, Write};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    logger::init_logger(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        print_hint(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, cli);
    }

    let config = load_config(cli)?;
    let config = apply_cli_overrides(config, cli);
    config.validate()?;

    run_digest(config, cli).await
}

async fn run_digest(config: Config, cli: &Cli) -> Result<()> {
    println!("trending-digest v{}", env!("CARGO_PKG_VERSION"));
    println!("Trending GitHub repositories with AI summaries\n");

    // Prompt for missing values unless told not to
    let (days, limit) = if cli.is_non_interactive() {
        (config.default_days, config.default_limit)
    } else {
        let days = match cli.days {
            Some(d) => d,
            None => prompt_number("Days back", config.default_days, MAX_DAYS)?,
        };
        let limit = match cli.limit {
            Some(n) => n,
            None => prompt_number("Number of projects", config.default_limit, MAX_LIMIT)?,
        };
        (days, limit)
    };

    let history = match cli.compare_days {
        Some(days_ago) => HistorySelection::Closest { days_ago },
        None => HistorySelection::Latest,
    };

    println!("\n{}", "=".repeat(60));
    println!("Window: last {} days", days);
    println!("Projects: {}", limit);
    if config.ai_api_key().is_none() {
        println!("AI summaries: disabled");
    }
    println!("{}\n", "=".repeat(60));

    let orchestrator = Orchestrator::new(config)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));

    let request = RunRequest {
        window_days: days,
        limit,
        history,
        today: Local::now().date_naive(),
    };
    let output = orchestrator.run(&request, &progress).await?;

    println!("{}", output.console);
    println!(
        "{} projects, {} stars in total",
        output.repositories.len(),
        output.analysis.total_stars
    );
    if let (Some(date), Some(trend)) = (output.compared_with, &output.trend) {
        println!(
            "Compared with the run of {}: {} new, {} dropped, {} moved",
            date.format("%Y-%m-%d"),
            trend.new_entrants().count(),
            trend.dropped.len(),
            trend.rank_changes().len()
        );
    }
    println!("✓ Report saved to: {}", output.report_path.display());
    println!("✓ Data saved to: {}", output.dataset_path.display());

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load_or_create_default(),
    }
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Init { force } => {
            let config_path = Config::default_config_path()?;

            if config_path.exists() && !force {
                eprintln!("Config file already exists at: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            Config::create_default()?;
            println!("✓ Created config file at: {}", config_path.display());
            println!("\nTo authenticate, either:");
            println!("  1. Set the GITHUB_TOKEN and DEEPSEEK_API_KEY environment variables");
            println!("  2. Add them to the config file:");
            println!("     github_token = \"ghp_YOUR_TOKEN\"");
            println!("     ai_api_key = \"sk-YOUR_KEY\"");
        }
        Commands::Config => {
            let mut config = load_config(cli)?;
            // Never echo secrets
            config.github_token = config.github_token.map(|_| "********".to_string());
            config.ai_api_key = config.ai_api_key.map(|_| "********".to_string());
            let toml_str = toml::to_string_pretty(&config)?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
        Commands::ClearCache => {
            let cache = ReadmeCache::new(load_config(cli)?.resolved_cache_dir()?);
            if cache.clear()? {
                println!("✓ Cache cleared: {}", cache.dir().display());
            } else {
                println!("Cache directory does not exist");
            }
        }
        Commands::CacheStats => {
            let cache = ReadmeCache::new(load_config(cli)?.resolved_cache_dir()?);
            if !cache.dir().exists() {
                println!("Cache directory does not exist");
            } else {
                let stats = cache.stats()?;
                println!("Cache directory: {}", cache.dir().display());
                println!("Total entries: {}", stats.total_entries);
                println!("Fresh entries: {}", stats.fresh_entries);
                println!("Size on disk: {}", stats.format_size());
            }
        }
    }
    Ok(())
}

/// Prompt user with a default value (press Enter to accept default)
fn prompt_with_default(prompt: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", prompt, default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Prompt for a number in `1..=max`; anything else keeps the default
fn prompt_number(prompt: &str, default: u32, max: u32) -> Result<u32> {
    let input = prompt_with_default(prompt, &default.to_string())?;
    Ok(parse_bounded(&input, default, max))
}

fn parse_bounded(input: &str, default: u32, max: u32) -> u32 {
    input
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=max).contains(n))
        .unwrap_or(default)
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    // Tokens from flags or environment win over the file
    if let Some(ref token) = cli.github_token {
        config.github_token = Some(token.clone());
    }
    if let Some(ref key) = cli.ai_api_key {
        config.ai_api_key = Some(key.clone());
    }
    if cli.no_ai {
        config.ai_api_key = None;
    }

    if let Some(days) = cli.days {
        config.default_days = days;
    }
    if let Some(limit) = cli.limit {
        config.default_limit = limit;
    }

    config
}

fn print_hint(error: &TrendingError) {
    match error {
        TrendingError::Auth(_) => {
            eprintln!("\nPlease either:");
            eprintln!("  1. Set the GITHUB_TOKEN environment variable");
            eprintln!("  2. Pass --github-token");
            eprintln!("  3. Add github_token to your config file");
        }
        TrendingError::RateLimit { .. } => {
            eprintln!("\nGitHub rate limit reached; try again after the reset time.");
        }
        e if !e.is_fatal() => {
            eprintln!("\nRe-run with -v for more detail.");
        }
        _ => {}
    }
}
