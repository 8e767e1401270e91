use anyhow::{Context, Result};
use clap::Parser;
use devstats::{EngineConfig, LocMode, get_user_stats};
use std::time::Duration;

/// Summarize a GitHub user's public coding activity as JSON.
#[derive(Debug, Parser)]
#[command(name = "devstats", version)]
struct Cli {
    /// GitHub username to summarize
    username: String,

    /// How lines of code are estimated: `histogram` or `exact`
    #[arg(long)]
    loc_mode: Option<LocMode>,

    /// Skip commit activity, streak, mood and message statistics
    #[arg(long)]
    no_commit_stats: bool,

    /// Extra path substring to exclude from exact LOC counting (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Overall deadline in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

impl Cli {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(mode) = self.loc_mode {
            config.loc_mode = mode;
        }
        if self.no_commit_stats {
            config.include_commit_stats = false;
        }
        config.excluded_path_patterns.extend(self.exclude.iter().cloned());
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = EngineConfig::from_env().context("Invalid configuration")?;
    cli.apply(&mut config);

    let envelope = get_user_stats(&config, &cli.username)
        .await
        .with_context(|| format!("Failed to collect stats for `{}`", cli.username))?;

    let json = if cli.compact {
        serde_json::to_string(&envelope)?
    } else {
        serde_json::to_string_pretty(&envelope)?
    };
    println!("{json}");

    Ok(())
}
