use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub(crate) const DEFAULT_API_BASE: &str = "https://api.github.com";
pub(crate) const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 100;
pub(crate) const DEFAULT_COMMIT_SAMPLE_SIZE: u32 = 100;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub(crate) const DEFAULT_EXCLUDED_PATTERNS: [&str; 2] = ["node_modules", "dist"];

/// How repository line counts are estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocMode {
    /// Language byte totals divided by an average line width.
    #[default]
    Histogram,
    /// Newline count over every raw file in the default branch tree.
    Exact,
}

impl FromStr for LocMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "histogram" => Ok(LocMode::Histogram),
            "exact" => Ok(LocMode::Exact),
            other => bail!("unknown LOC mode `{other}` (expected `histogram` or `exact`)"),
        }
    }
}

impl fmt::Display for LocMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocMode::Histogram => f.write_str("histogram"),
            LocMode::Exact => f.write_str("exact"),
        }
    }
}

/// Everything the engine needs for one invocation. Passed explicitly to
/// [`crate::engine::get_user_stats`]; nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub token: Option<String>,
    pub api_base: String,
    pub raw_base: String,
    pub user_agent: String,
    pub loc_mode: LocMode,
    pub include_commit_stats: bool,
    pub excluded_path_patterns: Vec<String>,
    pub commit_sample_size: u32,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            user_agent: concat!("devstats/", env!("CARGO_PKG_VERSION")).to_string(),
            loc_mode: LocMode::default(),
            include_commit_stats: true,
            excluded_path_patterns: DEFAULT_EXCLUDED_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            commit_sample_size: DEFAULT_COMMIT_SAMPLE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Build a config from process environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self {
            token: non_empty("GITHUB_TOKEN").or_else(|| non_empty("ACCESS_TOKEN")),
            ..Self::default()
        };

        if let Some(base) = non_empty("DEVSTATS_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = non_empty("DEVSTATS_RAW_BASE") {
            config.raw_base = base.trim_end_matches('/').to_string();
        }
        if let Some(mode) = non_empty("DEVSTATS_LOC_MODE") {
            config.loc_mode = mode.parse().context("Invalid DEVSTATS_LOC_MODE")?;
        }
        if let Some(secs) = non_empty("DEVSTATS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .context("DEVSTATS_TIMEOUT_SECS must be a whole number of seconds")?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(extra) = non_empty("DEVSTATS_EXCLUDE") {
            config.excluded_path_patterns.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        }

        Ok(config)
    }
}
