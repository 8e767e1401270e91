//! Error types for the stats engine.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Per-repository metric kinds that are fetched on a best-effort basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Languages,
    CommitActivity,
    CommitLog,
    FileTree,
    RawFile,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Languages => "languages",
            Metric::CommitActivity => "commit activity",
            Metric::CommitLog => "commit log",
            Metric::FileTree => "file tree",
            Metric::RawFile => "raw file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StatsError {
    /// A fatal upstream call failed (transport error or non-2xx status)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The overall request deadline expired
    #[error("Upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// The upstream answered with a body that does not match the expected shape
    #[error("Failed to decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single per-repository fetch failed; absorbed by the aggregator
    #[error("{metric} skipped for {repo}: {reason}")]
    MetricFetchSkipped {
        metric: Metric,
        repo: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Client setup failed: {0}")]
    ClientSetup(String),
}

impl StatsError {
    /// Downgrade any error raised while fetching `metric` for `repo` into a skip.
    pub fn skipped(self, metric: Metric, repo: &str) -> Self {
        match self {
            skip @ StatsError::MetricFetchSkipped { .. } => skip,
            other => StatsError::MetricFetchSkipped {
                metric,
                repo: repo.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Whether this error aborts the whole request.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StatsError::MetricFetchSkipped { .. })
    }
}

pub type StatsResult<T> = Result<T, StatsError>;
