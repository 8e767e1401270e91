use log::info;
use tokio::time::timeout;

use crate::aggregate::Aggregator;
use crate::analysis;
use crate::config::EngineConfig;
use crate::error::{StatsError, StatsResult};
use crate::github::GithubClient;
use crate::report;
use crate::stats::ResultEnvelope;

/// Summarize the public activity of `username`.
///
/// Fails with [`StatsError::UpstreamUnavailable`] when the profile or any
/// page of the repository listing cannot be fetched, and with
/// [`StatsError::UpstreamTimeout`] when `config.request_timeout` elapses.
/// Individual per-repository fetch failures only zero out their own metric.
pub async fn get_user_stats(config: &EngineConfig, username: &str) -> StatsResult<ResultEnvelope> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StatsError::InvalidInput("username is required".to_string()));
    }

    let client = GithubClient::new(config)?;
    timeout(config.request_timeout, collect(&client, config, username))
        .await
        .map_err(|_| StatsError::UpstreamTimeout(config.request_timeout))?
}

async fn collect(client: &GithubClient, config: &EngineConfig, username: &str) -> StatsResult<ResultEnvelope> {
    info!("Collecting stats for {username} ({} LOC mode)", config.loc_mode);

    let profile = client.user_profile(username).await?;
    let repos = client.list_repos(username).await?;
    info!("{username}: {} repositories to process", repos.len());

    let totals = Aggregator::new(client, config, username).run(&repos).await;
    let derived = analysis::derive(&totals);
    let envelope = report::assemble(&profile, repos.len(), totals, &derived);

    info!("{username}: done");
    Ok(envelope)
}
