use log::debug;

use crate::config::{EngineConfig, LocMode};
use crate::error::{Metric, StatsResult};
use crate::github::{CommitActivityWeek, GithubClient, LanguageHistogram, RepositoryRef};
use crate::loc;
use crate::stats::{CommitRecord, RepoSummary, RunningTotals};

/// Everything fetched for one repository. Failed fetches leave their field empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoMetrics {
    pub languages: LanguageHistogram,
    pub loc: u64,
    pub activity: Vec<CommitActivityWeek>,
    pub commits: Vec<CommitRecord>,
}

/// Folds a user's repositories into [`RunningTotals`], one repository at a time.
pub struct Aggregator<'a> {
    client: &'a GithubClient,
    config: &'a EngineConfig,
    owner: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a GithubClient, config: &'a EngineConfig, owner: &'a str) -> Self {
        Self {
            client,
            config,
            owner,
        }
    }

    /// Sequential left fold over `repos` in listing order.
    pub async fn run(&self, repos: &[RepositoryRef]) -> RunningTotals {
        let mut totals = RunningTotals::default();
        for repo in repos {
            let metrics = self.fetch_repo(repo).await;
            debug!(
                "{}: {} LOC, {} languages, {} activity weeks, {} sampled commits",
                repo.name,
                metrics.loc,
                metrics.languages.len(),
                metrics.activity.len(),
                metrics.commits.len()
            );
            merge_repo(&mut totals, repo, metrics);
        }
        totals
    }

    /// Run the configured fetchers for one repository. Never fails: each
    /// fetch that errors contributes nothing.
    pub async fn fetch_repo(&self, repo: &RepositoryRef) -> RepoMetrics {
        let name = repo.name.as_str();
        let languages = best_effort(Metric::Languages, name, self.client.languages(repo).await);

        let loc = match self.config.loc_mode {
            LocMode::Histogram => loc::estimate_from_histogram(&languages),
            LocMode::Exact => self.exact_loc(repo).await,
        };

        let (activity, commits) = if self.config.include_commit_stats {
            let activity = best_effort(
                Metric::CommitActivity,
                name,
                self.client.commit_activity(self.owner, name).await,
            );
            let commits = best_effort(
                Metric::CommitLog,
                name,
                self.client
                    .recent_commits(self.owner, name, self.config.commit_sample_size)
                    .await,
            );
            (activity, commits)
        } else {
            (Vec::new(), Vec::new())
        };

        RepoMetrics {
            languages,
            loc,
            activity,
            commits,
        }
    }

    /// Newline count over every countable blob of the default branch.
    async fn exact_loc(&self, repo: &RepositoryRef) -> u64 {
        let name = repo.name.as_str();
        let branch = repo.default_branch.as_str();
        let tree = best_effort(
            Metric::FileTree,
            name,
            self.client.tree(self.owner, name, branch).await,
        );

        let mut total = 0u64;
        for leaf in loc::countable_leaves(&tree, &self.config.excluded_path_patterns) {
            match self.client.raw_file(self.owner, name, branch, &leaf.path).await {
                Ok(content) => total = total.saturating_add(loc::count_lines(&content)),
                Err(e) => debug!("{}", e.skipped(Metric::RawFile, name)),
            }
        }
        total
    }
}

fn best_effort<T: Default>(metric: Metric, repo: &str, result: StatsResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!("{}", e.skipped(metric, repo));
            T::default()
        }
    }
}

/// Merge one repository's metrics into the running totals.
pub fn merge_repo(totals: &mut RunningTotals, repo: &RepositoryRef, metrics: RepoMetrics) {
    totals.total_loc = totals.total_loc.saturating_add(metrics.loc);
    totals.total_stars = totals.total_stars.saturating_add(repo.stars);
    totals.languages.merge(&metrics.languages);

    for week in &metrics.activity {
        totals.total_commits = totals.total_commits.saturating_add(week.total);
        totals.add_weekdays(&week.days);
    }
    for record in metrics.commits {
        totals.add_commit(record);
    }

    totals.consider_largest(&repo.name, metrics.loc);
    totals.repos.push(RepoSummary {
        name: repo.name.clone(),
        loc: metrics.loc,
        stars: repo.stars,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn repo(name: &str, stars: u64) -> RepositoryRef {
        RepositoryRef {
            name: name.to_string(),
            default_branch: "main".to_string(),
            stars,
            languages_url: format!("http://localhost/repos/octo/{name}/languages"),
        }
    }

    fn week(total: u64, days: [u64; 7]) -> CommitActivityWeek {
        CommitActivityWeek { total, days }
    }

    #[test]
    fn merges_counts_samples_and_breakdown() {
        let mut totals = RunningTotals::default();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();

        merge_repo(
            &mut totals,
            &repo("alpha", 3),
            RepoMetrics {
                languages: vec![("Rust".into(), 5000)],
                loc: 100,
                activity: vec![week(4, [0, 1, 1, 2, 0, 0, 0]), week(1, [0, 0, 0, 0, 0, 0, 1])],
                commits: vec![CommitRecord::new(ts, "init".into())],
            },
        );
        merge_repo(
            &mut totals,
            &repo("beta", 2),
            RepoMetrics {
                languages: vec![("Rust".into(), 50), ("Python".into(), 900)],
                loc: 40,
                ..RepoMetrics::default()
            },
        );

        assert_eq!(totals.total_loc, 140);
        assert_eq!(totals.total_stars, 5);
        assert_eq!(totals.total_commits, 5);
        assert_eq!(totals.weekday_counts, [0, 1, 1, 2, 0, 0, 1]);
        assert_eq!(totals.languages.get("Rust"), Some(5050));
        assert_eq!(totals.commit_hours, vec![14]);
        assert_eq!(totals.largest_repo.as_ref().unwrap().name, "alpha");
        let names: Vec<&str> = totals.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn empty_metrics_still_count_stars() {
        let mut totals = RunningTotals::default();
        merge_repo(&mut totals, &repo("quiet", 7), RepoMetrics::default());
        assert_eq!(totals.total_stars, 7);
        assert_eq!(totals.total_loc, 0);
        assert_eq!(totals.largest_repo, None);
        assert_eq!(totals.repos.len(), 1);
    }

    #[test]
    fn first_repository_wins_loc_tie() {
        let mut totals = RunningTotals::default();
        for name in ["one", "two"] {
            merge_repo(
                &mut totals,
                &repo(name, 0),
                RepoMetrics {
                    loc: 10,
                    ..RepoMetrics::default()
                },
            );
        }
        assert_eq!(totals.largest_repo.unwrap().name, "one");
    }
}
