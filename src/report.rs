use crate::github::UserProfile;
use crate::stats::{DerivedStats, ResultEnvelope, RunningTotals, StatEntry};

pub const LABEL_TOTAL_LOC: &str = "Total lines of code";
pub const LABEL_TOTAL_COMMITS: &str = "Total commits";
pub const LABEL_STREAK: &str = "Commit streak (days)";
pub const LABEL_STARS: &str = "Total stars";
pub const LABEL_ACTIVE_DAY: &str = "Most active day";
pub const LABEL_LANGUAGE: &str = "Favorite language";
pub const LABEL_LARGEST: &str = "Largest repository";
pub const LABEL_MOOD: &str = "Coding mood";
pub const LABEL_COMMON_COMMIT: &str = "Most common commit";

/// Labeled stats in definition order, before sorting.
pub fn stat_entries(totals: &RunningTotals, derived: &DerivedStats) -> Vec<StatEntry> {
    let largest = totals
        .largest_repo
        .as_ref()
        .map_or_else(|| "None".to_string(), |r| format!("{} ({} LOC)", r.name, r.loc));

    vec![
        StatEntry::new(LABEL_TOTAL_LOC, totals.total_loc),
        StatEntry::new(LABEL_TOTAL_COMMITS, totals.total_commits),
        StatEntry::new(LABEL_STREAK, u64::from(derived.commit_streak)),
        StatEntry::new(LABEL_STARS, totals.total_stars),
        StatEntry::new(LABEL_ACTIVE_DAY, derived.most_active_day.as_str()),
        StatEntry::new(LABEL_LANGUAGE, derived.favorite_language.as_str()),
        StatEntry::new(LABEL_LARGEST, largest),
        StatEntry::new(LABEL_MOOD, derived.coding_mood.to_string()),
        StatEntry::new(LABEL_COMMON_COMMIT, derived.most_common_commit.as_str()),
    ]
}

/// Numbers first, largest first; text after every number. Stable, so equal
/// ranks keep their original order.
pub fn sort_stats(stats: &mut [StatEntry]) {
    stats.sort_by(|a, b| b.value.rank().cmp(&a.value.rank()));
}

pub fn assemble(
    profile: &UserProfile,
    repo_count: usize,
    totals: RunningTotals,
    derived: &DerivedStats,
) -> ResultEnvelope {
    let mut stats = stat_entries(&totals, derived);
    sort_stats(&mut stats);

    ResultEnvelope {
        avatar: profile.avatar_url.clone(),
        name: profile
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| profile.login.clone()),
        joined: profile.created_at.date_naive().to_string(),
        repo_count,
        stats,
        repos: totals.repos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{CodingMood, DayPart, LargestRepo, StatValue};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn entry(label: &str, value: StatValue) -> StatEntry {
        StatEntry {
            label: label.to_string(),
            value,
        }
    }

    fn derived() -> DerivedStats {
        DerivedStats {
            favorite_language: "Rust".into(),
            most_active_day: "Tuesday".into(),
            coding_mood: CodingMood::Classified {
                part: DayPart::Evening,
                percentage: 20.0,
            },
            most_common_commit: "fix".into(),
            commit_streak: 4,
        }
    }

    #[test]
    fn numerics_sort_descending_before_text() {
        let mut stats = vec![
            entry("a", StatValue::Number(5)),
            entry("b", StatValue::Text("Monday".into())),
            entry("c", StatValue::Number(10)),
            entry("d", StatValue::Text("X".into())),
        ];
        sort_stats(&mut stats);
        let labels: Vec<&str> = stats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn equal_numbers_keep_definition_order() {
        let mut stats = vec![
            entry("zero-a", StatValue::Number(0)),
            entry("text", StatValue::Text("t".into())),
            entry("zero-b", StatValue::Number(0)),
        ];
        sort_stats(&mut stats);
        let labels: Vec<&str> = stats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["zero-a", "zero-b", "text"]);
    }

    #[test]
    fn largest_repository_formatting() {
        let mut totals = RunningTotals::default();
        let entries = stat_entries(&totals, &derived());
        assert_eq!(entries[6], StatEntry::new(LABEL_LARGEST, "None"));

        totals.largest_repo = Some(LargestRepo {
            name: "engine".into(),
            loc: 1234,
        });
        let entries = stat_entries(&totals, &derived());
        assert_eq!(entries[6], StatEntry::new(LABEL_LARGEST, "engine (1234 LOC)"));
    }

    #[test]
    fn assemble_wraps_profile_fields() {
        let profile = UserProfile {
            login: "octo".into(),
            avatar_url: "https://avatars.example/u/1".into(),
            name: None,
            created_at: Utc.with_ymd_and_hms(2011, 1, 25, 18, 44, 36).unwrap(),
        };
        let totals = RunningTotals {
            total_loc: 300,
            total_stars: 12,
            total_commits: 40,
            ..RunningTotals::default()
        };
        let envelope = assemble(&profile, 2, totals, &derived());

        assert_eq!(envelope.name, "octo");
        assert_eq!(envelope.joined, "2011-01-25");
        assert_eq!(envelope.repo_count, 2);
        let labels: Vec<&str> = envelope.stats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                LABEL_TOTAL_LOC,
                LABEL_TOTAL_COMMITS,
                LABEL_STARS,
                LABEL_STREAK,
                LABEL_ACTIVE_DAY,
                LABEL_LANGUAGE,
                LABEL_LARGEST,
                LABEL_MOOD,
                LABEL_COMMON_COMMIT,
            ]
        );
    }
}
