//! Derived statistics over the aggregated samples. Everything here is pure.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::stats::{CodingMood, DayPart, DerivedStats, LanguageTotals, RunningTotals};

pub const UNKNOWN: &str = "Unknown";
pub const NO_COMMITS: &str = "No commits";

/// Indexed the same way as the upstream commit-activity `days` array.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn derive(totals: &RunningTotals) -> DerivedStats {
    DerivedStats {
        favorite_language: favorite_language(&totals.languages),
        most_active_day: most_active_day(&totals.weekday_counts).to_string(),
        coding_mood: coding_mood(&totals.commit_hours),
        most_common_commit: most_common_commit(&totals.commit_messages),
        commit_streak: commit_streak(&totals.commit_dates),
    }
}

/// Language with the most bytes; the first seen wins a tie.
pub fn favorite_language(languages: &LanguageTotals) -> String {
    let mut best: Option<(&str, u64)> = None;
    for (lang, bytes) in languages.iter() {
        if best.is_none_or(|(_, top)| bytes > top) {
            best = Some((lang, bytes));
        }
    }
    best.map_or_else(|| UNKNOWN.to_string(), |(lang, _)| lang.to_string())
}

/// Weekday with the highest count; the lowest index wins a tie. With no
/// recorded activity at all there is no answer.
pub fn most_active_day(weekday_counts: &[u64; 7]) -> &'static str {
    if weekday_counts.iter().all(|count| *count == 0) {
        return UNKNOWN;
    }
    let mut best = 0;
    for (idx, count) in weekday_counts.iter().enumerate() {
        if *count > weekday_counts[best] {
            best = idx;
        }
    }
    WEEKDAYS[best]
}

/// Classify the single most frequent commit hour into a part of the day.
pub fn coding_mood(hours: &[u32]) -> CodingMood {
    let mut counts = [0u64; 24];
    let mut total = 0u64;
    for hour in hours.iter().filter(|h| **h < 24) {
        counts[*hour as usize] += 1;
        total += 1;
    }
    if total == 0 {
        return CodingMood::Unknown;
    }

    let mut peak = 0;
    for (hour, count) in counts.iter().enumerate() {
        if *count > counts[peak] {
            peak = hour;
        }
    }

    let share = counts[peak] as f64 * 100.0 / total as f64;
    CodingMood::Classified {
        part: DayPart::from_hour(peak as u32),
        percentage: (share * 10.0).round() / 10.0,
    }
}

/// Most frequent trimmed message; the first seen wins a tie.
pub fn most_common_commit(messages: &[String]) -> String {
    // message -> (count, first index)
    let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, message) in messages.iter().enumerate() {
        freq.entry(message.trim()).or_insert((0, idx)).0 += 1;
    }

    freq.into_iter()
        .max_by(|(_, (a_count, a_first)), (_, (b_count, b_first))| {
            a_count.cmp(b_count).then(b_first.cmp(a_first))
        })
        .map_or_else(|| NO_COMMITS.to_string(), |(message, _)| message.to_string())
}

/// Longest run of consecutive calendar days that each have a commit.
pub fn commit_streak(dates: &[NaiveDate]) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut longest = 0u32;
    let mut current = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for date in unique {
        current = match previous {
            Some(prev) if (date - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dates(raw: &[&str]) -> Vec<NaiveDate> {
        raw.iter()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
            .collect()
    }

    fn messages(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn favorite_language_is_max_bytes() {
        let mut langs = LanguageTotals::default();
        assert_eq!(favorite_language(&langs), "Unknown");
        langs.merge(&[("Shell".into(), 10), ("Rust".into(), 500), ("Go".into(), 500)]);
        assert_eq!(favorite_language(&langs), "Rust");
    }

    #[test]
    fn most_active_day_prefers_lowest_index_on_tie() {
        assert_eq!(most_active_day(&[0, 3, 1, 3, 0, 0, 0]), "Monday");
        assert_eq!(most_active_day(&[1, 0, 0, 0, 0, 0, 9]), "Saturday");
        assert_eq!(most_active_day(&[2, 0, 0, 0, 0, 0, 2]), "Sunday");
    }

    #[test]
    fn most_active_day_unknown_without_activity() {
        assert_eq!(most_active_day(&[0; 7]), "Unknown");
    }

    #[test]
    fn mood_unknown_without_samples() {
        assert_eq!(coding_mood(&[]), CodingMood::Unknown);
        assert_eq!(coding_mood(&[]).to_string(), "Unknown");
    }

    #[test]
    fn mood_reports_peak_hour_share() {
        let mood = coding_mood(&[9, 9, 9, 14]);
        assert_eq!(
            mood.to_string(),
            "Morning developer — 75.0% of commits between 5 AM and 12 PM"
        );
    }

    #[test]
    fn mood_share_counts_peak_hour_not_bucket() {
        // 10 and 11 are both morning, but only hour 10 is the peak.
        let mood = coding_mood(&[10, 10, 11, 23]);
        assert_eq!(
            mood,
            CodingMood::Classified {
                part: DayPart::Morning,
                percentage: 50.0
            }
        );
    }

    #[test]
    fn mood_tie_goes_to_lowest_hour() {
        let mood = coding_mood(&[23, 2, 18, 18, 2]);
        assert_eq!(
            mood.to_string(),
            "Night-time developer — 40.0% of commits between 10 PM and 5 AM"
        );
    }

    #[test]
    fn mood_percentage_rounds_to_one_decimal() {
        let mood = coding_mood(&[13, 20, 20]);
        assert_eq!(
            mood,
            CodingMood::Classified {
                part: DayPart::Evening,
                percentage: 66.7
            }
        );
    }

    #[test]
    fn most_common_commit_mode() {
        assert_eq!(
            most_common_commit(&messages(&["fix bug", "fix bug", "add feature"])),
            "fix bug"
        );
        assert_eq!(most_common_commit(&[]), "No commits");
    }

    #[test]
    fn most_common_commit_trims_and_prefers_first_seen() {
        assert_eq!(
            most_common_commit(&messages(&["wip", "  docs \n", "docs", "wip"])),
            "wip"
        );
        assert_eq!(most_common_commit(&messages(&["a", "b"])), "a");
    }

    #[test]
    fn streak_of_consecutive_days() {
        assert_eq!(
            commit_streak(&dates(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-05"])),
            3
        );
    }

    #[test]
    fn streak_bounds() {
        assert_eq!(commit_streak(&[]), 0);
        assert_eq!(commit_streak(&dates(&["2024-06-01"])), 1);
        assert_eq!(commit_streak(&dates(&["2024-06-01", "2024-06-01"])), 1);
    }

    #[test]
    fn streak_ignores_sample_order_and_crosses_month_boundaries() {
        assert_eq!(
            commit_streak(&dates(&[
                "2024-03-01",
                "2024-02-28",
                "2023-12-31",
                "2024-02-29",
                "2024-01-01",
                "2024-02-29",
            ])),
            3
        );
    }

    #[test]
    fn derive_empty_totals() {
        let derived = derive(&RunningTotals::default());
        assert_eq!(derived.favorite_language, "Unknown");
        assert_eq!(derived.most_active_day, "Unknown");
        assert_eq!(derived.coding_mood, CodingMood::Unknown);
        assert_eq!(derived.most_common_commit, "No commits");
        assert_eq!(derived.commit_streak, 0);
    }
}
