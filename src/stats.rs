use std::fmt;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;

/// One sampled commit, reduced to the fields the calculators look at.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub message: String,
}

impl CommitRecord {
    pub fn new(timestamp: DateTime<Utc>, message: String) -> Self {
        Self {
            timestamp,
            date: timestamp.date_naive(),
            message,
        }
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Byte totals per language, keeping first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageTotals(Vec<(String, u64)>);

impl LanguageTotals {
    pub fn merge(&mut self, histogram: &[(String, u64)]) {
        for (lang, bytes) in histogram {
            match self.0.iter_mut().find(|(name, _)| name == lang) {
                Some((_, total)) => *total = total.saturating_add(*bytes),
                None => self.0.push((lang.clone(), *bytes)),
            }
        }
    }

    pub fn get(&self, lang: &str) -> Option<u64> {
        self.0.iter().find(|(name, _)| name == lang).map(|(_, b)| *b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, bytes)| (name.as_str(), *bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestRepo {
    pub name: String,
    pub loc: u64,
}

/// Per-repository line of the breakdown carried in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub loc: u64,
    pub stars: u64,
}

/// Accumulator threaded through the aggregation fold for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTotals {
    pub total_loc: u64,
    pub total_stars: u64,
    pub languages: LanguageTotals,
    pub total_commits: u64,
    /// Index 0 is Sunday.
    pub weekday_counts: [u64; 7],
    pub commit_hours: Vec<u32>,
    pub commit_dates: Vec<NaiveDate>,
    pub commit_messages: Vec<String>,
    pub largest_repo: Option<LargestRepo>,
    pub repos: Vec<RepoSummary>,
}

impl RunningTotals {
    pub fn add_commit(&mut self, record: CommitRecord) {
        self.commit_hours.push(record.hour());
        self.commit_dates.push(record.date);
        self.commit_messages.push(record.message);
    }

    pub fn add_weekdays(&mut self, days: &[u64; 7]) {
        for (slot, count) in self.weekday_counts.iter_mut().zip(days) {
            *slot = slot.saturating_add(*count);
        }
    }

    /// Replace the largest repository only on a strictly larger count.
    pub fn consider_largest(&mut self, name: &str, loc: u64) {
        let current = self.largest_repo.as_ref().map_or(0, |r| r.loc);
        if loc > current {
            self.largest_repo = Some(LargestRepo {
                name: name.to_string(),
                loc,
            });
        }
    }
}

/// Four buckets of the day, by UTC hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPart::Morning,
            12..=16 => DayPart::Afternoon,
            17..=21 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPart::Morning => "Morning developer",
            DayPart::Afternoon => "Afternoon developer",
            DayPart::Evening => "Evening developer",
            DayPart::Night => "Night-time developer",
        }
    }

    pub fn window(self) -> &'static str {
        match self {
            DayPart::Morning => "between 5 AM and 12 PM",
            DayPart::Afternoon => "between 12 PM and 5 PM",
            DayPart::Evening => "between 5 PM and 10 PM",
            DayPart::Night => "between 10 PM and 5 AM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CodingMood {
    Unknown,
    /// `percentage` is the share of samples on the peak hour alone.
    Classified { part: DayPart, percentage: f64 },
}

impl fmt::Display for CodingMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodingMood::Unknown => f.write_str("Unknown"),
            CodingMood::Classified { part, percentage } => write!(
                f,
                "{} — {percentage:.1}% of commits {}",
                part.label(),
                part.window()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub favorite_language: String,
    pub most_active_day: String,
    pub coding_mood: CodingMood,
    pub most_common_commit: String,
    pub commit_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(u64),
    Text(String),
}

impl StatValue {
    /// Sort key: text ranks below every number.
    pub fn rank(&self) -> Option<u64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }
}

impl From<u64> for StatValue {
    fn from(n: u64) -> Self {
        StatValue::Number(n)
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: StatValue,
}

impl StatEntry {
    pub fn new(label: &str, value: impl Into<StatValue>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Final response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub avatar: String,
    pub name: String,
    pub joined: String,
    pub repo_count: usize,
    pub stats: Vec<StatEntry>,
    pub repos: Vec<RepoSummary>,
}
