use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    pub id: u64,
    pub path: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "project")]
    pub repository: String,
    pub commit_id: String,
    pub message: String,
    pub additions: u64,
    pub deletions: u64,
    pub total_changes: u64,
    pub author_name: String,
    pub author_email: String,
}

/// A commit as it appears in the detailed table, with its estimated activity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedRow {
    #[serde(flatten)]
    pub commit: CommitRecord,
    pub activity_minutes: u32,
    pub activity_start: DateTime<Utc>,
    pub activity_end: DateTime<Utc>,
    pub date: NaiveDate,
}

impl DetailedRow {
    pub fn new(commit: CommitRecord, minutes_per_commit: u32) -> Self {
        let activity_end = commit.timestamp;
        Self {
            activity_start: activity_end - Duration::minutes(i64::from(minutes_per_commit)),
            activity_end,
            date: activity_end.date_naive(),
            activity_minutes: minutes_per_commit,
            commit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub commits: u64,
    pub activity_minutes: u64,
    pub additions: u64,
    pub deletions: u64,
    pub total_changes: u64,
    #[serde(rename = "commit_messages")]
    pub messages: Vec<String>,
    #[serde(rename = "commit_summary")]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTable {
    pub repository: String,
    pub days: Vec<DailyBucket>,
}

impl DailyTable {
    pub fn total_commits(&self) -> u64 {
        self.days.iter().map(|d| d.commits).sum()
    }

    pub fn total_minutes(&self) -> u64 {
        self.days.iter().map(|d| d.activity_minutes).sum()
    }

    pub fn total_additions(&self) -> u64 {
        self.days.iter().map(|d| d.additions).sum()
    }

    pub fn total_deletions(&self) -> u64 {
        self.days.iter().map(|d| d.deletions).sum()
    }

    pub fn active_days(&self) -> usize {
        self.days.len()
    }

    pub fn average_commits_per_day(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        self.total_commits() as f64 / self.days.len() as f64
    }

    /// Day with the most commits; the earliest such day wins a tie.
    pub fn most_active_day(&self) -> Option<&DailyBucket> {
        self.days
            .iter()
            .fold(None, |best: Option<&DailyBucket>, day| match best {
                Some(b) if b.commits >= day.commits => Some(b),
                _ => Some(day),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityReport {
    pub detailed: Vec<DetailedRow>,
    pub daily: BTreeMap<String, DailyTable>,
}

impl ActivityReport {
    pub fn is_empty(&self) -> bool {
        self.detailed.is_empty()
    }

    pub fn total_commits(&self) -> u64 {
        self.daily.values().map(DailyTable::total_commits).sum()
    }

    /// Detailed rows belonging to one repository, in table order.
    pub fn detailed_for<'a>(
        &'a self,
        repository: &'a str,
    ) -> impl Iterator<Item = &'a DetailedRow> {
        self.detailed
            .iter()
            .filter(move |row| row.commit.repository == repository)
    }
}
