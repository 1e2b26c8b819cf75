use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;

use crate::model::{ActivityReport, CommitRecord, DailyBucket, DailyTable, DetailedRow};
use crate::summarize::{Summarizer, UNAVAILABLE};

pub const DEFAULT_MINUTES_PER_COMMIT: u32 = 15;

#[derive(Default)]
struct DayAccum {
    commits: u64,
    additions: u64,
    deletions: u64,
    total_changes: u64,
    messages: Vec<String>,
}

/// Rolls harvested commits up into per-repository daily buckets.
///
/// Commits are ordered by timestamp with ties kept in input order, then
/// grouped by repository path and UTC date. The summarizer, when present, is
/// called once per bucket.
pub fn aggregate(
    mut commits: Vec<CommitRecord>,
    minutes_per_commit: u32,
    summarizer: Option<&dyn Summarizer>,
) -> ActivityReport {
    if commits.is_empty() {
        return ActivityReport::default();
    }

    commits.sort_by_key(|c| c.timestamp);

    let mut grouped: BTreeMap<&str, BTreeMap<NaiveDate, DayAccum>> = BTreeMap::new();
    for commit in &commits {
        let day = grouped
            .entry(commit.repository.as_str())
            .or_default()
            .entry(commit.timestamp.date_naive())
            .or_default();
        day.commits += 1;
        day.additions += commit.additions;
        day.deletions += commit.deletions;
        day.total_changes += commit.total_changes;
        day.messages.push(commit.message.clone());
    }

    let daily: BTreeMap<String, DailyTable> = grouped
        .into_iter()
        .map(|(repository, days)| {
            let days = days
                .into_iter()
                .map(|(date, acc)| {
                    let summary = match summarizer {
                        Some(s) => s.summarize(&acc.messages),
                        None => UNAVAILABLE.to_string(),
                    };
                    DailyBucket {
                        date,
                        commits: acc.commits,
                        activity_minutes: acc.commits * u64::from(minutes_per_commit),
                        additions: acc.additions,
                        deletions: acc.deletions,
                        total_changes: acc.total_changes,
                        messages: acc.messages,
                        summary,
                    }
                })
                .collect::<Vec<_>>();
            debug!("{repository}: {} active days", days.len());
            (
                repository.to_string(),
                DailyTable {
                    repository: repository.to_string(),
                    days,
                },
            )
        })
        .collect();

    let detailed = commits
        .into_iter()
        .map(|commit| DetailedRow::new(commit, minutes_per_commit))
        .collect();

    ActivityReport { detailed, daily }
}
