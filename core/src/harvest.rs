use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::error::FetchError;
use crate::forge::{CommitPayload, CommitQuery, Forge};
use crate::model::{CommitRecord, RepositoryDescriptor};
use crate::pagination::{paginate, Pacing};

/// Outcome of harvesting one repository.
#[derive(Debug)]
pub struct Harvest {
    pub repository: String,
    pub commits: Vec<CommitRecord>,
    pub requests: u32,
    pub error: Option<FetchError>,
}

impl Harvest {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches every commit of `repository` matching `query`.
///
/// Never fails as a whole: a failing page stops the harvest and is recorded
/// in [`Harvest::error`] next to the commits fetched before it.
pub fn fetch_commits<F: Forge + ?Sized>(
    forge: &F,
    repository: &RepositoryDescriptor,
    query: &CommitQuery,
    pacing: &Pacing,
) -> Harvest {
    let paged = paginate(pacing, |page, per_page| {
        forge.commit_page(repository.id, query, page, per_page)
    });

    if let Some(first) = paged.items.first() {
        debug!("First commit of {}: {}", repository.path, first.id);
    }

    match &paged.error {
        Some(err) if err.is_inaccessible() => warn!(
            "Project {} (ID: {}) not found or no access: {err}",
            repository.path, repository.id
        ),
        Some(err) => warn!(
            "Error fetching commits for project {} on page {}: {err}",
            repository.path, paged.requests
        ),
        None => {}
    }

    let commits = paged
        .items
        .into_iter()
        .filter_map(|payload| to_record(payload, &repository.path))
        .collect();

    Harvest {
        repository: repository.path.clone(),
        commits,
        requests: paged.requests,
        error: paged.error,
    }
}

fn to_record(payload: CommitPayload, repository: &str) -> Option<CommitRecord> {
    let timestamp = match DateTime::parse_from_rfc3339(&payload.created_at) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(err) => {
            warn!(
                "Skipping commit {} in {repository}: bad timestamp {:?} ({err})",
                payload.id, payload.created_at
            );
            return None;
        }
    };
    let stats = payload.stats.unwrap_or_default();

    Some(CommitRecord {
        timestamp,
        repository: repository.to_string(),
        commit_id: payload.id,
        message: payload.message,
        additions: stats.additions,
        deletions: stats.deletions,
        total_changes: stats.total,
        author_name: payload.author_name,
        author_email: payload.author_email,
    })
}
