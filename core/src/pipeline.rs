use log::{info, warn};

use crate::aggregate::aggregate;
use crate::error::FetchError;
use crate::forge::{CommitQuery, Forge, GroupInfo};
use crate::harvest::{fetch_commits, Harvest};
use crate::lister::list_projects;
use crate::model::{ActivityReport, CommitRecord, RepositoryDescriptor};
use crate::pagination::Pacing;
use crate::summarize::Summarizer;

/// Commits merged from every harvested repository.
#[derive(Debug, Default)]
pub struct HarvestSummary {
    pub commits: Vec<CommitRecord>,
    pub attempted: usize,
    /// Repositories that contributed at least one commit.
    pub successful: usize,
    pub failures: Vec<(String, FetchError)>,
}

/// Harvests each repository in turn. A failing repository never stops the loop.
pub fn harvest_all<F: Forge + ?Sized>(
    forge: &F,
    projects: &[RepositoryDescriptor],
    query: &CommitQuery,
    pacing: &Pacing,
    on_harvest: &mut dyn FnMut(&RepositoryDescriptor, &Harvest),
) -> HarvestSummary {
    let mut summary = HarvestSummary {
        attempted: projects.len(),
        ..HarvestSummary::default()
    };

    for project in projects {
        let harvest = fetch_commits(forge, project, query, pacing);
        on_harvest(project, &harvest);

        if !harvest.commits.is_empty() {
            info!("Found {} commits in {}", harvest.commits.len(), project.path);
            summary.successful += 1;
        }

        let Harvest {
            repository,
            commits,
            error,
            ..
        } = harvest;
        summary.commits.extend(commits);
        if let Some(err) = error {
            summary.failures.push((repository, err));
        }
    }

    info!(
        "Successfully accessed {} out of {} projects",
        summary.successful, summary.attempted
    );
    summary
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub group_id: u64,
    pub query: CommitQuery,
    pub minutes_per_commit: u32,
    pub pacing: Pacing,
}

#[derive(Debug)]
pub enum RunOutcome {
    NoProjects {
        group: GroupInfo,
    },
    NoCommits {
        group: GroupInfo,
        harvest: HarvestSummary,
    },
    Report {
        group: GroupInfo,
        harvest: HarvestStats,
        report: ActivityReport,
    },
}

/// Progress notifications raised while a run is underway.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The group listing finished with this many active repositories.
    Listed { projects: usize },
    /// One repository has been harvested, successfully or not.
    Harvested {
        project: &'a RepositoryDescriptor,
        harvest: &'a Harvest,
    },
}

/// Harvest bookkeeping kept once the commits have moved into the report.
#[derive(Debug)]
pub struct HarvestStats {
    pub attempted: usize,
    pub successful: usize,
    pub failures: Vec<(String, FetchError)>,
}

/// Lists, harvests and aggregates. Only the group lookup can fail the run.
pub fn run<F: Forge + ?Sized>(
    forge: &F,
    options: &RunOptions,
    summarizer: Option<&dyn Summarizer>,
    on_event: &mut dyn FnMut(RunEvent<'_>),
) -> Result<RunOutcome, FetchError> {
    let listing = list_projects(forge, options.group_id, &options.pacing)?;
    info!(
        "Found {} projects in group {}",
        listing.projects.len(),
        listing.group.full_name
    );
    on_event(RunEvent::Listed {
        projects: listing.projects.len(),
    });

    if listing.projects.is_empty() {
        warn!("No projects found. Please check group ID and permissions.");
        return Ok(RunOutcome::NoProjects {
            group: listing.group,
        });
    }

    let harvest = harvest_all(
        forge,
        &listing.projects,
        &options.query,
        &options.pacing,
        &mut |project, harvest| on_event(RunEvent::Harvested { project, harvest }),
    );

    if harvest.commits.is_empty() {
        return Ok(RunOutcome::NoCommits {
            group: listing.group,
            harvest,
        });
    }

    let HarvestSummary {
        commits,
        attempted,
        successful,
        failures,
    } = harvest;
    let report = aggregate(commits, options.minutes_per_commit, summarizer);

    Ok(RunOutcome::Report {
        group: listing.group,
        harvest: HarvestStats {
            attempted,
            successful,
            failures,
        },
        report,
    })
}
