use log::{debug, warn};

use crate::error::FetchError;
use crate::forge::{Forge, GroupInfo};
use crate::model::RepositoryDescriptor;
use crate::pagination::{paginate, Pacing};

/// A resolved group and the projects found beneath it.
#[derive(Debug)]
pub struct GroupListing {
    pub group: GroupInfo,
    pub projects: Vec<RepositoryDescriptor>,
}

/// Lists the non-archived projects of a group and its subgroups.
///
/// Only the group lookup is fatal. A failing project page ends the listing
/// and the projects gathered so far are returned.
pub fn list_projects<F: Forge + ?Sized>(
    forge: &F,
    group_id: u64,
    pacing: &Pacing,
) -> Result<GroupListing, FetchError> {
    let group = forge.group(group_id)?;

    let paged = paginate(pacing, |page, per_page| {
        forge.project_page(group_id, page, per_page)
    });

    if let Some(err) = &paged.error {
        warn!(
            "Error fetching projects page {} of group {group_id}: {err}",
            paged.requests
        );
    }
    debug!(
        "listed {} projects of group {group_id} in {} requests",
        paged.items.len(),
        paged.requests
    );

    let projects = paged
        .items
        .into_iter()
        .filter(|p| !p.archived)
        .map(|p| RepositoryDescriptor {
            id: p.id,
            path: p.path_with_namespace,
            archived: p.archived,
        })
        .collect();

    Ok(GroupListing { group, projects })
}
