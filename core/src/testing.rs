use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::FetchError;
use crate::forge::{CommitPayload, CommitQuery, CurrentUser, Forge, GroupInfo, ProjectPayload};

/// Scripted page responses, indexed from page 1. Requests past the end get an empty page.
pub type Script<T> = Vec<Result<Vec<T>, FetchError>>;

#[derive(Default)]
pub struct StubForge {
    pub group: Option<GroupInfo>,
    pub projects: RefCell<Script<ProjectPayload>>,
    pub commits: RefCell<HashMap<u64, Script<CommitPayload>>>,
    pub project_requests: Cell<u32>,
    pub commit_requests: RefCell<HashMap<u64, u32>>,
    /// Last query seen per project.
    pub commit_queries: RefCell<HashMap<u64, CommitQuery>>,
}

fn take_page<T>(script: &mut Script<T>, page: u32) -> Result<Vec<T>, FetchError> {
    let index = (page - 1) as usize;
    if index >= script.len() {
        return Ok(vec![]);
    }
    std::mem::replace(&mut script[index], Ok(vec![]))
}

impl Forge for StubForge {
    fn current_user(&self) -> Result<CurrentUser, FetchError> {
        Ok(CurrentUser {
            name: "Stub User".to_string(),
            username: "stub".to_string(),
        })
    }

    fn group(&self, group_id: u64) -> Result<GroupInfo, FetchError> {
        self.group
            .clone()
            .filter(|g| g.id == group_id)
            .ok_or(FetchError::Inaccessible(404))
    }

    fn project_page(&self, _: u64, page: u32, _: u32) -> Result<Vec<ProjectPayload>, FetchError> {
        self.project_requests.set(self.project_requests.get() + 1);
        take_page(&mut self.projects.borrow_mut(), page)
    }

    fn commit_page(
        &self,
        project_id: u64,
        query: &CommitQuery,
        page: u32,
        _: u32,
    ) -> Result<Vec<CommitPayload>, FetchError> {
        self.commit_queries
            .borrow_mut()
            .insert(project_id, query.clone());
        *self
            .commit_requests
            .borrow_mut()
            .entry(project_id)
            .or_insert(0) += 1;
        match self.commits.borrow_mut().get_mut(&project_id) {
            Some(script) => take_page(script, page),
            None => Err(FetchError::Inaccessible(404)),
        }
    }
}

pub fn project(id: u64, path: &str) -> ProjectPayload {
    ProjectPayload {
        id,
        path_with_namespace: path.to_string(),
        archived: false,
    }
}

pub fn commit(id: &str, created_at: &str, message: &str, additions: u64) -> CommitPayload {
    CommitPayload {
        id: id.to_string(),
        created_at: created_at.to_string(),
        message: message.to_string(),
        author_name: "Jane".to_string(),
        author_email: "jane@example.com".to_string(),
        stats: Some(crate::forge::CommitStats {
            additions,
            deletions: 0,
            total: additions,
        }),
    }
}
