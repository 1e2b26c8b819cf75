use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::Deserialize;

use crate::error::FetchError;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub name: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub id: u64,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPayload {
    pub id: u64,
    pub path_with_namespace: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    pub id: String,
    pub created_at: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub stats: Option<CommitStats>,
}

/// Filters applied to every commit page of a run.
#[derive(Debug, Clone)]
pub struct CommitQuery {
    pub since: DateTime<Utc>,
    pub author: Option<String>,
}

impl CommitQuery {
    pub fn new(since: DateTime<Utc>, author: Option<String>) -> Self {
        Self {
            since,
            author: author.filter(|a| !a.trim().is_empty()),
        }
    }

    pub fn since_param(&self) -> String {
        self.since.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Remote repository host. One call is one HTTP request.
pub trait Forge {
    fn current_user(&self) -> Result<CurrentUser, FetchError>;

    fn group(&self, group_id: u64) -> Result<GroupInfo, FetchError>;

    fn project_page(
        &self,
        group_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProjectPayload>, FetchError>;

    fn commit_page(
        &self,
        project_id: u64,
        query: &CommitQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitPayload>, FetchError>;
}

/// GitLab REST v4 client authenticated with a private token.
pub struct GitLabClient {
    agent: ureq::Agent,
    api_base: String,
    token: String,
}

impl GitLabClient {
    pub fn new(gitlab_url: &str, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("devtally/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_base: format!("{}/api/v4", gitlab_url.trim_end_matches('/')),
            token: token.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> ureq::Request {
        let url = format!("{}{path}", self.api_base);
        debug!("GET {url} {params:?}");
        params.iter().fold(
            self.agent.get(&url).set("PRIVATE-TOKEN", &self.token),
            |request, (key, value)| request.query(key, value),
        )
    }
}

fn paging(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("per_page", per_page.to_string())]
}

/// Query string of one page of a group's project listing.
pub fn project_params(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let mut params = paging(page, per_page);
    params.extend([
        ("include_subgroups", "true".to_string()),
        ("archived", "false".to_string()),
        ("simple", "false".to_string()),
    ]);
    params
}

/// Query string of one page of a project's commit listing.
pub fn commit_params(query: &CommitQuery, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let mut params = paging(page, per_page);
    params.extend([
        ("with_stats", "true".to_string()),
        ("all", "true".to_string()),
        ("since", query.since_param()),
    ]);
    if let Some(author) = &query.author {
        params.push(("author", author.clone()));
    }
    params
}

impl Forge for GitLabClient {
    fn current_user(&self) -> Result<CurrentUser, FetchError> {
        Ok(self.get("/user", &[]).call()?.into_json()?)
    }

    fn group(&self, group_id: u64) -> Result<GroupInfo, FetchError> {
        Ok(self
            .get(&format!("/groups/{group_id}"), &[])
            .call()?
            .into_json()?)
    }

    fn project_page(
        &self,
        group_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProjectPayload>, FetchError> {
        let params = project_params(page, per_page);
        let path = format!("/groups/{group_id}/projects");
        Ok(self.get(&path, &params).call()?.into_json()?)
    }

    fn commit_page(
        &self,
        project_id: u64,
        query: &CommitQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitPayload>, FetchError> {
        let params = commit_params(query, page, per_page);
        let path = format!("/projects/{project_id}/repository/commits");
        Ok(self.get(&path, &params).call()?.into_json()?)
    }
}
