//! GitLab REST v4 helpers.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ServiceClient, path_segment};
use crate::error::ClientError;
use crate::types::{JsonValue, Outcome, RequestDescriptor};

/// Page selection forwarded as `page` / `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Page {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    fn apply(&self, request: RequestDescriptor) -> RequestDescriptor {
        request
            .with_query("page", self.page)
            .with_query("per_page", self.per_page)
    }
}

/// One row of a commit listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    #[serde(rename = "id")]
    pub sha: String,
    #[serde(rename = "short_id")]
    pub short_sha: String,
    #[serde(rename = "author_name")]
    pub author: String,
    pub message: String,
    #[serde(rename = "created_at")]
    pub date: String,
}

impl CommitSummary {
    /// Extract summaries from a commit listing payload.
    ///
    /// A payload that is not an array of commits is a `ParseError`.
    pub fn from_listing(payload: &JsonValue) -> Result<Vec<Self>, ClientError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| ClientError::ParseError(format!("Unexpected commit listing: {e}")))
    }
}

/// Everything the dashboard page shows after login.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub user: JsonValue,
    pub projects: Outcome,
    pub groups: Outcome,
}

/// A project with its top-level file listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetail {
    pub project: JsonValue,
    pub files: Outcome,
}

/// GitLab client. Ids may be numeric or `namespace/path`; both are encoded as
/// one path segment.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    service: ServiceClient,
}

impl GitLabClient {
    pub fn new(service: ServiceClient) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ServiceClient {
        &self.service
    }

    pub fn current_user_request() -> RequestDescriptor {
        RequestDescriptor::get("/user")
    }

    pub async fn current_user(&self) -> Outcome {
        self.service.execute(&Self::current_user_request()).await
    }

    /// Check the token by fetching the current user. Any failure means the
    /// token is not usable.
    pub async fn verify_token(&self) -> Result<JsonValue, ClientError> {
        self.service
            .try_execute(&Self::current_user_request())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "GitLab token verification failed"))
    }

    pub fn projects_request(page: Page, membership: bool) -> RequestDescriptor {
        page.apply(RequestDescriptor::get("/projects"))
            .with_query("membership", membership)
    }

    pub async fn projects(&self, page: Page, membership: bool) -> Outcome {
        self.service
            .execute(&Self::projects_request(page, membership))
            .await
    }

    pub fn project_request(project_id: impl ToString) -> RequestDescriptor {
        RequestDescriptor::get(format!("/projects/{}", path_segment(project_id)))
    }

    pub async fn project(&self, project_id: impl ToString) -> Outcome {
        self.service
            .execute(&Self::project_request(project_id))
            .await
    }

    pub fn repository_tree_request(
        project_id: impl ToString,
        path: &str,
        git_ref: &str,
    ) -> RequestDescriptor {
        RequestDescriptor::get(format!(
            "/projects/{}/repository/tree",
            path_segment(project_id)
        ))
        .with_query("path", path)
        .with_query("ref", git_ref)
    }

    /// Files and directories under `path` at `git_ref`.
    pub async fn repository_tree(
        &self,
        project_id: impl ToString,
        path: &str,
        git_ref: &str,
    ) -> Outcome {
        self.service
            .execute(&Self::repository_tree_request(project_id, path, git_ref))
            .await
    }

    pub fn groups_request(page: Page) -> RequestDescriptor {
        page.apply(RequestDescriptor::get("/groups"))
    }

    pub async fn groups(&self, page: Page) -> Outcome {
        self.service.execute(&Self::groups_request(page)).await
    }

    pub fn group_projects_request(group_id: impl ToString, page: Page) -> RequestDescriptor {
        page.apply(RequestDescriptor::get(format!(
            "/groups/{}/projects",
            path_segment(group_id)
        )))
    }

    pub async fn group_projects(&self, group_id: impl ToString, page: Page) -> Outcome {
        self.service
            .execute(&Self::group_projects_request(group_id, page))
            .await
    }

    pub fn issues_request(project_id: impl ToString) -> RequestDescriptor {
        RequestDescriptor::get(format!("/projects/{}/issues", path_segment(project_id)))
    }

    pub async fn issues(&self, project_id: impl ToString) -> Outcome {
        self.service.execute(&Self::issues_request(project_id)).await
    }

    pub fn create_issue_request(
        project_id: impl ToString,
        title: &str,
        description: &str,
    ) -> RequestDescriptor {
        RequestDescriptor::post(
            format!("/projects/{}/issues", path_segment(project_id)),
            json!({ "title": title, "description": description }),
        )
    }

    pub async fn create_issue(
        &self,
        project_id: impl ToString,
        title: &str,
        description: &str,
    ) -> Outcome {
        self.service
            .execute(&Self::create_issue_request(project_id, title, description))
            .await
    }

    pub fn merge_requests_request(project_id: impl ToString) -> RequestDescriptor {
        RequestDescriptor::get(format!(
            "/projects/{}/merge_requests",
            path_segment(project_id)
        ))
    }

    pub async fn merge_requests(&self, project_id: impl ToString) -> Outcome {
        self.service
            .execute(&Self::merge_requests_request(project_id))
            .await
    }

    pub fn commits_request(project_id: impl ToString) -> RequestDescriptor {
        RequestDescriptor::get(format!(
            "/projects/{}/repository/commits",
            path_segment(project_id)
        ))
    }

    pub async fn commits(&self, project_id: impl ToString) -> Outcome {
        self.service.execute(&Self::commits_request(project_id)).await
    }

    /// Recent commits reduced to display rows.
    pub async fn commit_summaries(
        &self,
        project_id: impl ToString,
    ) -> Result<Vec<CommitSummary>, ClientError> {
        let payload = self
            .service
            .try_execute(&Self::commits_request(project_id))
            .await?;
        CommitSummary::from_listing(&payload)
    }

    pub fn commit_request(project_id: impl ToString, sha: &str) -> RequestDescriptor {
        RequestDescriptor::get(format!(
            "/projects/{}/repository/commits/{}",
            path_segment(project_id),
            path_segment(sha)
        ))
    }

    pub async fn commit(&self, project_id: impl ToString, sha: &str) -> Outcome {
        self.service
            .execute(&Self::commit_request(project_id, sha))
            .await
    }

    /// User, first page of member projects and first page of groups, fetched
    /// one after another. Fails only when the user lookup fails.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot, ClientError> {
        let user = self.verify_token().await?;
        let projects = self.projects(Page::default(), true).await;
        let groups = self.groups(Page::default()).await;
        Ok(DashboardSnapshot {
            user,
            projects,
            groups,
        })
    }

    /// Project metadata plus the root listing of its default `main` branch.
    /// Fails when the project itself cannot be fetched.
    pub async fn project_detail(
        &self,
        project_id: impl ToString,
    ) -> Result<ProjectDetail, ClientError> {
        let id = project_id.to_string();
        let project = self.service.try_execute(&Self::project_request(&id)).await?;
        let files = self.repository_tree(&id, "", "main").await;
        Ok(ProjectDetail { project, files })
    }
}
