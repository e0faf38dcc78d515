//! GitHub REST and GraphQL client

use std::sync::Arc;

use dulynoted_core::ProviderAdapter;
use dulynoted_domain::constants::GITHUB_ACCEPT;
use dulynoted_domain::{
    Assignee, CacheKey, DraftIssue, DulyNotedError, Issue, Label, Milestone, NewIssue, Project,
    Provider, Repository, ResourceKind, Result,
};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use urlencoding::encode;

use super::read_through;
use crate::http::HttpClient;

const PROJECTS_QUERY: &str = "query {
  viewer {
    projectsV2(first: 100, orderBy: {field: UPDATED_AT, direction: DESC}) {
      nodes { id title url shortDescription public }
    }
  }
}";

const ADD_DRAFT_ISSUE_MUTATION: &str = "mutation($projectId: ID!, $title: String!, $body: String) {
  addProjectV2DraftIssue(input: {projectId: $projectId, title: $title, body: $body}) {
    projectItem {
      id
      content { ... on DraftIssue { title body } }
    }
  }
}";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ViewerProjects {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    #[serde(rename = "projectsV2")]
    projects: Nodes<ProjectNode>,
}

#[derive(Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectNode {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    short_description: Option<String>,
    #[serde(default)]
    public: bool,
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            url: node.url,
            description: node.short_description.filter(|d| !d.is_empty()),
            public: node.public,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddDraftIssue {
    add_project_v2_draft_issue: DraftIssuePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftIssuePayload {
    project_item: DraftItem,
}

#[derive(Deserialize)]
struct DraftItem {
    id: String,
    #[serde(default)]
    content: Option<DraftContent>,
}

#[derive(Deserialize)]
struct DraftContent {
    title: Option<String>,
    body: Option<String>,
}

/// GitHub API client with cached list reads
pub struct GitHubService {
    adapter: Arc<ProviderAdapter>,
    http: HttpClient,
    api_url: String,
}

impl GitHubService {
    pub fn new(adapter: Arc<ProviderAdapter>, http: HttpClient) -> Self {
        let api_url = adapter.settings().client.api_url.trim_end_matches('/').to_string();
        Self { adapter, http, api_url }
    }

    /// Repositories of the signed-in user, most recently updated first
    pub async fn fetch_repositories(&self, force_refresh: bool) -> Result<Vec<Repository>> {
        let key = CacheKey::new(Provider::GitHub, ResourceKind::Repos);
        read_through(self.adapter.cache(), &key, force_refresh, || {
            self.get("/user/repos?per_page=100&sort=updated")
        })
        .await
    }

    /// Projects v2 boards of the signed-in user
    pub async fn fetch_projects(&self, force_refresh: bool) -> Result<Vec<Project>> {
        let key = CacheKey::new(Provider::GitHub, ResourceKind::Projects);
        read_through(self.adapter.cache(), &key, force_refresh, || async {
            let data: ViewerProjects = self.graphql(PROJECTS_QUERY, json!({})).await?;
            Ok(data.viewer.projects.nodes.into_iter().flatten().map(Project::from).collect())
        })
        .await
    }

    pub async fn repo_labels(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> Result<Vec<Label>> {
        self.repo_collection(ResourceKind::Labels, owner, repo, "labels", force_refresh).await
    }

    pub async fn repo_milestones(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> Result<Vec<Milestone>> {
        self.repo_collection(ResourceKind::Milestones, owner, repo, "milestones", force_refresh)
            .await
    }

    /// Users issues in `owner/repo` can be assigned to
    pub async fn repo_assignees(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> Result<Vec<Assignee>> {
        self.repo_collection(ResourceKind::Assignees, owner, repo, "assignees", force_refresh)
            .await
    }

    /// Open an issue and move the repository to the front of the
    /// recently-used list
    pub async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Issue> {
        let path = format!("/repos/{}/{}/issues", encode(owner), encode(repo));
        let created: Issue = self.post(&path, issue).await?;
        info!(number = created.number, "GitHub issue created");

        self.adapter
            .cache()
            .add_recently_used(Provider::GitHub, ResourceKind::Repos, &format!("{owner}/{repo}"))
            .await?;
        Ok(created)
    }

    /// Add a draft issue to a project board and move the project to the front
    /// of the recently-used list
    pub async fn create_project_draft_issue(
        &self,
        project_id: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<DraftIssue> {
        let variables = json!({ "projectId": project_id, "title": title, "body": body });
        let data: AddDraftIssue = self.graphql(ADD_DRAFT_ISSUE_MUTATION, variables).await?;
        let item = data.add_project_v2_draft_issue.project_item;
        info!("GitHub project draft issue created");

        self.adapter
            .cache()
            .add_recently_used(Provider::GitHub, ResourceKind::Projects, project_id)
            .await?;

        let (title, body) = item.content.map(|c| (c.title, c.body)).unwrap_or_default();
        Ok(DraftIssue { id: item.id, title, body })
    }

    /// Filter `repositories` by name, full name or description; an empty
    /// query keeps everything
    #[must_use]
    pub fn search_repositories(query: &str, repositories: &[Repository]) -> Vec<Repository> {
        let query = query.trim();
        repositories.iter().filter(|repo| query.is_empty() || repo.matches(query)).cloned().collect()
    }

    /// Filter `projects` by title or description; an empty query keeps
    /// everything
    #[must_use]
    pub fn search_projects(query: &str, projects: &[Project]) -> Vec<Project> {
        let query = query.trim();
        projects.iter().filter(|project| query.is_empty() || project.matches(query)).cloned().collect()
    }

    async fn repo_collection<T>(
        &self,
        kind: ResourceKind,
        owner: &str,
        repo: &str,
        segment: &str,
        force_refresh: bool,
    ) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = CacheKey::scoped(Provider::GitHub, kind, format!("{owner}/{repo}"));
        let path = format!("/repos/{}/{}/{segment}?per_page=100", encode(owner), encode(repo));
        read_through(self.adapter.cache(), &key, force_refresh, || self.get(&path)).await
    }

    async fn authorized(&self, method: Method, url: String) -> Result<RequestBuilder> {
        let token = self.adapter.require_access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token).header(ACCEPT, GITHUB_ACCEPT))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.authorized(Method::GET, format!("{}{path}", self.api_url)).await?;
        self.http.send_json(Provider::GitHub, request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request =
            self.authorized(Method::POST, format!("{}{path}", self.api_url)).await?.json(body);
        self.http.send_json(Provider::GitHub, request).await
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let request = self
            .authorized(Method::POST, format!("{}/graphql", self.api_url))
            .await?
            .json(&json!({ "query": query, "variables": variables }));
        let response: GraphQlResponse<T> = self.http.send_json(Provider::GitHub, request).await?;

        if !response.errors.is_empty() {
            let message =
                response.errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
            warn!(error = %message, "GitHub GraphQL request failed");
            return Err(DulyNotedError::Api { provider: Provider::GitHub, status: 200, message });
        }

        response.data.ok_or_else(|| DulyNotedError::Api {
            provider: Provider::GitHub,
            status: 200,
            message: "GraphQL response without data".into(),
        })
    }
}
