use dulynoted_domain::{NewIssue, Result};
use dulynoted_infra::GitHubService;

use super::{list_text, Output};
use crate::cli::split_repository;
use crate::context::AppContext;

pub(super) async fn repositories(
    ctx: &AppContext,
    refresh: bool,
    search: Option<&str>,
) -> Result<Output> {
    let repositories = ctx.github.fetch_repositories(refresh).await?;
    let repositories = GitHubService::search_repositories(search.unwrap_or(""), &repositories);
    let text = list_text(&repositories, "No repositories", |repo| {
        let visibility = if repo.private { " (private)" } else { "" };
        match repo.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("{}{visibility} - {description}", repo.full_name),
            None => format!("{}{visibility}", repo.full_name),
        }
    });
    Output::new(text, &repositories)
}

pub(super) async fn projects(
    ctx: &AppContext,
    refresh: bool,
    search: Option<&str>,
) -> Result<Output> {
    let projects = ctx.github.fetch_projects(refresh).await?;
    let projects = GitHubService::search_projects(search.unwrap_or(""), &projects);
    let text = list_text(&projects, "No projects", |project| {
        format!("{}  {}", project.id, project.title)
    });
    Output::new(text, &projects)
}

pub(super) async fn labels(ctx: &AppContext, repository: &str, refresh: bool) -> Result<Output> {
    let (owner, repo) = split_repository(repository)?;
    let labels = ctx.github.repo_labels(owner, repo, refresh).await?;
    let text = list_text(&labels, "No labels", |label| label.name.clone());
    Output::new(text, &labels)
}

pub(super) async fn milestones(
    ctx: &AppContext,
    repository: &str,
    refresh: bool,
) -> Result<Output> {
    let (owner, repo) = split_repository(repository)?;
    let milestones = ctx.github.repo_milestones(owner, repo, refresh).await?;
    let text = list_text(&milestones, "No milestones", |milestone| {
        format!("#{} {} ({})", milestone.number, milestone.title, milestone.state)
    });
    Output::new(text, &milestones)
}

pub(super) async fn assignees(ctx: &AppContext, repository: &str, refresh: bool) -> Result<Output> {
    let (owner, repo) = split_repository(repository)?;
    let assignees = ctx.github.repo_assignees(owner, repo, refresh).await?;
    let text = list_text(&assignees, "No assignable users", |user| user.login.clone());
    Output::new(text, &assignees)
}

pub(super) async fn create_issue(
    ctx: &AppContext,
    repository: &str,
    issue: &NewIssue,
) -> Result<Output> {
    let (owner, repo) = split_repository(repository)?;
    let created = ctx.github.create_issue(owner, repo, issue).await?;
    let text = format!("Created {owner}/{repo}#{} {}", created.number, created.html_url);
    Output::new(text, &created)
}

pub(super) async fn create_draft(
    ctx: &AppContext,
    project_id: &str,
    title: &str,
    body: Option<&str>,
) -> Result<Output> {
    let draft = ctx.github.create_project_draft_issue(project_id, title, body).await?;
    Output::new(format!("Added draft {}", draft.id), &draft)
}
