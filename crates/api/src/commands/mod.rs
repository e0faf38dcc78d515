//! Command handlers - the front end's bridge to the provider adapters
//!
//! Every handler returns an [`Output`] carrying both the human-readable text
//! and the JSON document printed with `--json`.

mod auth;
mod github;
mod notion;
mod recent;

use std::time::Instant;

use dulynoted_domain::Result;
use serde::Serialize;
use serde_json::Value;

use crate::cli::Command;
use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub text: String,
    pub data: Value,
}

impl Output {
    fn new<T: Serialize>(text: impl Into<String>, data: &T) -> Result<Self> {
        Ok(Self { text: text.into(), data: serde_json::to_value(data)? })
    }

    /// Text for the terminal
    #[must_use]
    pub fn render(&self, json: bool) -> String {
        if json {
            serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| self.data.to_string())
        } else {
            self.text.clone()
        }
    }
}

/// Run `command` against `ctx`
///
/// # Errors
/// Whatever the underlying adapter or API client reports.
pub async fn execute(ctx: &AppContext, command: Command) -> Result<Output> {
    let name = command.name();
    let start = Instant::now();

    let result = match command {
        Command::Status => auth::status(ctx).await,
        Command::SignIn { provider } => auth::sign_in(ctx, provider).await,
        Command::SignOut { provider } => auth::sign_out(ctx, provider).await,
        Command::Repos { refresh, search } => {
            github::repositories(ctx, refresh, search.as_deref()).await
        }
        Command::Projects { refresh, search } => {
            github::projects(ctx, refresh, search.as_deref()).await
        }
        Command::Labels { repository, refresh } => {
            github::labels(ctx, &repository, refresh).await
        }
        Command::Milestones { repository, refresh } => {
            github::milestones(ctx, &repository, refresh).await
        }
        Command::Assignees { repository, refresh } => {
            github::assignees(ctx, &repository, refresh).await
        }
        Command::Issue { repository, title, body, labels, assignees, milestone } => {
            let issue = dulynoted_domain::NewIssue { title, body, labels, assignees, milestone };
            github::create_issue(ctx, &repository, &issue).await
        }
        Command::Draft { project_id, title, body } => {
            github::create_draft(ctx, &project_id, &title, body.as_deref()).await
        }
        Command::Databases { refresh } => notion::databases(ctx, refresh).await,
        Command::Pages { query } => notion::pages(ctx, query.as_deref().unwrap_or("")).await,
        Command::Workspace => notion::workspace(ctx).await,
        Command::Recent { provider, kind } => recent::recently_used(ctx, provider, kind).await,
    };

    log_command_execution(name, start.elapsed(), result.as_ref().err());
    result
}

/// One line per item, or a placeholder when there is nothing to show
fn list_text<T>(items: &[T], empty: &str, line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.iter().map(line).collect::<Vec<_>>().join("\n")
    }
}
