//! Command-line arguments

use clap::{Parser, Subcommand};
use dulynoted_domain::{DulyNotedError, Provider, ResourceKind, Result};

#[derive(Debug, Parser)]
#[command(name = "dulynoted", version, about = "Duly Noted - GitHub and Notion sign-in and resources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Output logs as JSON instead of human-readable
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,

    /// Print command results as JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show which providers are signed in
    Status,
    /// Sign in through the browser
    SignIn { provider: Provider },
    /// Forget the credential and every cached collection of a provider
    SignOut { provider: Provider },
    /// List GitHub repositories
    Repos {
        #[arg(long)]
        refresh: bool,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List GitHub project boards
    Projects {
        #[arg(long)]
        refresh: bool,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List labels of a repository (owner/repo)
    Labels {
        repository: String,
        #[arg(long)]
        refresh: bool,
    },
    /// List milestones of a repository (owner/repo)
    Milestones {
        repository: String,
        #[arg(long)]
        refresh: bool,
    },
    /// List assignable users of a repository (owner/repo)
    Assignees {
        repository: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Open an issue in a repository (owner/repo)
    Issue {
        repository: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long = "label")]
        labels: Vec<String>,
        #[arg(long = "assignee")]
        assignees: Vec<String>,
        #[arg(long)]
        milestone: Option<u64>,
    },
    /// Add a draft issue to a project board
    Draft {
        project_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
    },
    /// List Notion databases shared with the integration
    Databases {
        #[arg(long)]
        refresh: bool,
    },
    /// Search Notion pages by title
    Pages { query: Option<String> },
    /// Show the connected Notion workspace
    Workspace,
    /// Recently used items of one kind, newest first
    Recent { provider: Provider, kind: ResourceKind },
}

impl Command {
    /// Stable name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::SignIn { .. } => "sign_in",
            Self::SignOut { .. } => "sign_out",
            Self::Repos { .. } => "repos",
            Self::Projects { .. } => "projects",
            Self::Labels { .. } => "labels",
            Self::Milestones { .. } => "milestones",
            Self::Assignees { .. } => "assignees",
            Self::Issue { .. } => "issue",
            Self::Draft { .. } => "draft",
            Self::Databases { .. } => "databases",
            Self::Pages { .. } => "pages",
            Self::Workspace => "workspace",
            Self::Recent { .. } => "recent",
        }
    }

    /// Whether the command blocks on the user finishing a browser sign-in
    #[must_use]
    pub fn waits_for_browser(&self) -> bool {
        matches!(self, Self::SignIn { .. })
    }
}

/// Split `owner/repo`
///
/// # Errors
/// `InvalidInput` unless both halves are present.
pub fn split_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(DulyNotedError::InvalidInput(format!(
            "expected owner/repo, got {repository:?}"
        ))),
    }
}
