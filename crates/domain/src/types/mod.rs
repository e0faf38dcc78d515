//! Domain types and models

pub mod cache;
pub mod credential;
pub mod github;
pub mod identity;
pub mod oauth;
pub mod provider;

pub use cache::{CacheKey, ResourceKind};
pub use credential::Credential;
pub use github::{
    Assignee, DraftIssue, Issue, Label, Milestone, NewIssue, Project, Repository,
};
pub use identity::{Identity, WorkspaceInfo};
pub use oauth::{
    AuthorizationRequest, AuthorizationState, CallbackParams, TokenResponse, TransportStrategy,
};
pub use provider::Provider;
