//! Cached provider resource collections

use serde::{Deserialize, Serialize};

use crate::keys;
use crate::types::Provider;

/// Kind of provider resource kept in the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Repos,
    Projects,
    Labels,
    Milestones,
    Assignees,
    Databases,
    Pages,
}

crate::impl_domain_name_conversions!(ResourceKind {
    Repos => "repos",
    Projects => "projects",
    Labels => "labels",
    Milestones => "milestones",
    Assignees => "assignees",
    Databases => "databases",
    Pages => "pages",
});

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Repos,
        ResourceKind::Projects,
        ResourceKind::Labels,
        ResourceKind::Milestones,
        ResourceKind::Assignees,
        ResourceKind::Databases,
        ResourceKind::Pages,
    ];

    /// Segment used inside persisted storage keys (`githubRepos`, ...)
    #[must_use]
    pub const fn storage_segment(&self) -> &'static str {
        match self {
            Self::Repos => "Repos",
            Self::Projects => "Projects",
            Self::Labels => "Labels",
            Self::Milestones => "Milestones",
            Self::Assignees => "Assignees",
            Self::Databases => "Databases",
            Self::Pages => "Pages",
        }
    }
}

/// Identifies one cached collection: provider, kind and an optional scope
/// such as a repository full name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: Provider,
    pub kind: ResourceKind,
    pub scope: Option<String>,
}

impl CacheKey {
    #[must_use]
    pub fn new(provider: Provider, kind: ResourceKind) -> Self {
        Self { provider, kind, scope: None }
    }

    /// Key for a sub-cache, e.g. the labels of one repository
    #[must_use]
    pub fn scoped(provider: Provider, kind: ResourceKind, scope: impl Into<String>) -> Self {
        Self { provider, kind, scope: Some(scope.into()) }
    }

    /// Storage key of the item collection
    #[must_use]
    pub fn items_key(&self) -> String {
        keys::collection(self.provider, self.kind, self.scope.as_deref())
    }

    /// Storage key of the `cachedAt` timestamp
    #[must_use]
    pub fn cached_at_key(&self) -> String {
        keys::cached_at(self.provider, self.kind, self.scope.as_deref())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.items_key())
    }
}
