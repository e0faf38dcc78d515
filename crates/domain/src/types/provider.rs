//! Supported destinations that require OAuth sign-in

use serde::{Deserialize, Serialize};

/// A content provider the user signs in to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    Notion,
}

crate::impl_domain_name_conversions!(Provider {
    GitHub => "github",
    Notion => "notion",
});

impl Provider {
    /// Every supported provider, in display order
    pub const ALL: [Provider; 2] = [Provider::GitHub, Provider::Notion];

    /// Human readable name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::Notion => "Notion",
        }
    }
}
