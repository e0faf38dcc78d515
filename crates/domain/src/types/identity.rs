//! Minimal account identity shown after sign-in

use serde::{Deserialize, Serialize};

/// Who the user signed in as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// GitHub login or Notion workspace name
    pub account_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceInfo>,
}

impl Identity {
    #[must_use]
    pub fn new(account_label: impl Into<String>) -> Self {
        Self { account_label: account_label.into(), workspace: None }
    }
}

/// Notion workspace details returned with the token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub workspace_icon: Option<String>,
    pub bot_id: Option<String>,
    pub owner: Option<serde_json::Value>,
}
