//! Identity taken from the token response itself
//!
//! Notion returns the workspace the integration was installed into along
//! with the access token, so no extra request is needed.

use async_trait::async_trait;
use dulynoted_domain::{Identity, Result, TokenResponse, WorkspaceInfo};

use crate::oauth::ports::IdentityResolver;

/// Reads `workspace_*`, `bot_id` and `owner` from the token response
#[derive(Debug, Clone, Default)]
pub struct TokenResponseIdentity;

#[async_trait]
impl IdentityResolver for TokenResponseIdentity {
    async fn resolve(&self, token: &TokenResponse) -> Result<Identity> {
        let workspace = WorkspaceInfo {
            workspace_id: token.extra_str("workspace_id").map(str::to_string),
            workspace_name: token.extra_str("workspace_name").map(str::to_string),
            workspace_icon: token.extra_str("workspace_icon").map(str::to_string),
            bot_id: token.extra_str("bot_id").map(str::to_string),
            owner: token.extra.get("owner").filter(|v| !v.is_null()).cloned(),
        };

        let owner_name = workspace
            .owner
            .as_ref()
            .and_then(|owner| owner.pointer("/user/name"))
            .and_then(serde_json::Value::as_str);
        let label = workspace
            .workspace_name
            .as_deref()
            .or(owner_name)
            .unwrap_or("Notion workspace")
            .to_string();

        Ok(Identity { account_label: label, workspace: Some(workspace) })
    }
}
