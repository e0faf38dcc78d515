use dulynoted_domain::{Provider, Result};
use serde_json::json;

use super::Output;
use crate::context::AppContext;

pub(super) async fn status(ctx: &AppContext) -> Result<Output> {
    let statuses = ctx.status().await?;
    let text = statuses
        .iter()
        .map(|status| match (status.authenticated, status.account.as_deref()) {
            (true, Some(account)) => {
                format!("{}: signed in as {account}", status.provider.display_name())
            }
            (true, None) => format!("{}: signed in", status.provider.display_name()),
            (false, _) => format!("{}: signed out", status.provider.display_name()),
        })
        .collect::<Vec<_>>()
        .join("\n");
    Output::new(text, &statuses)
}

pub(super) async fn sign_in(ctx: &AppContext, provider: Provider) -> Result<Output> {
    let outcome = ctx.sign_in(provider).await?;
    let account = outcome.identity.account_label;
    Output::new(
        format!("Signed in to {} as {account}", provider.display_name()),
        &json!({ "provider": provider, "account": account, "workspace": outcome.identity.workspace }),
    )
}

pub(super) async fn sign_out(ctx: &AppContext, provider: Provider) -> Result<Output> {
    ctx.adapter(provider).sign_out().await?;
    Output::new(
        format!("Signed out of {}", provider.display_name()),
        &json!({ "provider": provider, "authenticated": false }),
    )
}
