use dulynoted_domain::{Provider, ResourceKind, Result};
use serde_json::json;

use super::{list_text, Output};
use crate::context::AppContext;

pub(super) async fn recently_used(
    ctx: &AppContext,
    provider: Provider,
    kind: ResourceKind,
) -> Result<Output> {
    let ids = ctx.providers.cache().get_recently_used(provider, kind).await?;
    let text = list_text(&ids, "Nothing used recently", Clone::clone);
    Output::new(text, &json!({ "provider": provider, "kind": kind, "ids": ids }))
}
