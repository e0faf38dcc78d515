use dulynoted_domain::{Provider, Result};
use serde_json::Value;

use super::{list_text, Output};
use crate::context::AppContext;

/// Plain title of a page or database object, if it has one
fn title_of(object: &Value) -> Option<String> {
    let rich_text = object.get("title").or_else(|| {
        object
            .get("properties")?
            .as_object()?
            .values()
            .find(|property| property.get("type").and_then(Value::as_str) == Some("title"))?
            .get("title")
    })?;
    let title: String = rich_text
        .as_array()?
        .iter()
        .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
        .collect();
    (!title.is_empty()).then_some(title)
}

fn line(object: &Value) -> String {
    let id = object.get("id").and_then(Value::as_str).unwrap_or("?");
    match title_of(object) {
        Some(title) => format!("{id}  {title}"),
        None => format!("{id}  (untitled)"),
    }
}

pub(super) async fn databases(ctx: &AppContext, refresh: bool) -> Result<Output> {
    let databases = ctx.notion.databases(refresh).await?;
    Output::new(list_text(&databases, "No databases", line), &databases)
}

pub(super) async fn pages(ctx: &AppContext, query: &str) -> Result<Output> {
    let pages = ctx.notion.search_pages(query).await?;
    Output::new(list_text(&pages, "No pages", line), &pages)
}

pub(super) async fn workspace(ctx: &AppContext) -> Result<Output> {
    let info = ctx.adapter(Provider::Notion).workspace_info().await?;
    let text = match &info {
        Some(info) => format!(
            "Workspace: {}",
            info.workspace_name.as_deref().or(info.workspace_id.as_deref()).unwrap_or("unknown")
        ),
        None => "Not signed in to Notion".to_string(),
    };
    Output::new(text, &info)
}
