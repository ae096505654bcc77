use anyhow::{Context, Result};
use atlassian_ops_api::ApiClient;
use serde_json::{json, Value};

use crate::output;

pub async fn search(
    client: &ApiClient,
    query: &str,
    space_key: Option<&str>,
    max: u32,
) -> Result<()> {
    let data = client
        .search_pages(query, space_key, max, 0)
        .await
        .context("Failed to search Confluence")?;

    let pages: Vec<Value> = data["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|result| {
                    json!({
                        "id": result["id"],
                        "title": result["title"],
                        "space": result["space"]["key"],
                        "url": wiki_url(client, result),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let total = data
        .get("totalSize")
        .or_else(|| data.get("size"))
        .cloned()
        .unwrap_or_else(|| json!(pages.len()));

    output::print_json(&json!({ "total": total, "pages": pages }))
}

pub async fn get(client: &ApiClient, page_id: &str) -> Result<()> {
    let data = client
        .get_page(page_id)
        .await
        .with_context(|| format!("Failed to fetch page {page_id}"))?;

    output::print_json(&json!({
        "id": data["id"],
        "title": data["title"],
        "space": data["space"]["key"],
        "version": data["version"]["number"],
        "body_html": data["body"]["storage"]["value"],
        "url": wiki_url(client, &data),
    }))
}

pub async fn create(
    client: &ApiClient,
    space_key: &str,
    title: &str,
    body: &str,
    parent_id: Option<&str>,
) -> Result<()> {
    let data = client
        .create_page(space_key, title, body, parent_id)
        .await
        .context("Failed to create page")?;

    tracing::info!(id = %data["id"], "Page created");

    output::print_json(&json!({
        "id": data["id"],
        "title": data["title"],
        "space": data["space"]["key"],
        "url": wiki_url(client, &data),
    }))
}

/// Read-before-write: the content API rejects writes that don't carry the
/// next version number, so fetch the page, increment `version.number`, and
/// send the update with that.
pub async fn update(client: &ApiClient, page_id: &str, title: &str, body: &str) -> Result<()> {
    let current = client
        .get_page(page_id)
        .await
        .with_context(|| format!("Failed to fetch page {page_id}"))?;

    let data = client
        .update_page(page_id, title, body, next_version(&current))
        .await
        .with_context(|| format!("Failed to update page {page_id}"))?;

    tracing::info!(%page_id, "Page updated");

    output::print_json(&json!({
        "id": data["id"],
        "title": data["title"],
        "version": data["version"]["number"],
        "url": wiki_url(client, &data),
    }))
}

pub async fn comment(client: &ApiClient, page_id: &str, text: &str) -> Result<()> {
    let data = client
        .add_page_comment(page_id, text)
        .await
        .with_context(|| format!("Failed to add comment to page {page_id}"))?;

    tracing::info!(%page_id, "Comment added");

    output::print_json(&json!({
        "id": data["id"],
        "page_id": page_id,
        "created": data["version"]["when"],
    }))
}

fn next_version(page: &Value) -> i64 {
    page["version"]["number"].as_i64().unwrap_or(1) + 1
}

fn wiki_url(client: &ApiClient, content: &Value) -> String {
    let webui = content["_links"]["webui"].as_str().unwrap_or_default();
    format!("{}/wiki{}", client.config().base_url, webui)
}
