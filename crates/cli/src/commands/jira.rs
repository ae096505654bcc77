use anyhow::{Context, Result};
use atlassian_ops_api::ApiClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::output;

pub async fn search(client: &ApiClient, jql: &str, max: u32) -> Result<()> {
    #[derive(Deserialize)]
    struct SearchResponse {
        #[serde(default)]
        issues: Vec<Issue>,
        #[serde(default)]
        total: u64,
    }

    let data = client
        .search_issues(jql, max, 0)
        .await
        .context("Failed to search issues")?;
    let response: SearchResponse =
        serde_json::from_value(data).context("Unexpected search response shape")?;

    let issues: Vec<Value> = response
        .issues
        .iter()
        .map(|issue| {
            json!({
                "key": &issue.key,
                "summary": &issue.fields.summary,
                "status": issue.fields.status.as_ref().map(|s| &s.name),
                "priority": issue.fields.priority.as_ref().map(|p| &p.name),
                "type": issue.fields.issuetype.as_ref().map(|t| &t.name),
                "assignee": issue.fields.assignee.as_ref().map(|a| &a.display_name),
                "labels": &issue.fields.labels,
                "updated": &issue.fields.updated,
                "url": browse_url(client, &issue.key),
            })
        })
        .collect();

    output::print_json(&json!({ "total": response.total, "issues": issues }))
}

pub async fn get(client: &ApiClient, issue_key: &str, include_comments: bool) -> Result<()> {
    let data = client
        .get_issue(issue_key, Some("renderedFields"))
        .await
        .with_context(|| format!("Failed to fetch issue {issue_key}"))?;
    let issue: Issue =
        serde_json::from_value(data).context("Unexpected issue response shape")?;

    let mut result = json!({
        "key": &issue.key,
        "summary": &issue.fields.summary,
        "status": issue.fields.status.as_ref().map(|s| &s.name),
        "priority": issue.fields.priority.as_ref().map(|p| &p.name),
        "type": issue.fields.issuetype.as_ref().map(|t| &t.name),
        "assignee": issue.fields.assignee.as_ref().map(|a| &a.display_name),
        "reporter": issue.fields.reporter.as_ref().map(|r| &r.display_name),
        "labels": &issue.fields.labels,
        "created": &issue.fields.created,
        "updated": &issue.fields.updated,
        "description_html": issue
            .rendered_fields
            .as_ref()
            .and_then(|rf| rf.description.as_deref())
            .unwrap_or(""),
        "url": browse_url(client, &issue.key),
    });

    if include_comments {
        let comments: Vec<Value> = issue
            .fields
            .comment
            .map(|container| container.comments)
            .unwrap_or_default()
            .iter()
            .map(|comment| {
                json!({
                    "author": comment.author.as_ref().map(|a| &a.display_name),
                    "created": &comment.created,
                    "body": adf_to_plain_text(&comment.body),
                })
            })
            .collect();
        result["comments"] = json!(comments);
    }

    output::print_json(&result)
}

pub async fn create(
    client: &ApiClient,
    project: &str,
    summary: &str,
    issue_type: &str,
    description: Option<&str>,
    priority: Option<&str>,
    labels: &[String],
) -> Result<()> {
    let data = client
        .create_issue(project, summary, issue_type, description, priority, labels)
        .await
        .context("Failed to create issue")?;

    let key = data["key"].as_str().unwrap_or_default().to_string();
    tracing::info!(%key, "Issue created");

    output::print_json(&json!({
        "key": data["key"],
        "id": data["id"],
        "url": browse_url(client, &key),
    }))
}

pub async fn comment(client: &ApiClient, issue_key: &str, text: &str) -> Result<()> {
    let data = client
        .add_issue_comment(issue_key, text)
        .await
        .with_context(|| format!("Failed to add comment to {issue_key}"))?;

    tracing::info!(key = %issue_key, "Comment added");

    output::print_json(&json!({
        "comment_id": data["id"],
        "created": data["created"],
        "issue_key": issue_key,
    }))
}

fn browse_url(client: &ApiClient, issue_key: &str) -> String {
    format!("{}/browse/{}", client.config().base_url, issue_key)
}

/// Recursively extract plain text from an Atlassian Document Format node:
/// the node's own `text` followed by the extraction of every child under
/// `content`.
fn adf_to_plain_text(node: &Value) -> String {
    match node {
        Value::Object(map) => {
            let mut text = map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(children) = map.get("content").and_then(Value::as_array) {
                for child in children {
                    text.push_str(&adf_to_plain_text(child));
                }
            }
            text
        }
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// Issue-related data structures

#[derive(Deserialize)]
struct Issue {
    key: String,
    #[serde(default)]
    fields: IssueFields,
    #[serde(rename = "renderedFields", default)]
    rendered_fields: Option<RenderedFields>,
}

#[derive(Deserialize, Default)]
struct IssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<NamedField>,
    #[serde(default)]
    priority: Option<NamedField>,
    #[serde(default)]
    issuetype: Option<NamedField>,
    #[serde(default)]
    assignee: Option<UserField>,
    #[serde(default)]
    reporter: Option<UserField>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    updated: Option<String>,
    #[serde(default)]
    comment: Option<CommentContainer>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Deserialize)]
struct UserField {
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Deserialize)]
struct RenderedFields {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct CommentContainer {
    #[serde(default)]
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct Comment {
    #[serde(default)]
    author: Option<UserField>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    body: Value,
}
