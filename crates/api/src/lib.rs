//! Transport client for Jira (REST v3) and the Confluence content API.
//!
//! One async method per remote operation. Methods build the endpoint URL
//! and payload, issue a single request with basic auth, and return the
//! parsed JSON body; any non-2xx response is an error carrying status and
//! body. The two connectivity checks are the exception: they swallow all
//! failures and report a boolean.

pub mod document;
pub mod error;
pub mod query;

use std::time::Duration;

use atlassian_ops_config::Config;
use error::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Hard cap the remote search endpoints accept per request.
pub const MAX_SEARCH_RESULTS: u32 = 100;

const DEFAULT_ISSUE_FIELDS: &str =
    "summary,status,assignee,reporter,priority,issuetype,created,updated,labels";

pub struct ApiClient {
    client: Client,
    base_url: Url,
    config: Config,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(format!("atlassian-ops/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // -- Jira ------------------------------------------------------------

    /// Quick connectivity check against Jira.
    pub async fn test_jira_connection(&self) -> bool {
        match self.get("/rest/api/3/myself").await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "Jira connectivity check failed");
                false
            }
        }
    }

    /// Search issues using JQL. `max_results` is capped at
    /// [`MAX_SEARCH_RESULTS`] before the request is sent.
    pub async fn search_issues(&self, jql: &str, max_results: u32, start_at: u32) -> Result<Value> {
        let max_results = max_results.min(MAX_SEARCH_RESULTS);
        let path = format!(
            "/rest/api/3/search/jql?jql={}&maxResults={}&startAt={}&fields={}",
            urlencoding::encode(jql),
            max_results,
            start_at,
            DEFAULT_ISSUE_FIELDS,
        );
        self.get(&path).await
    }

    /// Fetch a single issue by key (e.g. `OPS-42`).
    pub async fn get_issue(&self, issue_key: &str, expand: Option<&str>) -> Result<Value> {
        let mut path = format!("/rest/api/3/issue/{issue_key}");
        if let Some(expand) = expand {
            path.push_str("?expand=");
            path.push_str(&urlencoding::encode(expand));
        }
        self.get(&path).await
    }

    /// Create an issue. A plain-text description is wrapped into a
    /// one-paragraph ADF document.
    pub async fn create_issue(
        &self,
        project_key: &str,
        summary: &str,
        issue_type: &str,
        description: Option<&str>,
        priority: Option<&str>,
        labels: &[String],
    ) -> Result<Value> {
        let mut fields = json!({
            "project": { "key": project_key },
            "summary": summary,
            "issuetype": { "name": issue_type },
        });

        if let Some(text) = description {
            fields["description"] = document::paragraph_doc(text);
        }
        if let Some(name) = priority {
            fields["priority"] = json!({ "name": name });
        }
        if !labels.is_empty() {
            fields["labels"] = json!(labels);
        }

        self.post("/rest/api/3/issue", &json!({ "fields": fields }))
            .await
    }

    /// Add a comment to an issue, wrapping the text into a one-paragraph
    /// ADF document.
    pub async fn add_issue_comment(&self, issue_key: &str, body_text: &str) -> Result<Value> {
        let payload = json!({ "body": document::paragraph_doc(body_text) });
        self.post(&format!("/rest/api/3/issue/{issue_key}/comment"), &payload)
            .await
    }

    // -- Confluence ------------------------------------------------------

    /// Quick connectivity check against Confluence.
    pub async fn test_confluence_connection(&self) -> bool {
        match self.get("/wiki/api/v2/spaces?limit=1").await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "Confluence connectivity check failed");
                false
            }
        }
    }

    /// Search pages via CQL composed from the query and optional space
    /// filter. `limit` is capped at [`MAX_SEARCH_RESULTS`].
    pub async fn search_pages(
        &self,
        query: &str,
        space_key: Option<&str>,
        limit: u32,
        start: u32,
    ) -> Result<Value> {
        let limit = limit.min(MAX_SEARCH_RESULTS);
        let cql = query::page_search_cql(query, space_key);
        let path = format!(
            "/wiki/rest/api/content/search?cql={}&limit={}&start={}",
            urlencoding::encode(&cql),
            limit,
            start,
        );
        self.get(&path).await
    }

    /// Retrieve a single page with its storage body, version and space.
    pub async fn get_page(&self, page_id: &str) -> Result<Value> {
        let path = format!(
            "/wiki/rest/api/content/{page_id}?expand={}",
            urlencoding::encode("body.storage,version,space"),
        );
        self.get(&path).await
    }

    /// Create a page in storage format. Plain-text bodies are wrapped in a
    /// paragraph tag.
    pub async fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Value> {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space_key },
            "body": {
                "storage": {
                    "value": document::ensure_storage_markup(body),
                    "representation": "storage",
                }
            },
        });

        if let Some(id) = parent_id {
            payload["ancestors"] = json!([{ "id": id }]);
        }

        self.post("/wiki/rest/api/content", &payload).await
    }

    /// Update a page. The server enforces optimistic concurrency: the
    /// caller must pass the next version number, obtained by fetching the
    /// current page and incrementing `version.number`.
    pub async fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version_number: i64,
    ) -> Result<Value> {
        let payload = json!({
            "type": "page",
            "title": title,
            "version": { "number": version_number },
            "body": {
                "storage": {
                    "value": document::ensure_storage_markup(body),
                    "representation": "storage",
                }
            },
        });

        self.put(&format!("/wiki/rest/api/content/{page_id}"), &payload)
            .await
    }

    /// Add a footer comment to a page.
    pub async fn add_page_comment(&self, page_id: &str, body: &str) -> Result<Value> {
        let payload = json!({
            "type": "comment",
            "container": { "id": page_id, "type": "page" },
            "body": {
                "storage": {
                    "value": document::ensure_storage_markup(body),
                    "representation": "storage",
                }
            },
        });

        self.post("/wiki/rest/api/content", &payload).await
    }

    // -- request plumbing ------------------------------------------------

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self
            .base_url
            .join(path.strip_prefix('/').unwrap_or(path))
            .map_err(ApiError::InvalidUrl)?;

        debug!(method = %method, url = %url, "Sending request");

        let mut req = self
            .client
            .request(method, url.clone())
            .basic_auth(&self.config.email, Some(&self.config.api_token));

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(ApiError::RequestFailed)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }
}
