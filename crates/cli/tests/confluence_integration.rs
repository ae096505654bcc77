use atlassian_ops_api::ApiClient;
use atlassian_ops_config::Config;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    let config = Config::from_lookup(|name| match name {
        "ATLASSIAN_BASE_URL" => Some(base_url.to_string()),
        "ATLASSIAN_EMAIL" => Some("test@example.com".to_string()),
        "ATLASSIAN_API_TOKEN" => Some("fake-token".to_string()),
        _ => None,
    })
    .unwrap();
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_search_pages_builds_text_cql() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/search"))
        .and(query_param("cql", r#"type = "page" AND text ~ "foo bar""#))
        .and(query_param("limit", "25"))
        .and(query_param("start", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [], "size": 0 })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let response = client.search_pages("foo bar", None, 25, 0).await.unwrap();

    assert_eq!(response["size"], 0);
}

#[tokio::test]
async fn test_search_pages_parenthesizes_cql_queries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/search"))
        .and(query_param("cql", r#"type = "page" AND (space = X)"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [], "size": 0 })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    client.search_pages("space = X", None, 25, 0).await.unwrap();
}

#[tokio::test]
async fn test_search_pages_caps_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/search"))
        .and(query_param("cql", r#"type = "page" AND space = "OPS" AND text ~ "runbook""#))
        .and(query_param("limit", "100"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [], "size": 0 })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    client
        .search_pages("runbook", Some("OPS"), 500, 0)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_page_expands_storage_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/12345678"))
        .and(query_param("expand", "body.storage,version,space"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12345678",
            "title": "Architecture",
            "space": { "key": "OPS" },
            "version": { "number": 3 },
            "body": { "storage": { "value": "<p>overview</p>" } },
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let page = client.get_page("12345678").await.unwrap();

    assert_eq!(page["title"], "Architecture");
    assert_eq!(page["version"]["number"], 3);
}

#[tokio::test]
async fn test_create_page_wraps_plain_body() {
    let mock_server = MockServer::start().await;

    let expected_payload = json!({
        "type": "page",
        "title": "Runbook",
        "space": { "key": "OPS" },
        "body": {
            "storage": {
                "value": "<p>plain text body</p>",
                "representation": "storage",
            }
        },
        "ancestors": [{ "id": "99" }],
    });

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .and(body_json(&expected_payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "55555",
            "title": "Runbook",
            "space": { "key": "OPS" },
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let page = client
        .create_page("OPS", "Runbook", "plain text body", Some("99"))
        .await
        .unwrap();

    assert_eq!(page["id"], "55555");
}

#[tokio::test]
async fn test_update_page_sends_incremented_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/12345678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12345678",
            "title": "Old title",
            "version": { "number": 5 },
            "body": { "storage": { "value": "<p>old</p>" } },
        })))
        .mount(&mock_server)
        .await;

    let expected_payload = json!({
        "type": "page",
        "title": "New title",
        "version": { "number": 6 },
        "body": {
            "storage": {
                "value": "<p>fresh content</p>",
                "representation": "storage",
            }
        },
    });

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/12345678"))
        .and(body_json(&expected_payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12345678",
            "title": "New title",
            "version": { "number": 6 },
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());

    let current = client.get_page("12345678").await.unwrap();
    let next_version = current["version"]["number"].as_i64().unwrap() + 1;
    let updated = client
        .update_page("12345678", "New title", "fresh content", next_version)
        .await
        .unwrap();

    assert_eq!(updated["version"]["number"], 6);
}

#[tokio::test]
async fn test_page_comment_keeps_existing_markup() {
    let mock_server = MockServer::start().await;

    let expected_payload = json!({
        "type": "comment",
        "container": { "id": "12345678", "type": "page" },
        "body": {
            "storage": {
                "value": "<h2>Already markup</h2>",
                "representation": "storage",
            }
        },
    });

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .and(body_json(&expected_payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "77777",
            "version": { "when": "2025-06-01T10:00:00.000Z" },
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let comment = client
        .add_page_comment("12345678", "<h2>Already markup</h2>")
        .await
        .unwrap();

    assert_eq!(comment["id"], "77777");
}

#[tokio::test]
async fn test_connectivity_check_swallows_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/api/v2/spaces"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    assert!(!client.test_confluence_connection().await);
}
