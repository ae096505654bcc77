use anyhow::Result;
use atlassian_ops_api::ApiClient;

/// Run both connectivity checks and report one line per product.
pub async fn test_connection(client: &ApiClient) -> Result<()> {
    let jira_ok = client.test_jira_connection().await;
    let confluence_ok = client.test_confluence_connection().await;

    println!("Jira:       {}", if jira_ok { "connected" } else { "FAILED" });
    println!(
        "Confluence: {}",
        if confluence_ok { "connected" } else { "FAILED" }
    );

    Ok(())
}
