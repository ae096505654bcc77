mod commands;
mod input;
mod output;

use anyhow::{anyhow, Result};
use atlassian_ops_api::ApiClient;
use atlassian_ops_config::Config;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "atlassian-ops",
    version,
    about = "Jira & Confluence client for Atlassian Cloud",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: OpsCommand,
}

#[derive(Subcommand, Debug)]
enum OpsCommand {
    /// Test Jira & Confluence connectivity
    TestConnection,

    /// Search Jira issues via JQL
    JiraSearch {
        /// JQL query string
        jql: String,
        /// Max results (default 25)
        #[arg(long, default_value_t = 25)]
        max: u32,
    },

    /// Get a Jira issue by key
    JiraGet {
        /// Issue key (e.g. OPS-42)
        key: String,
        /// Include comments
        #[arg(long)]
        comments: bool,
    },

    /// Create a new Jira issue
    JiraCreate {
        /// Project key (e.g. OPS)
        #[arg(long)]
        project: String,
        /// Issue summary
        #[arg(long)]
        summary: String,
        /// Issue type (default: Task)
        #[arg(long, default_value = "Task")]
        r#type: String,
        /// Description text
        #[arg(long)]
        description: Option<String>,
        /// Read description from file (use '-' for stdin)
        #[arg(long)]
        description_file: Option<String>,
        /// Priority (e.g. High)
        #[arg(long)]
        priority: Option<String>,
        /// Comma-separated labels
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
    },

    /// Add a comment to a Jira issue
    JiraComment {
        /// Issue key (e.g. OPS-42)
        key: String,
        /// Comment text
        text: Option<String>,
        /// Read comment from file (use '-' for stdin)
        #[arg(long)]
        comment_file: Option<String>,
    },

    /// Search Confluence pages
    ConfluenceSearch {
        /// Search keywords or CQL
        query: String,
        /// Space key to filter by
        #[arg(long)]
        space: Option<String>,
        /// Max results (default 25)
        #[arg(long, default_value_t = 25)]
        max: u32,
    },

    /// Get a Confluence page by ID
    ConfluenceGet {
        /// Numeric page ID
        page_id: String,
    },

    /// Create a new Confluence page
    ConfluenceCreate {
        /// Space key (e.g. OPS)
        #[arg(long)]
        space: String,
        /// Page title
        #[arg(long)]
        title: String,
        /// Page body (HTML or plain text)
        #[arg(long)]
        body: Option<String>,
        /// Read body from file (use '-' for stdin)
        #[arg(long)]
        body_file: Option<String>,
        /// Parent page ID (optional)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Update an existing Confluence page
    ConfluenceUpdate {
        /// Numeric page ID
        page_id: String,
        /// Page title
        #[arg(long)]
        title: String,
        /// Updated body (HTML or plain text)
        #[arg(long)]
        body: Option<String>,
        /// Read body from file (use '-' for stdin)
        #[arg(long)]
        body_file: Option<String>,
    },

    /// Add a comment to a Confluence page
    ConfluenceComment {
        /// Numeric page ID
        page_id: String,
        /// Comment text
        text: Option<String>,
        /// Read comment from file (use '-' for stdin)
        #[arg(long)]
        comment_file: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.debug)?;

    match cli.command {
        OpsCommand::TestConnection => {
            let client = build_client()?;
            commands::connection::test_connection(&client).await
        }
        OpsCommand::JiraSearch { jql, max } => {
            let client = build_client()?;
            commands::jira::search(&client, &jql, max).await
        }
        OpsCommand::JiraGet { key, comments } => {
            let client = build_client()?;
            commands::jira::get(&client, &key, comments).await
        }
        OpsCommand::JiraCreate {
            project,
            summary,
            r#type,
            description,
            description_file,
            priority,
            labels,
        } => {
            let description =
                input::resolve_text(description.as_deref(), description_file.as_deref())?;
            let client = build_client()?;
            commands::jira::create(
                &client,
                &project,
                &summary,
                &r#type,
                description.as_deref(),
                priority.as_deref(),
                &labels,
            )
            .await
        }
        OpsCommand::JiraComment {
            key,
            text,
            comment_file,
        } => {
            let text = require_text(
                text.as_deref(),
                comment_file.as_deref(),
                "jira-comment requires comment text or --comment-file",
            )?;
            let client = build_client()?;
            commands::jira::comment(&client, &key, &text).await
        }
        OpsCommand::ConfluenceSearch { query, space, max } => {
            let client = build_client()?;
            commands::confluence::search(&client, &query, space.as_deref(), max).await
        }
        OpsCommand::ConfluenceGet { page_id } => {
            let client = build_client()?;
            commands::confluence::get(&client, &page_id).await
        }
        OpsCommand::ConfluenceCreate {
            space,
            title,
            body,
            body_file,
            parent,
        } => {
            let body = require_text(
                body.as_deref(),
                body_file.as_deref(),
                "confluence-create requires --body or --body-file",
            )?;
            let client = build_client()?;
            commands::confluence::create(&client, &space, &title, &body, parent.as_deref()).await
        }
        OpsCommand::ConfluenceUpdate {
            page_id,
            title,
            body,
            body_file,
        } => {
            let body = require_text(
                body.as_deref(),
                body_file.as_deref(),
                "confluence-update requires --body or --body-file",
            )?;
            let client = build_client()?;
            commands::confluence::update(&client, &page_id, &title, &body).await
        }
        OpsCommand::ConfluenceComment {
            page_id,
            text,
            comment_file,
        } => {
            let text = require_text(
                text.as_deref(),
                comment_file.as_deref(),
                "confluence-comment requires comment text or --comment-file",
            )?;
            let client = build_client()?;
            commands::confluence::comment(&client, &page_id, &text).await
        }
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,atlassian_ops=debug,atlassian_ops_api=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}

fn build_client() -> Result<ApiClient> {
    let config = Config::from_env()?;
    Ok(ApiClient::new(&config)?)
}

/// Resolve required text input, reporting a usage error when neither
/// source yields anything.
fn require_text(inline: Option<&str>, file_path: Option<&str>, message: &str) -> Result<String> {
    match input::resolve_text(inline, file_path)? {
        Some(text) if !text.is_empty() => Ok(text),
        _ => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::MissingRequiredArgument, message).exit()
        }
    }
}
