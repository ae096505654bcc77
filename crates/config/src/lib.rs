use anyhow::{bail, Context, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_BASE_URL: &str = "https://your-site.atlassian.net";

/// Atlassian Cloud connection settings, loaded once from the environment
/// and immutable for the rest of the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site base URL, without a trailing slash.
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from `ATLASSIAN_*` environment variables.
    ///
    /// `ATLASSIAN_EMAIL` and `ATLASSIAN_API_TOKEN` are required; the base
    /// URL and timeout fall back to defaults. Fails before any network
    /// activity when a required variable is absent.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a `Config` from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ATLASSIAN_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let email = lookup("ATLASSIAN_EMAIL").filter(|v| !v.trim().is_empty());
        let api_token = lookup("ATLASSIAN_API_TOKEN").filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        if email.is_none() {
            missing.push("ATLASSIAN_EMAIL");
        }
        if api_token.is_none() {
            missing.push("ATLASSIAN_API_TOKEN");
        }
        let (Some(email), Some(api_token)) = (email, api_token) else {
            bail!(
                "Missing required Atlassian environment variables: {}",
                missing.join(", ")
            );
        };

        let timeout_secs = match lookup("ATLASSIAN_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid ATLASSIAN_TIMEOUT value: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            email,
            api_token,
            timeout_secs,
        })
    }
}
