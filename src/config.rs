use anyhow::{Context, Result};

pub const DEFAULT_TOKEN_URL: &str = "https://datamarket.accesscontrol.windows.net/v2/OAuth2-13";
pub const DEFAULT_TOKEN_SCOPE: &str = "http://api.microsofttranslator.com";
pub const DEFAULT_TRANSLATOR_URL: &str =
    "http://api.microsofttranslator.com/v2/Http.svc/TranslateArray";

#[derive(Debug, Clone)]
pub struct Config {
    // Data store
    pub database_url: String,

    // Translator endpoints
    pub token_url: String,
    pub token_scope: String,
    pub translator_url: String,
    pub translator_content_type: String,
    pub reuse_access_token: bool,
    pub http_timeout_secs: u64,

    // Inbound HTTP surface
    pub api_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,

            token_url: std::env::var("TRANSLATOR_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            token_scope: std::env::var("TRANSLATOR_TOKEN_SCOPE")
                .unwrap_or_else(|_| DEFAULT_TOKEN_SCOPE.to_string()),
            translator_url: std::env::var("TRANSLATOR_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATOR_URL.to_string()),
            translator_content_type: std::env::var("TRANSLATOR_CONTENT_TYPE")
                .unwrap_or_else(|_| "text/html".to_string()),
            reuse_access_token: std::env::var("REUSE_ACCESS_TOKEN")
                .ok()
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Shared outbound client; every translator call goes through it
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.http_timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}
