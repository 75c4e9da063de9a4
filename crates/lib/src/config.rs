//! Configuration loading.
//!
//! All settings come from the environment, read once at startup (the CLI loads
//! a `.env` file first). The resulting `Config` is immutable and handed to the
//! component constructors; nothing reads the environment after boot.

use anyhow::{Context, Result};

/// Process-wide configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (e.g. "https://xyz.supabase.co").
    pub supabase_url: String,

    /// Supabase service key, sent as both `apikey` and bearer token.
    pub supabase_key: String,

    /// OpenAI API key.
    pub openai_api_key: String,

    /// WhatsApp Cloud API access token.
    pub whatsapp_token: String,

    /// Phone number id of the business sender (also the path segment of the
    /// Graph API messages endpoint).
    pub whatsapp_phone_id: String,

    /// Shared secret for the webhook subscription handshake.
    pub verify_token: String,

    /// Listen port (default 3000).
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    pub bind: String,

    /// Override for the OpenAI base URL (tests or compatible endpoints).
    pub openai_base_url: Option<String>,

    /// Override for the Graph API base URL (tests or API version changes).
    pub graph_api_base: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_key: String::new(),
            openai_api_key: String::new(),
            whatsapp_token: String::new(),
            whatsapp_phone_id: String::new(),
            verify_token: String::new(),
            port: default_port(),
            bind: default_bind(),
            openai_base_url: None,
            graph_api_base: None,
        }
    }
}

/// Env var value with surrounding whitespace trimmed; empty counts as unset.
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn require_env(name: &str) -> Result<String> {
    env_trimmed(name).with_context(|| format!("missing required environment variable {}", name))
}

fn env_port() -> u16 {
    match env_trimmed("PORT") {
        Some(s) => s.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable PORT value {:?}", s);
            default_port()
        }),
        None => default_port(),
    }
}

impl Config {
    /// Build the configuration from the environment. Fails when a required
    /// credential is missing; `PORT` and `BIND` fall back to defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_key: require_env("SUPABASE_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            whatsapp_token: require_env("WHATSAPP_TOKEN")?,
            whatsapp_phone_id: require_env("WHATSAPP_PHONE_ID")?,
            verify_token: require_env("WHATSAPP_VERIFY_TOKEN")?,
            port: env_port(),
            bind: env_trimmed("BIND").unwrap_or_else(default_bind),
            openai_base_url: env_trimmed("OPENAI_BASE_URL"),
            graph_api_base: env_trimmed("GRAPH_API_BASE"),
        })
    }
}
