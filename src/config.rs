use crate::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_RETRY_DELAY_MS: u64 = 1_000;

#[derive(Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub supabase: SupabaseConfig,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for the chat-completion provider. Read once at startup and
/// shared read-only by every request.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
}

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: SecretString,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.host),
                port: parse_or(&lookup, "PORT", defaults.port)?,
            },
            provider: ProviderConfig::from_lookup(&lookup)?,
            supabase: SupabaseConfig {
                url: required(&lookup, "SUPABASE_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                anon_key: SecretString::from(required(&lookup, "SUPABASE_ANON_KEY")?),
            },
        })
    }
}

impl ProviderConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries = parse_or(lookup, "OPENROUTER_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(ConfigError::InvalidValue("OPENROUTER_MAX_RETRIES".into()));
        }

        Ok(Self {
            api_key: SecretString::from(required(lookup, "OPENROUTER_API_KEY")?),
            base_url: lookup("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_URL.to_string()),
            model: lookup("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms: parse_or(lookup, "OPENROUTER_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries,
            initial_retry_delay_ms: parse_or(
                lookup,
                "OPENROUTER_INITIAL_RETRY_DELAY_MS",
                DEFAULT_INITIAL_RETRY_DELAY_MS,
            )?,
        })
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_retry_delay_ms: DEFAULT_INITIAL_RETRY_DELAY_MS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}
