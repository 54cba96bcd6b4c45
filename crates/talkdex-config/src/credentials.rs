//! API key resolution for remote embedding providers
//!
//! [`resolve_api_key`] checks sources in this order:
//! 1. `TALKDEX_EMBEDDING_API_KEY`
//! 2. The provider's conventional variable (e.g. `OPENAI_API_KEY`)
//! 3. The config file value

use tracing::debug;

/// Environment variable consulted first for any provider
pub const API_KEY_ENV: &str = "TALKDEX_EMBEDDING_API_KEY";

/// Conventional environment variable for a provider, if it has one
pub fn provider_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Resolve an API key from the process environment, then the config value
pub fn resolve_api_key(provider: &str, config_value: Option<&str>) -> Option<String> {
    resolve_api_key_with(provider, config_value, |name| std::env::var(name).ok())
}

/// Resolve an API key with an injectable environment lookup
pub fn resolve_api_key_with<F>(provider: &str, config_value: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |value: String| {
        let trimmed = value.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    if let Some(key) = lookup(API_KEY_ENV).and_then(non_blank) {
        debug!(source = API_KEY_ENV, "Resolved embedding API key from environment");
        return Some(key);
    }
    if let Some(var) = provider_env_var(provider) {
        if let Some(key) = lookup(var).and_then(non_blank) {
            debug!(source = var, "Resolved embedding API key from environment");
            return Some(key);
        }
    }
    config_value.map(str::to_string).and_then(non_blank)
}
