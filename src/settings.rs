use std::env;

/// Compiled-in platform endpoint; each branded build points at its own
/// panel. The environment overrides exist for staging installs.
const DEFAULT_BASE_URL: &str = "https://panel.lectern.app/api";
const DEFAULT_API_KEY: &str = "";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
}

impl ApiSettings {
    pub fn from_env() -> Self {
        let settings = Self {
            base_url: env_or("LECTERN_API_BASE_URL", DEFAULT_BASE_URL),
            api_key: env_or("LECTERN_API_KEY", DEFAULT_API_KEY),
        };
        if settings.api_key.is_empty() {
            log::warn!("no API key configured, platform requests will be rejected");
        }
        settings
    }
}

fn env_or(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}
