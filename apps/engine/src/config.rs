use anyhow::{Context, Result};

/// Credentials loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key for the generative-language API (transcription, feedback,
    /// problem generation).
    pub google_api_key: String,
    /// Key for the hosted remote-execution service.
    pub rapidapi_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            rapidapi_key: require_env("RAPIDAPI_KEY")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
