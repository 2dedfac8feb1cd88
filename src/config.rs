//! Runtime configuration, read from the environment (and `.env` via dotenvy).

use anyhow::{Context, Result, anyhow};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
    pub token: TokenConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or_else(|| anyhow!("LLM_API_KEY (or OPENAI_API_KEY) not set in environment"))?;

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("LLM_TIMEOUT_SECS must be whole seconds, got {:?}", raw))?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };
        let temperature = match get("LLM_TEMPERATURE") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("LLM_TEMPERATURE must be a number, got {:?}", raw))?,
            None => DEFAULT_LLM_TEMPERATURE,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            llm: LlmConfig {
                api_key,
                base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                timeout_secs,
                temperature,
            },
            token: TokenConfig {
                api_key: get("LIVEKIT_API_KEY").unwrap_or_else(|| "devkey".to_string()),
                api_secret: get("LIVEKIT_API_SECRET").unwrap_or_else(|| "secret".to_string()),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
