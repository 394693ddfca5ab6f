use crate::auth::jwt::JwtConfig;

/// Default OpenAI-compatible chat completions endpoint.
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Upstream language-model settings for the AI proxy.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer key for the upstream API. `None` makes every proxy call a 400.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    /// Hard timeout for one upstream request.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_LLM_API_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    /// | Env Var            | Default                                      |
    /// |--------------------|----------------------------------------------|
    /// | `LLM_API_KEY`      | unset                                        |
    /// | `LLM_API_URL`      | `https://api.openai.com/v1/chat/completions` |
    /// | `LLM_MODEL`        | `gpt-4o-mini`                                |
    /// | `LLM_TEMPERATURE`  | `0.3`                                        |
    /// | `LLM_TIMEOUT_SECS` | `30`                                         |
    pub fn from_env() -> Self {
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let api_url =
            std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_LLM_API_URL.into());

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.into());

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| DEFAULT_LLM_TEMPERATURE.to_string())
            .parse()
            .expect("LLM_TEMPERATURE must be a valid f32");

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_LLM_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            api_url,
            model,
            temperature,
            timeout_secs,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins from comma-separated `CORS_ORIGINS`. `*` allows
    /// any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`). Must exceed the
    /// upstream LLM timeout so upstream timeouts surface as 500s.
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `CORS_ORIGINS`         | `*`       |
    /// | `REQUEST_TIMEOUT_SECS` | `60`      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            llm: LlmConfig::from_env(),
        }
    }

    /// Whether CORS should accept any origin.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
