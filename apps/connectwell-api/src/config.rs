/// ConnectWell API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When unset the in-memory store is used.
    pub database_url: Option<String>,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// API key for the Generative Language API. When unset the AI gateways
    /// report themselves as unconfigured.
    pub gemini_api_key: Option<String>,
    /// Base URL of the Generative Language API.
    pub gemini_api_base: String,
    /// Model used for text moderation.
    pub moderation_model: String,
    /// Image-capable model used for community icons.
    pub image_model: String,
    /// Request timeout for AI calls, in seconds.
    pub ai_timeout_secs: u64,
    /// Lifetime of a login session, in seconds.
    pub session_ttl_secs: u64,
}

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database_url: optional_var("DATABASE_URL"),
            port: parsed_var("PORT").unwrap_or(4010),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_api_base: optional_var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            moderation_model: optional_var("MODERATION_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            image_model: optional_var("IMAGE_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash-exp".to_string()),
            ai_timeout_secs: parsed_var("AI_TIMEOUT_SECS").unwrap_or(60),
            session_ttl_secs: parsed_var("SESSION_TTL_SECS").unwrap_or(7 * 24 * 3600),
        }
    }

    /// Configuration for tests and local demos: in-memory store, no AI key.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            port: 0,
            gemini_api_key: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            moderation_model: "gemini-2.0-flash".to_string(),
            image_model: "gemini-2.0-flash-exp".to_string(),
            ai_timeout_secs: 5,
            session_ttl_secs: 3600,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
