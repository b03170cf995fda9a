//! Process configuration read from the environment at startup.

const DEFAULT_PORT: u16 = 3000;

/// Parse `key` from the environment, falling back to `default` when unset or
/// malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Settings `main` needs before anything else can start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing config: env var {0} not set")]
    Missing(&'static str),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_MISSING_CONFIG",
        }
    }
}

impl ServerConfig {
    /// Load `DATABASE_URL` (required) and `PORT` (default 3000).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        Ok(Self { database_url, port: env_parse("PORT", DEFAULT_PORT) })
    }
}
