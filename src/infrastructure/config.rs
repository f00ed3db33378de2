use anyhow::{Context, Result, bail};
use std::env;

const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Process configuration, read once at startup. The signing secret has no
/// baked-in default: a process without `JWT_SECRET` refuses to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let token_ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid TOKEN_TTL_SECS: {:?}", raw))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT: {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            jwt_secret,
            token_ttl_secs,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }
}
