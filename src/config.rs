use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: String, reason: String },
    #[error("Secret {0} is neither set in the environment nor mounted under /run/secrets")]
    MissingSecret(String),
}

/// Account created (or promoted) at start-up so the catalog can be managed.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub actor_buffer_size: usize,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let token_ttl_hours: u64 = try_load("TOKEN_TTL_HOURS", "168")?;
        let token_ttl = token_ttl_secs(token_ttl_hours)?;

        Ok(Self {
            port: try_load("PORT", "5000")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:3000")?,
            jwt_secret: read_secret("JWT_SECRET")?,
            token_ttl,
            actor_buffer_size: try_load("ACTOR_BUFFER_SIZE", "100")?,
            admin: load_admin_seed(),
        })
    }
}

fn token_ttl_secs(hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key: "TOKEN_TTL_HOURS".to_string(),
            reason: format!("{hours} hours is out of range"),
        })
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}

/// Environment first, then the docker secret file.
fn read_secret(secret_name: &str) -> Result<String, ConfigError> {
    if let Some(value) = var(secret_name) {
        return Ok(value);
    }

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            warn!("Failed to read {secret_name} from environment or {path}");
            ConfigError::MissingSecret(secret_name.to_string())
        })
}

fn load_admin_seed() -> Option<AdminSeed> {
    match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
        (Some(email), Some(password)) => Some(AdminSeed { email, password }),
        (Some(_), None) | (None, Some(_)) => {
            warn!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together, skipping admin seed");
            None
        }
        (None, None) => None,
    }
}
