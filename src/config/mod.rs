use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Smallest signing secret accepted outside development.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Pool acquire timeout in seconds
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Empty means every origin is allowed
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Environment {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.database = DatabaseConfig::from_lookup(environment, &lookup)?;
        config.with_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        // API overrides
        if let Some(port) = parse_var(lookup, "PORTFOLIO_API_PORT")? {
            self.api.port = port;
        } else if let Some(port) = parse_var(lookup, "PORT")? {
            self.api.port = port;
        }
        if let Some(v) = parse_var(lookup, "API_MAX_REQUEST_SIZE_BYTES")? {
            self.api.max_request_size_bytes = v;
        }

        // Security overrides
        self.security.jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if let Some(v) = parse_var(lookup, "SECURITY_JWT_EXPIRY_HOURS")? {
            self.security.jwt_expiry_hours = v;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.environment == Environment::Production
            && self.security.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET",
                reason: format!("must be at least {} bytes in production", MIN_PRODUCTION_SECRET_LEN),
            });
        }
        if self.security.jwt_expiry_hours == 0 || self.security.jwt_expiry_hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::Invalid {
                var: "SECURITY_JWT_EXPIRY_HOURS",
                reason: format!("must be between 1 and {}", MAX_JWT_EXPIRY_HOURS),
            });
        }
        // An empty list means any origin; production must name its origins.
        if self.environment == Environment::Production && self.security.cors_origins.is_empty() {
            return Err(ConfigError::Missing("SECURITY_CORS_ORIGINS"));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::preset(Environment::Development),
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig::preset(Environment::Staging),
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::preset(Environment::Production),
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }
}

impl DatabaseConfig {
    /// Database settings alone, for commands that never sign tokens (migrate, seed-admin).
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| env::var(key).ok();
        Self::from_lookup(Environment::from_lookup(&lookup), &lookup)
    }

    fn from_lookup(
        environment: Environment,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::preset(environment);
        config.url = resolve_database_url(lookup)?;
        if let Some(v) = parse_var(lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = v;
        }
        if let Some(v) = parse_var(lookup, "DATABASE_CONNECTION_TIMEOUT")? {
            config.connection_timeout = v;
        }
        Ok(config)
    }

    fn preset(environment: Environment) -> Self {
        let (max_connections, connection_timeout) = match environment {
            Environment::Development => (10, 30),
            Environment::Staging => (20, 10),
            Environment::Production => (50, 5),
        };
        Self {
            url: String::new(),
            max_connections,
            connection_timeout,
        }
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `POSTGRES_*` parts.
fn resolve_database_url(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        return Ok(url);
    }

    let user = lookup("POSTGRES_USER").ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let host = lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parse_var(lookup, "POSTGRES_PORT")?.unwrap_or(5432);
    let database = lookup("POSTGRES_DB").unwrap_or_else(|| "portfolio".to_string());

    let invalid = |reason: String| ConfigError::Invalid { var: "POSTGRES_HOST", reason };
    let mut url = url::Url::parse(&format!("postgres://{}:{}", host, port))
        .map_err(|e| invalid(e.to_string()))?;
    url.set_username(&user)
        .map_err(|_| invalid("cannot carry credentials".to_string()))?;
    if let Some(password) = lookup("POSTGRES_PASSWORD") {
        url.set_password(Some(&password))
            .map_err(|_| invalid("cannot carry credentials".to_string()))?;
    }
    url.set_path(&format!("/{}", database));
    Ok(url.into())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            }),
    }
}
