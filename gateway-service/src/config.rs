use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use anyhow::{anyhow, Context, Result};
use common_audit::DEFAULT_QUEUE_CAPACITY;
use common_auth::{HashScheme, BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST};

pub const DEFAULT_ISSUER: &str = "role-gateway";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Clone)]
pub struct GatewayConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub audit_queue_capacity: usize,
    pub run_migrations: bool,
    /// Scheme and cost burned on a login lookup miss; should match most stored hashes.
    pub password_hash_scheme: HashScheme,
    pub bcrypt_cost: u32,
}

impl GatewayConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("db_max_connections", &self.db_max_connections)
            .field("audit_queue_capacity", &self.audit_queue_capacity)
            .field("run_migrations", &self.run_migrations)
            .field("password_hash_scheme", &self.password_hash_scheme)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

pub fn load_gateway_config() -> Result<GatewayConfig> {
    let database_url = required("DATABASE_URL")?;
    let jwt_secret = required("JWT_SECRET")?;

    let jwt_issuer = env::var("JWT_ISSUER")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| DEFAULT_ISSUER.to_string());

    let host: IpAddr = env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string())
        .trim()
        .parse()
        .context("Failed to parse HOST")?;
    let port = parse_env("PORT")?.unwrap_or(DEFAULT_PORT);

    let allowed_origins = allowed_origins(env::var("FRONTEND_URL").ok().as_deref());

    let db_max_connections = parse_env("DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
    if db_max_connections == 0 {
        return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
    }
    let audit_queue_capacity = parse_env("AUDIT_QUEUE_CAPACITY")?.unwrap_or(DEFAULT_QUEUE_CAPACITY);
    let run_migrations = bool_from_env("RUN_MIGRATIONS").unwrap_or(true);

    let password_hash_scheme =
        password_hash_scheme(env::var("PASSWORD_HASH_SCHEME").ok().as_deref())?;
    let bcrypt_cost = parse_env("BCRYPT_COST")?.unwrap_or(DEFAULT_BCRYPT_COST);
    if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
        return Err(anyhow!(
            "BCRYPT_COST must be between {} and {}",
            BCRYPT_COST_RANGE.start(),
            BCRYPT_COST_RANGE.end()
        ));
    }

    Ok(GatewayConfig {
        database_url,
        jwt_secret,
        jwt_issuer,
        host,
        port,
        allowed_origins,
        db_max_connections,
        audit_queue_capacity,
        run_migrations,
        password_hash_scheme,
        bcrypt_cost,
    })
}

fn password_hash_scheme(raw: Option<&str>) -> Result<HashScheme> {
    match raw.and_then(normalize_optional) {
        Some(value) => HashScheme::parse(&value)
            .ok_or_else(|| anyhow!("PASSWORD_HASH_SCHEME must be 'bcrypt' or 'argon2', got '{value}'")),
        None => Ok(HashScheme::Bcrypt),
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("{key} must be set"))
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key).ok().and_then(|value| normalize_optional(&value)) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Failed to parse {key}")),
        None => Ok(None),
    }
}

fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|origin| origin.to_string())
        .collect();
    if let Some(extra) = frontend_url.and_then(normalize_optional) {
        let extra = extra.trim_end_matches('/').to_string();
        if !origins.contains(&extra) {
            origins.push(extra);
        }
    }
    origins
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
