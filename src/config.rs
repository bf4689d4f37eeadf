use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::utils::credit_metrics::{AVERAGE_CREDIT, REVENUE_RATE};

pub const DEFAULT_ZONE_API_URL: &str =
    "https://api-lrp-dashboard-test-eus.azurewebsites.net/api/v1/taxCredits/GetEmpowermentZone";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,

    // Session auth
    pub auth_username: String,
    pub auth_password: String,
    pub session_secret: String,
    pub session_ttl: i64,
    pub secure_cookies: bool,

    pub zone_api_url: String,

    // Credit projection
    pub average_credit: f64,
    pub revenue_rate: f64,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let auth_username = required("AUTH_USERNAME")?;
        let auth_password = required("AUTH_PASSWORD")?;
        let session_secret =
            env::var("SESSION_SECRET").unwrap_or_else(|_| auth_password.clone());

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: database_url_from_env()?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,

            auth_username,
            auth_password,
            session_secret,
            session_ttl: parsed("SESSION_TTL", 60 * 60 * 8)?, // 8 hours
            secure_cookies: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),

            zone_api_url: env::var("ZONE_API_URL")
                .unwrap_or_else(|_| DEFAULT_ZONE_API_URL.to_string()),

            average_credit: parsed("AVERAGE_CREDIT", AVERAGE_CREDIT)?,
            revenue_rate: parsed("REVENUE_RATE", REVENUE_RATE)?,

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(anyhow!("{key} must be set")),
    }
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
fn database_url_from_env() -> Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = required("DB_HOST").context("set DATABASE_URL or DB_HOST/DB_USER/DB_NAME")?;
    let port: u16 = parsed("DB_PORT", 3306)?;
    let user = required("DB_USER")?;
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = required("DB_NAME")?;

    Ok(mysql_url(&host, port, &user, &password, &name))
}

fn mysql_url(host: &str, port: u16, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("mysql://{user}@{host}:{port}/{name}")
    } else {
        format!("mysql://{user}:{password}@{host}:{port}/{name}")
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the environment.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "mysql://wotc@127.0.0.1:1/wotc".to_string(),
            db_max_connections: 1,
            auth_username: "admin".to_string(),
            auth_password: "s3cret".to_string(),
            session_secret: "s3cret".to_string(),
            session_ttl: 60 * 60 * 8,
            secure_cookies: false,
            zone_api_url: DEFAULT_ZONE_API_URL.to_string(),
            average_credit: AVERAGE_CREDIT,
            revenue_rate: REVENUE_RATE,
            rate_login_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}
