use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
    pub max_body_size: usize,
    pub login_max_failures: u32,
    pub login_window_secs: u64,
    pub seed_user: Option<SeedUser>,
}

/// Account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("WEBTASK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_HOST: {e}"))?;

        let port: u16 = env_or("WEBTASK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_PORT: {e}"))?;

        let log_level = env_or("WEBTASK_LOG_LEVEL", "info");

        let session_ttl_hours: i64 = env_or("WEBTASK_SESSION_TTL_HOURS", "336")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_SESSION_TTL_HOURS: {e}"))?;
        if session_ttl_hours <= 0 {
            return Err("WEBTASK_SESSION_TTL_HOURS must be positive".to_string());
        }

        let secure_cookies =
            parse_bool("WEBTASK_SECURE_COOKIES", &env_or("WEBTASK_SECURE_COOKIES", "true"))?;

        let max_body_size: usize = env_or("WEBTASK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_MAX_BODY_SIZE: {e}"))?;

        let login_max_failures: u32 = env_or("WEBTASK_LOGIN_MAX_FAILURES", "5")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_LOGIN_MAX_FAILURES: {e}"))?;

        let login_window_secs: u64 = env_or("WEBTASK_LOGIN_WINDOW_SECS", "900")
            .parse()
            .map_err(|e| format!("Invalid WEBTASK_LOGIN_WINDOW_SECS: {e}"))?;

        let seed_user = match (
            std::env::var("WEBTASK_SEED_USERNAME").ok(),
            std::env::var("WEBTASK_SEED_EMAIL").ok(),
            std::env::var("WEBTASK_SEED_PASSWORD").ok(),
        ) {
            (Some(username), Some(email), Some(password)) => Some(SeedUser {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            log_level,
            session_ttl_hours,
            secure_cookies,
            max_body_size,
            login_max_failures,
            login_window_secs,
            seed_user,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {key}: expected a boolean, got '{other}'")),
    }
}
