//! Server configuration.
//!
//! Values come from the environment once at startup. Tests build a config
//! directly with the `with_*` setters.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ServerError};

const ENV_ADDR: &str = "QUIZ_ADDR";
const ENV_SECRET: &str = "QUIZ_SECRET";
const ENV_ACTIVITY_LOG: &str = "QUIZ_ACTIVITY_LOG";
const ENV_SESSION_TTL: &str = "QUIZ_SESSION_TTL_SECS";
const ENV_COOKIE_SECURE: &str = "QUIZ_COOKIE_SECURE";

/// Runtime configuration for the quiz server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:3000)
    pub addr: String,
    /// Secret mixed into question tokens
    pub secret: String,
    /// Append-only activity log file
    pub activity_log: PathBuf,
    /// Idle sessions older than this are dropped; `None` keeps them forever
    pub session_ttl: Option<Duration>,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            secret: "quiz_secret".to_string(),
            activity_log: PathBuf::from("logs/quiz_activity.log"),
            session_ttl: Some(Duration::from_secs(24 * 60 * 60)),
            cookie_secure: false,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_ADDR) {
            config.addr = addr;
        }
        if let Some(secret) = lookup(ENV_SECRET) {
            if secret.is_empty() {
                return Err(ServerError::config(ENV_SECRET, "must not be empty"));
            }
            config.secret = secret;
        }
        if let Some(path) = lookup(ENV_ACTIVITY_LOG) {
            config.activity_log = PathBuf::from(path);
        }
        if let Some(ttl) = lookup(ENV_SESSION_TTL) {
            let secs: u64 = ttl
                .trim()
                .parse()
                .map_err(|e| ServerError::config(ENV_SESSION_TTL, format!("{}", e)))?;
            config.session_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secure) = lookup(ENV_COOKIE_SECURE) {
            config.cookie_secure = parse_flag(&secure)
                .ok_or_else(|| ServerError::config(ENV_COOKIE_SECURE, "expected 1/0 or true/false"))?;
        }

        Ok(config)
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn with_activity_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.activity_log = path.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
