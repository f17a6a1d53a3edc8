//! Runtime configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::app::body::{BodyLimits, DEFAULT_MAX_BODY_BYTES, DEFAULT_READ_TIMEOUT};

pub const ENV_BIND_ADDR: &str = "SHOPLIST_BIND_ADDR";
pub const ENV_MAX_BODY_BYTES: &str = "SHOPLIST_MAX_BODY_BYTES";
pub const ENV_BODY_READ_TIMEOUT_MS: &str = "SHOPLIST_BODY_READ_TIMEOUT_MS";

pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub body_read_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Load from process environment variables.
    ///
    /// Missing variables use defaults; unparseable ones log a warning and use
    /// defaults too, so a typo never prevents startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_ms = parse_or(
            &lookup,
            ENV_BODY_READ_TIMEOUT_MS,
            defaults.body_read_timeout.as_millis() as u64,
        );

        Self {
            bind_addr: parse_or(&lookup, ENV_BIND_ADDR, defaults.bind_addr),
            max_body_bytes: parse_or(&lookup, ENV_MAX_BODY_BYTES, defaults.max_body_bytes),
            body_read_timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn body_limits(&self) -> BodyLimits {
        BodyLimits {
            max_bytes: self.max_body_bytes,
            read_timeout: self.body_read_timeout,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(key, value = %raw, "invalid config value; using default");
            default
        }
    }
}
