use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4321";
pub const DEFAULT_JSON_LIMIT: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub json_limit: usize,
}

impl Config {
    /// Reads `BIND_ADDR`, `DATABASE_URL` and `JSON_LIMIT` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR '{}' is not a socket address", bind_addr))?;

        let json_limit = match lookup("JSON_LIMIT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("JSON_LIMIT '{}' is not a byte count", raw))?,
            None => DEFAULT_JSON_LIMIT,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Ok(Config {
            bind_addr,
            database_url,
            json_limit,
        })
    }
}
