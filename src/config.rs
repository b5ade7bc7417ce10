use std::env;
use std::net::SocketAddr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("PORT must be a TCP port number, got '{0}'")]
    InvalidPort(String),
    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),
}

/// Process configuration, read once at startup.
///
/// | Env Var         | Default   |
/// |-----------------|-----------|
/// | `DATABASE_URL`  | unset     |
/// | `DATABASE_NAME` | unset     |
/// | `HOST`          | `0.0.0.0` |
/// | `PORT`          | `8000`    |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            database_url: var("DATABASE_URL"),
            database_name: var("DATABASE_NAME"),
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn is_database_url_set(&self) -> bool {
        self.database_url.is_some()
    }

    pub fn is_database_name_set(&self) -> bool {
        self.database_name.is_some()
    }

    /// Both database settings, or the first one missing.
    pub fn database(&self) -> Result<(&str, &str), ConfigError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let name = self
            .database_name
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_NAME"))?;
        Ok((url, name))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddr(addr))
    }
}
