//! Process configuration read from the environment.
//!
//! # Responsibility
//! - Resolve store path, bind address, static asset dir and logging options.
//! - Reject malformed values before any I/O starts.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use todo_core::default_log_level;

pub const JSON_PATH_VAR: &str = "BASE_JSON_PATH";
pub const BIND_ADDR_VAR: &str = "TODO_BIND_ADDR";
pub const STATIC_DIR_VAR: &str = "TODO_STATIC_DIR";
pub const LOG_LEVEL_VAR: &str = "TODO_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TODO_LOG_DIR";

const DEFAULT_JSON_PATH: &str = "todos.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but blank.
    Empty(&'static str),
    InvalidBindAddr(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(var) => write!(f, "{var} must not be empty when set"),
            Self::InvalidBindAddr(raw) => {
                write!(f, "{BIND_ADDR_VAR} is not a socket address: `{raw}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Location of the persisted JSON document.
    pub json_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Directory holding `index.html` and assets served under `/content`.
    pub static_dir: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
                Some(value) => Ok(Some(value.trim().to_string())),
                None => Ok(None),
            }
        };

        let json_path = read(JSON_PATH_VAR)?.unwrap_or_else(|| DEFAULT_JSON_PATH.to_string());
        let raw_addr = read(BIND_ADDR_VAR)?.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;
        let static_dir = read(STATIC_DIR_VAR)?.unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());
        let log_level = read(LOG_LEVEL_VAR)?.unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(LOG_DIR_VAR)?;

        Ok(Self {
            json_path: PathBuf::from(json_path),
            bind_addr,
            static_dir: PathBuf::from(static_dir),
            log_level,
            log_dir,
        })
    }
}
