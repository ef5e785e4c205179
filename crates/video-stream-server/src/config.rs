//! Configuration loading and resolution.
//!
//! Settings come from an optional TOML file, environment variables (a `.env`
//! file is loaded first by `main`) and command-line flags.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Port used when neither `PORT` nor a bind address is configured.
pub const DEFAULT_PORT: u16 = 8000;
/// Default JSON request body limit in bytes.
pub const DEFAULT_JSON_LIMIT: usize = 256 * 1024;

pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGIN: &str = "ALLOWED_ORIGIN";
pub const ENV_DATABASE_URI: &str = "DATABASE_URI";

/// Top-level server configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Bind address (host:port).
    pub bind: Option<String>,
    /// Origin(s) allowed to make credentialed cross-origin requests,
    /// comma separated.
    pub allowed_origin: Option<String>,
    /// Database location prefix; the database name is appended to it.
    pub database_uri: Option<String>,
    /// Maximum accepted JSON body size in bytes.
    pub json_limit: Option<usize>,
}

/// Effective settings after merging file, environment and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub database_uri: String,
    pub json_limit: usize,
}

impl ServerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Merge config, environment and the `--bind` flag.
///
/// Precedence: `--bind`, then `PORT` applied to the configured host, then the
/// TOML `bind`, then `0.0.0.0:8000`. Environment values win over TOML for the
/// origin and database settings.
pub fn resolve<E>(cfg: &ServerConfig, bind_flag: Option<SocketAddr>, env: E) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    let bind = match bind_flag {
        Some(addr) => addr,
        None => {
            let mut addr = bind_from_config(cfg)?
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
            if let Some(port) = port_from_env(&env)? {
                addr.set_port(port);
            }
            addr
        }
    };

    let allowed_origins = allowed_origins(
        non_empty(env(ENV_ALLOWED_ORIGIN)).or_else(|| cfg.allowed_origin.clone()),
    );
    let database_uri = non_empty(env(ENV_DATABASE_URI))
        .or_else(|| non_empty(cfg.database_uri.clone()))
        .ok_or_else(|| {
            anyhow::anyhow!("{ENV_DATABASE_URI} is required (environment or database_uri in config)")
        })?;

    Ok(Settings {
        bind,
        allowed_origins,
        database_uri,
        json_limit: cfg.json_limit.unwrap_or(DEFAULT_JSON_LIMIT),
    })
}

/// Parse an optional bind address from config.
pub fn bind_from_config(cfg: &ServerConfig) -> Result<Option<SocketAddr>> {
    let Some(bind) = cfg.bind.as_deref() else {
        return Ok(None);
    };
    let addr = bind.parse().with_context(|| format!("parse bind {bind}"))?;
    Ok(Some(addr))
}

fn port_from_env<E>(env: &E) -> Result<Option<u16>>
where
    E: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(env(ENV_PORT)) else {
        return Ok(None);
    };
    let port = raw
        .trim()
        .parse()
        .with_context(|| format!("parse {ENV_PORT} {raw}"))?;
    Ok(Some(port))
}

/// Split a comma separated origin list, dropping blanks and trailing slashes.
pub fn allowed_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
