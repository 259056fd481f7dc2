use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use crate::storage::StoreTarget;

pub const DEFAULT_DATABASE: &str = "data.db";
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ContactbookConfig {
    /// SQLite database file.
    pub database: Option<String>,
    /// Postgres connection string; takes precedence over `database`.
    pub database_url: Option<String>,
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
}

impl ContactbookConfig {
    /// Settings written by `init-config`.
    pub fn with_defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            database_url: None,
            host: Some(DEFAULT_HOST),
            port: Some(DEFAULT_PORT),
        }
    }
}

/// Store selection from the command line; unset fields fall back to the config file.
#[derive(Debug, Clone, Default)]
pub struct StoreArgs {
    pub database: Option<PathBuf>,
    pub database_url: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("contactbook.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ContactbookConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ContactbookConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ContactbookConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the store: CLI flags first, then the config file, then `data.db`.
/// Any connection string selects the remote backend.
pub fn resolve_store_target(args: &StoreArgs, config: Option<&ContactbookConfig>) -> StoreTarget {
    if let Some(url) = &args.database_url {
        return StoreTarget::Postgres(url.clone());
    }
    if let Some(path) = &args.database {
        return StoreTarget::Sqlite(path.clone());
    }
    if let Some(url) = config.and_then(|c| c.database_url.as_ref()) {
        return StoreTarget::Postgres(url.clone());
    }
    let database = config
        .and_then(|c| c.database.as_deref())
        .unwrap_or(DEFAULT_DATABASE);
    StoreTarget::Sqlite(PathBuf::from(database))
}

pub fn resolve_listen_addr(
    host: Option<IpAddr>,
    port: Option<u16>,
    config: Option<&ContactbookConfig>,
) -> SocketAddr {
    let host = host
        .or_else(|| config.and_then(|c| c.host))
        .unwrap_or(DEFAULT_HOST);
    let port = port
        .or_else(|| config.and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);
    SocketAddr::new(host, port)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
