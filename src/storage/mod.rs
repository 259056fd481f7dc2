//! Storage Layer - relational persistence for contacts and templates
//!
//! Tables:
//! - contacts(id, name, email UNIQUE)
//! - templates(id, title, subject, body)
//!
//! [`StoreService`] is built once at startup from a [`StoreTarget`] and opens a
//! fresh session for every call. The session is released when the call
//! returns, whether it succeeded or not; nothing is shared between calls.

pub mod postgres;
pub mod query;
pub mod schema;
pub mod sqlite;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::model::{Contact, Entity, Template};
use crate::{Error, Result};

pub use postgres::PostgresSession;
pub use sqlite::SqliteSession;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Local SQLite database file.
    Sqlite(PathBuf),
    /// Remote Postgres server, as a `postgres://` connection string.
    Postgres(String),
}

impl StoreTarget {
    pub fn backend(&self) -> &'static str {
        match self {
            StoreTarget::Sqlite(_) => "sqlite",
            StoreTarget::Postgres(_) => "postgres",
        }
    }
}

impl fmt::Display for StoreTarget {
    /// Connection strings are shown without their password.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreTarget::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
            StoreTarget::Postgres(url) => f.write_str(&redact_password(url)),
        }
    }
}

fn redact_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

/// Process-wide store access; cheap to clone.
///
/// Clones share one SQLite write gate: a single file accepts one writer at a
/// time, so writes queue here instead of inside SQLite's busy handler.
#[derive(Debug, Clone)]
pub struct StoreService {
    target: StoreTarget,
    sqlite_writes: Arc<Mutex<()>>,
}

impl StoreService {
    pub fn new(target: StoreTarget) -> Self {
        Self { target, sqlite_writes: Arc::new(Mutex::new(())) }
    }

    pub fn target(&self) -> &StoreTarget {
        &self.target
    }

    /// Create both tables if absent. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<()> {
        tracing::debug!("Initializing schema on {}", self.target);
        match &self.target {
            StoreTarget::Sqlite(path) => {
                let _write = self.sqlite_writes.lock().await;
                with_sqlite(path, |s| s.initialize_schema()).await
            }
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = session.initialize_schema().await;
                session.close().await;
                result
            }
        }
    }

    /// Fail with [`Error::NotInitialized`] unless both tables exist.
    ///
    /// Never creates anything: a missing SQLite file is reported, not made.
    pub async fn check_initialized(&self) -> Result<()> {
        let ready = match &self.target {
            StoreTarget::Sqlite(path) => {
                if !path.exists() {
                    false
                } else {
                    with_sqlite(path, |s| {
                        Ok(s.has_table::<Contact>()? && s.has_table::<Template>()?)
                    })
                    .await?
                }
            }
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = async {
                    Ok::<_, Error>(
                        session.has_table::<Contact>().await? && session.has_table::<Template>().await?,
                    )
                }
                .await;
                session.close().await;
                result?
            }
        };
        if ready {
            Ok(())
        } else {
            Err(Error::NotInitialized(self.target.to_string()))
        }
    }

    pub async fn list_all<E: Entity>(&self) -> Result<Vec<E>> {
        match &self.target {
            StoreTarget::Sqlite(path) => with_sqlite(path, |s| s.list_all::<E>()).await,
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = session.list_all::<E>().await;
                session.close().await;
                result
            }
        }
    }

    /// Insert a row and return its newly assigned id.
    pub async fn insert<E: Entity>(&self, draft: E::Draft) -> Result<i64> {
        match &self.target {
            StoreTarget::Sqlite(path) => {
                let _write = self.sqlite_writes.lock().await;
                with_sqlite(path, move |s| s.insert::<E>(&draft)).await
            }
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = session.insert::<E>(&draft).await;
                session.close().await;
                result
            }
        }
    }

    /// Delete the row with `id`, returning how many rows were removed.
    /// A missing id is not an error.
    pub async fn delete_by_id<E: Entity>(&self, id: u64) -> Result<usize> {
        // Ids past i64::MAX were never assigned.
        let Ok(id) = i64::try_from(id) else {
            return Ok(0);
        };
        match &self.target {
            StoreTarget::Sqlite(path) => {
                let _write = self.sqlite_writes.lock().await;
                with_sqlite(path, move |s| s.delete_by_id::<E>(id)).await
            }
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = session.delete_by_id::<E>(id).await;
                session.close().await;
                result
            }
        }
    }

    pub async fn count<E: Entity>(&self) -> Result<usize> {
        match &self.target {
            StoreTarget::Sqlite(path) => with_sqlite(path, |s| s.count::<E>()).await,
            StoreTarget::Postgres(url) => {
                let mut session = PostgresSession::connect(url).await?;
                let result = session.count::<E>().await;
                session.close().await;
                result
            }
        }
    }
}

/// Run `op` against a fresh SQLite session on the blocking pool.
async fn with_sqlite<T, F>(path: &Path, op: F) -> Result<T>
where
    F: FnOnce(&SqliteSession) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let session = SqliteSession::open(&path)?;
        op(&session)
    })
    .await
    .map_err(|e| Error::Internal(format!("storage task failed: {}", e)))?
}
