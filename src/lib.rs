//! # Contactbook - contact and email-template backend
//!
//! Two resource collections (contacts, templates) exposed as a small JSON
//! HTTP API backed by a relational table each.
//!
//! Contactbook provides:
//! - A schema initializer that creates both tables if absent
//! - A store service that opens one session per call against a local SQLite
//!   file or a remote Postgres server
//! - axum resource handlers mapping list / create / delete onto single
//!   parameterized statements

pub mod config;
pub mod model;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use model::{Contact, Entity, NewContact, NewTemplate, Template};
pub use storage::{StoreService, StoreTarget};

/// Result type alias for Contactbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Contactbook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required request field is missing or malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A uniqueness or not-null constraint was rejected by the store.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store could not be reached or opened.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The store is reachable but its tables have not been created.
    #[error("Store {0} is not initialized; run `contactbook init-db` first")]
    NotInitialized(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("Postgres error: {0}")]
    Postgres(#[source] sqlx::Error),

    /// A row did not have the shape its entity declares.
    #[error("Invalid row in {table}: {reason}")]
    InvalidRow { table: &'static str, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::BadRequest(_) | Error::ConstraintViolation(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            match failure.code {
                rusqlite::ErrorCode::ConstraintViolation => {
                    let message = message.clone().unwrap_or_else(|| err.to_string());
                    return Error::ConstraintViolation(message);
                }
                rusqlite::ErrorCode::CannotOpen
                | rusqlite::ErrorCode::NotADatabase
                | rusqlite::ErrorCode::PermissionDenied => {
                    return Error::StorageUnavailable(err.to_string());
                }
                _ => {}
            }
        }
        Error::Sqlite(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            use sqlx::error::ErrorKind;
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
                    | ErrorKind::ForeignKeyViolation
            ) {
                return Error::ConstraintViolation(db.message().to_string());
            }
        }
        if matches!(
            err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Configuration(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
        ) {
            return Error::StorageUnavailable(err.to_string());
        }
        Error::Postgres(err)
    }
}
