//! Postgres storage implementation

use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};
use crate::model::{Draft, Entity};
use crate::{Error, Result};
use super::query::{self, Placeholder};
use super::schema;

/// One connection to a Postgres server, closed by [`PostgresSession::close`].
pub struct PostgresSession {
    conn: PgConnection,
}

impl PostgresSession {
    /// Connect using a `postgres://` connection string
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = PgConnection::connect(url)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("cannot connect to postgres: {}", e)))?;
        Ok(Self { conn })
    }

    /// Create both tables and their indexes if absent.
    ///
    /// Runs in one transaction holding an advisory lock, so concurrent
    /// initializers wait for each other instead of racing on the catalog.
    pub async fn initialize_schema(&mut self) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(schema::PG_SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        for stmt in schema::postgres_statements() {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Whether `E`'s table is visible on the search path
    pub async fn has_table<E: Entity>(&mut self) -> Result<bool> {
        let found: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(E::TABLE)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(found)
    }

    pub async fn list_all<E: Entity>(&mut self) -> Result<Vec<E>> {
        let sql = query::select_all::<E>();
        let rows = sqlx::query(&sql).fetch_all(&mut self.conn).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get(0)?;
            let values = (1..=E::COLUMNS.len())
                .map(|i| row.try_get::<String, _>(i))
                .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;
            records.push(E::from_columns(id, values)?);
        }
        Ok(records)
    }

    pub async fn insert<E: Entity>(&mut self, draft: &E::Draft) -> Result<i64> {
        let sql = format!("{} RETURNING id", query::insert::<E>(Placeholder::Dollar));
        let mut statement = sqlx::query_scalar::<sqlx::Postgres, i64>(&sql);
        for value in draft.values() {
            statement = statement.bind(value);
        }
        let id = statement.fetch_one(&mut self.conn).await?;
        Ok(id)
    }

    pub async fn delete_by_id<E: Entity>(&mut self, id: i64) -> Result<usize> {
        let sql = query::delete_by_id::<E>(Placeholder::Dollar);
        let done = sqlx::query(&sql).bind(id).execute(&mut self.conn).await?;
        Ok(done.rows_affected() as usize)
    }

    pub async fn count<E: Entity>(&mut self) -> Result<usize> {
        let sql = query::count::<E>();
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut self.conn).await?;
        Ok(count as usize)
    }

    /// Close the connection; a failed goodbye is only logged.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            tracing::warn!("Failed to close postgres connection cleanly: {}", e);
        }
    }
}
