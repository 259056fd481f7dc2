//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use rusqlite::{Connection, params_from_iter};
use crate::model::{Draft, Entity};
use crate::{Error, Result};
use super::query::{self, Placeholder};
use super::schema;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// One connection to a SQLite file, closed when dropped.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::StorageUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create both tables and their indexes if absent.
    ///
    /// Also switches the file to WAL so list requests never wait on a writer.
    /// The journal mode is stored in the file and outlives this connection.
    pub fn initialize_schema(&self) -> Result<()> {
        let mode: String =
            self.conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!("SQLite journal mode: {}", mode);
        for stmt in schema::sqlite_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Whether `E`'s table exists
    pub fn has_table<E: Entity>(&self) -> Result<bool> {
        let found: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [E::TABLE],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }

    /// All rows of `E`'s table, in `E::ORDER_BY` order
    pub fn list_all<E: Entity>(&self) -> Result<Vec<E>> {
        let mut stmt = self.conn.prepare(&query::select_all::<E>())?;
        let width = E::COLUMNS.len();

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let values = (1..=width)
                .map(|i| row.get::<_, String>(i))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok((id, values))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, values) = row?;
            records.push(E::from_columns(id, values)?);
        }
        Ok(records)
    }

    /// Insert a row and return its newly assigned id
    pub fn insert<E: Entity>(&self, draft: &E::Draft) -> Result<i64> {
        self.conn.execute(
            &query::insert::<E>(Placeholder::Numbered),
            params_from_iter(draft.values()),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete the row with `id`; returns how many rows were removed (0 or 1)
    pub fn delete_by_id<E: Entity>(&self, id: i64) -> Result<usize> {
        let removed = self
            .conn
            .execute(&query::delete_by_id::<E>(Placeholder::Numbered), [id])?;
        Ok(removed)
    }

    /// Count rows in `E`'s table
    pub fn count<E: Entity>(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(&query::count::<E>(), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, NewContact, NewTemplate, Template};
    use tempfile::tempdir;

    fn session() -> SqliteSession {
        let session = SqliteSession::open_in_memory().unwrap();
        session.initialize_schema().unwrap();
        session
    }

    #[test]
    fn test_contact_crud() {
        let store = session();

        let id = store.insert::<Contact>(&NewContact::new("Ada", "ada@example.com")).unwrap();
        let contacts = store.list_all::<Contact>().unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, id);
        assert_eq!(contacts[0].name, "Ada");
        assert_eq!(contacts[0].email, "ada@example.com");

        assert_eq!(store.delete_by_id::<Contact>(id).unwrap(), 1);
        assert_eq!(store.count::<Contact>().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_email_is_constraint_violation() {
        let store = session();

        store.insert::<Contact>(&NewContact::new("Ada", "ada@example.com")).unwrap();
        let err = store
            .insert::<Contact>(&NewContact::new("Another Ada", "ada@example.com"))
            .unwrap_err();

        assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
        assert_eq!(store.count::<Contact>().unwrap(), 1);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let store = session();
        store.insert::<Contact>(&NewContact::new("Ada", "ada@example.com")).unwrap();

        assert_eq!(store.delete_by_id::<Contact>(999).unwrap(), 0);
        assert_eq!(store.count::<Contact>().unwrap(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = session();

        let first = store.insert::<Contact>(&NewContact::new("Ada", "ada@example.com")).unwrap();
        store.delete_by_id::<Contact>(first).unwrap();
        let second = store.insert::<Contact>(&NewContact::new("Ada", "ada@example.com")).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_templates_sorted_by_title() {
        let store = session();
        store.insert::<Template>(&NewTemplate::new("Reminder", "Don't forget", "...")).unwrap();
        store.insert::<Template>(&NewTemplate::new("Apology", "Sorry", "...")).unwrap();
        store.insert::<Template>(&NewTemplate::new("Follow up", "Checking in", "...")).unwrap();

        let titles: Vec<String> = store
            .list_all::<Template>()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Apology", "Follow up", "Reminder"]);
    }

    #[test]
    fn test_has_table_before_and_after_init() {
        let store = SqliteSession::open_in_memory().unwrap();
        assert!(!store.has_table::<Contact>().unwrap());

        store.initialize_schema().unwrap();
        assert!(store.has_table::<Contact>().unwrap());
        assert!(store.has_table::<Template>().unwrap());
    }

    #[test]
    fn test_titles_sort_bytewise() {
        let store = session();
        for title in ["apple", "Banana", "cherry"] {
            store.insert::<Template>(&NewTemplate::new(title, "s", "b")).unwrap();
        }

        let titles: Vec<String> = store
            .list_all::<Template>()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Banana", "apple", "cherry"]);
    }

    #[test]
    fn test_init_switches_file_to_wal() {
        let dir = tempdir().unwrap();
        let store = SqliteSession::open(&dir.path().join("data.db")).unwrap();
        store.initialize_schema().unwrap();

        let mode: String = store
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_schema_init_is_idempotent_and_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.db");

        let store = SqliteSession::open(&path).unwrap();
        store.initialize_schema().unwrap();
        store.insert::<Template>(&NewTemplate::new("Welcome", "Hi", "Hello!")).unwrap();
        drop(store);

        let reopened = SqliteSession::open(&path).unwrap();
        reopened.initialize_schema().unwrap();
        reopened.initialize_schema().unwrap();
        assert_eq!(reopened.count::<Template>().unwrap(), 1);
    }

    #[test]
    fn test_open_in_missing_directory_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("data.db");

        match SqliteSession::open(&path) {
            Err(Error::StorageUnavailable(_)) => {}
            Err(other) => panic!("expected StorageUnavailable, got {other:?}"),
            Ok(_) => panic!("expected open to fail"),
        }
    }
}
