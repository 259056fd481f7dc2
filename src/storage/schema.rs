//! Database schema definitions
//!
//! Every statement is `IF NOT EXISTS`, so running the full set again is a
//! no-op and never drops or alters existing tables.

/// SQL to create the contacts table (SQLite)
pub const CREATE_CONTACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the templates table (SQLite)
pub const CREATE_TEMPLATES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    subject TEXT NOT NULL,
    body TEXT NOT NULL
)
"#;

/// SQL to create the contacts table (Postgres)
pub const PG_CREATE_CONTACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the templates table (Postgres)
///
/// `title` uses the "C" collation so listings sort bytewise, as SQLite's
/// default BINARY collation does.
pub const PG_CREATE_TEMPLATES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id BIGSERIAL PRIMARY KEY,
    title TEXT COLLATE "C" NOT NULL,
    subject TEXT NOT NULL,
    body TEXT NOT NULL
)
"#;

/// SQL to create indexes (shared by both backends)
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_templates_title ON templates(title)",
];

/// Advisory lock key held while the Postgres schema is created.
pub const PG_SCHEMA_LOCK_KEY: i64 = 0x636f_6e74_6163_7473;

/// All schema creation statements for SQLite
pub fn sqlite_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_CONTACTS_TABLE, CREATE_TEMPLATES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// All schema creation statements for Postgres
pub fn postgres_statements() -> Vec<&'static str> {
    let mut stmts = vec![PG_CREATE_CONTACTS_TABLE, PG_CREATE_TEMPLATES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent_creates() {
        for stmt in sqlite_statements().into_iter().chain(postgres_statements()) {
            assert!(stmt.contains("IF NOT EXISTS"), "not idempotent: {}", stmt);
            assert!(!stmt.to_uppercase().contains("DROP"));
        }
    }

    #[test]
    fn test_postgres_titles_use_bytewise_collation() {
        assert!(PG_CREATE_TEMPLATES_TABLE.contains(r#"title TEXT COLLATE "C" NOT NULL"#));
        assert!(!CREATE_TEMPLATES_TABLE.contains("COLLATE"));
    }
}
