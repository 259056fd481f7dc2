//! Statement text derived from an entity's declared table and columns.
//!
//! Only identifiers from `Entity` constants are spliced into the SQL; every
//! value travels as a bound parameter.

use crate::model::Entity;

/// Bind-parameter syntax of the target backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?1, ?2, ...` (SQLite)
    Numbered,
    /// `$1, $2, ...` (Postgres)
    Dollar,
}

impl Placeholder {
    fn nth(self, n: usize) -> String {
        match self {
            Placeholder::Numbered => format!("?{}", n),
            Placeholder::Dollar => format!("${}", n),
        }
    }
}

pub fn select_all<E: Entity>() -> String {
    format!(
        "SELECT id, {} FROM {} ORDER BY {}",
        E::COLUMNS.join(", "),
        E::TABLE,
        E::ORDER_BY
    )
}

pub fn insert<E: Entity>(style: Placeholder) -> String {
    let params: Vec<String> = (1..=E::COLUMNS.len()).map(|n| style.nth(n)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        params.join(", ")
    )
}

pub fn delete_by_id<E: Entity>(style: Placeholder) -> String {
    format!("DELETE FROM {} WHERE id = {}", E::TABLE, style.nth(1))
}

pub fn count<E: Entity>() -> String {
    format!("SELECT COUNT(*) FROM {}", E::TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, Template};

    #[test]
    fn test_sqlite_statements() {
        assert_eq!(
            insert::<Contact>(Placeholder::Numbered),
            "INSERT INTO contacts (name, email) VALUES (?1, ?2)"
        );
        assert_eq!(
            delete_by_id::<Contact>(Placeholder::Numbered),
            "DELETE FROM contacts WHERE id = ?1"
        );
    }

    #[test]
    fn test_postgres_statements() {
        assert_eq!(
            insert::<Template>(Placeholder::Dollar),
            "INSERT INTO templates (title, subject, body) VALUES ($1, $2, $3)"
        );
        assert_eq!(
            select_all::<Template>(),
            "SELECT id, title, subject, body FROM templates ORDER BY title ASC, id ASC"
        );
    }
}
