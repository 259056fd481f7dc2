//! Contact and template records
//!
//! Each entity declares its table, its text columns and its list order once;
//! the storage layer derives every statement from that declaration.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// A table-backed resource with a fixed set of text columns after `id`.
pub trait Entity: Serialize + Send + Sized + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Text columns after `id`, in select and insert order.
    const COLUMNS: &'static [&'static str];
    /// `ORDER BY` clause used when listing.
    const ORDER_BY: &'static str;

    /// Field values accepted on creation.
    type Draft: Draft;

    /// Build a record from its id and its `COLUMNS` values, in order.
    fn from_columns(id: i64, values: Vec<String>) -> Result<Self>;
}

/// The values of a record that does not have an id yet.
pub trait Draft: Send + Sync + 'static {
    /// Values in the owning entity's `COLUMNS` order.
    fn values(&self) -> Vec<&str>;
}

fn take_columns<const N: usize>(table: &'static str, values: Vec<String>) -> Result<[String; N]> {
    let found = values.len();
    values.try_into().map_err(|_| Error::InvalidRow {
        table,
        reason: format!("expected {} columns, found {}", N, found),
    })
}

/// Reject absent and blank values; accepted values are kept verbatim.
fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        None => Err(Error::BadRequest(format!("missing required field `{}`", field))),
        Some(v) if v.trim().is_empty() => {
            Err(Error::BadRequest(format!("field `{}` must not be empty", field)))
        }
        Some(v) => Ok(v),
    }
}

// ========== Contacts ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

/// Request body for contact creation; every field is optional so a missing
/// one is reported as a bad request rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<ContactPayload> for NewContact {
    type Error = Error;

    fn try_from(payload: ContactPayload) -> Result<Self> {
        Ok(Self {
            name: required("name", payload.name)?,
            email: required("email", payload.email)?,
        })
    }
}

impl Draft for NewContact {
    fn values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

impl Entity for Contact {
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static [&'static str] = &["name", "email"];
    const ORDER_BY: &'static str = "id";

    type Draft = NewContact;

    fn from_columns(id: i64, values: Vec<String>) -> Result<Self> {
        let [name, email] = take_columns(Self::TABLE, values)?;
        Ok(Self { id, name, email })
    }
}

// ========== Templates ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub title: String,
    pub subject: String,
    pub body: String,
}

impl NewTemplate {
    pub fn new(title: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), subject: subject.into(), body: body.into() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplatePayload {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl TryFrom<TemplatePayload> for NewTemplate {
    type Error = Error;

    fn try_from(payload: TemplatePayload) -> Result<Self> {
        Ok(Self {
            title: required("title", payload.title)?,
            subject: required("subject", payload.subject)?,
            body: required("body", payload.body)?,
        })
    }
}

impl Draft for NewTemplate {
    fn values(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.subject.as_str(), self.body.as_str()]
    }
}

impl Entity for Template {
    const TABLE: &'static str = "templates";
    const COLUMNS: &'static [&'static str] = &["title", "subject", "body"];
    // Sorted by title on every backend; id breaks ties.
    const ORDER_BY: &'static str = "title ASC, id ASC";

    type Draft = NewTemplate;

    fn from_columns(id: i64, values: Vec<String>) -> Result<Self> {
        let [title, subject, body] = take_columns(Self::TABLE, values)?;
        Ok(Self { id, title, subject, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_payload_requires_both_fields() {
        let payload: ContactPayload = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        let err = NewContact::try_from(payload).unwrap_err();
        match err {
            Error::BadRequest(msg) => assert!(msg.contains("email")),
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let payload = TemplatePayload {
            title: Some("Welcome".into()),
            subject: Some("   ".into()),
            body: Some("Hello!".into()),
        };
        assert!(matches!(NewTemplate::try_from(payload), Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_values_are_kept_verbatim() {
        let payload: ContactPayload =
            serde_json::from_str(r#"{"name": "  Ada Lovelace ", "email": "ADA@Example.com"}"#).unwrap();
        let draft = NewContact::try_from(payload).unwrap();
        assert_eq!(draft.values(), vec!["  Ada Lovelace ", "ADA@Example.com"]);
    }

    #[test]
    fn test_from_columns_checks_arity() {
        let err = Template::from_columns(1, vec!["only title".into()]).unwrap_err();
        assert!(matches!(err, Error::InvalidRow { table: "templates", .. }));

        let contact = Contact::from_columns(7, vec!["Ada".into(), "ada@example.com".into()]).unwrap();
        assert_eq!(contact, Contact { id: 7, name: "Ada".into(), email: "ada@example.com".into() });
    }

    #[test]
    fn test_template_serializes_to_api_keys() {
        let template = Template {
            id: 3,
            title: "Welcome".into(),
            subject: "Hi".into(),
            body: "Hello!".into(),
        };
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 3, "title": "Welcome", "subject": "Hi", "body": "Hello!"})
        );
    }
}
