use tabled::{settings::Style, Table, Tabled};
use crate::model::{Contact, Template};

/// Longest template body shown in a listing before it is cut.
const BODY_PREVIEW_CHARS: usize = 40;

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Rows")]
    pub rows: usize,
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Body")]
    body: String,
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Single line, at most `max` characters, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}…", cut)
}

pub fn stats_table(stats: &[(&str, usize)]) -> String {
    let rows: Vec<StatRow> = stats
        .iter()
        .map(|(table, rows)| StatRow { table: table.to_string(), rows: *rows })
        .collect();
    render(&rows)
}

pub fn contacts_table(contacts: &[Contact]) -> String {
    let rows: Vec<ContactRow> = contacts
        .iter()
        .map(|c| ContactRow { id: c.id, name: c.name.clone(), email: c.email.clone() })
        .collect();
    render(&rows)
}

pub fn templates_table(templates: &[Template]) -> String {
    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            id: t.id,
            title: t.title.clone(),
            subject: t.subject.clone(),
            body: preview(&t.body, BODY_PREVIEW_CHARS),
        })
        .collect();
    render(&rows)
}
