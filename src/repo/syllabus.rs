use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use super::{catalog, non_empty, optional_text, RepoError, RepoResult};
use crate::auth::Session;
use crate::db;
use crate::model::{Role, SyllabusEntry};
use crate::templates::SyllabusTemplate;

pub const DEFAULT_TERM: &str = "Mid Term";

pub struct NewSyllabus<'a> {
    pub class_id: &'a str,
    /// `None` stores a whole-class syllabus.
    pub subject_id: Option<&'a str>,
    pub term: Option<&'a str>,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateApplied {
    pub class_id: String,
    pub inserted: usize,
    pub skipped_subjects: Vec<String>,
    pub note: String,
}

const SYLLABUS_SELECT: &str = "SELECT
       s.id, s.teacher_id, u.name, s.class_id, c.name, s.subject_id, sub.name,
       s.term, s.content, s.created_at
     FROM syllabus s
     JOIN classes c ON c.id = s.class_id
     LEFT JOIN subjects sub ON sub.id = s.subject_id
     LEFT JOIN users u ON u.id = s.teacher_id";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<SyllabusEntry> {
    Ok(SyllabusEntry {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        teacher_name: row.get(2)?,
        class_id: row.get(3)?,
        class_name: row.get(4)?,
        subject_id: row.get(5)?,
        subject_name: row.get(6)?,
        term: row.get(7)?,
        content: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn can_write(role: Role) -> bool {
    matches!(role, Role::Teacher | Role::SuperAdmin | Role::Principal)
}

fn ensure_writer(session: &Session) -> RepoResult<()> {
    if can_write(session.role) {
        return Ok(());
    }
    Err(RepoError::Forbidden(format!(
        "{} cannot edit syllabi",
        session.role.as_str()
    )))
}

fn insert(
    conn: &Connection,
    session: &Session,
    class_id: &str,
    subject_id: Option<&str>,
    term: &str,
    content: &str,
) -> RepoResult<String> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO syllabus(id, teacher_id, class_id, subject_id, term, content, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (&id, &session.user_id, class_id, subject_id, term, content, db::now_stamp()),
    )?;
    Ok(id)
}

pub fn create(
    conn: &Connection,
    session: &Session,
    new: NewSyllabus<'_>,
) -> RepoResult<SyllabusEntry> {
    ensure_writer(session)?;
    let content = non_empty("content", new.content)?;
    catalog::class_name(conn, new.class_id)?;
    let subject_id = optional_text(new.subject_id);
    if let Some(sid) = subject_id.as_deref() {
        if !catalog::subject_exists(conn, sid)? {
            return Err(RepoError::NotFound("subject"));
        }
    }
    let term = optional_text(new.term).unwrap_or_else(|| DEFAULT_TERM.to_string());
    let id = insert(
        conn,
        session,
        new.class_id,
        subject_id.as_deref(),
        &term,
        &content,
    )?;
    get(conn, session, &id)
}

pub fn list(conn: &Connection, session: &Session) -> RepoResult<Vec<SyllabusEntry>> {
    ensure_writer(session)?;
    let mut sql = SYLLABUS_SELECT.to_string();
    let mut bind: Vec<Value> = Vec::new();
    if session.role == Role::Teacher {
        sql.push_str(" WHERE s.teacher_id = ?");
        bind.push(Value::Text(session.user_id.clone()));
    }
    sql.push_str(" ORDER BY s.created_at DESC, s.rowid DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, session: &Session, id: &str) -> RepoResult<SyllabusEntry> {
    ensure_writer(session)?;
    let entry = conn
        .query_row(
            &format!("{} WHERE s.id = ?", SYLLABUS_SELECT),
            [id],
            entry_from_row,
        )
        .optional()?
        .ok_or(RepoError::NotFound("syllabus"))?;
    if session.role == Role::Teacher && entry.teacher_id != session.user_id {
        return Err(RepoError::Forbidden("syllabus belongs to another teacher".into()));
    }
    Ok(entry)
}

pub fn delete(conn: &Connection, session: &Session, id: &str) -> RepoResult<()> {
    // get() enforces ownership for teachers.
    get(conn, session, id)?;
    conn.execute("DELETE FROM syllabus WHERE id = ?", [id])?;
    Ok(())
}

/// Subject blocks of one class and term in entry order; the input of the
/// combined syllabus document.
pub fn for_class_term(
    conn: &Connection,
    session: &Session,
    class_id: &str,
    term: &str,
) -> RepoResult<Vec<SyllabusEntry>> {
    ensure_writer(session)?;
    let mut sql = format!("{} WHERE s.class_id = ? AND s.term = ?", SYLLABUS_SELECT);
    let mut bind: Vec<Value> = vec![
        Value::Text(class_id.to_string()),
        Value::Text(term.to_string()),
    ];
    if session.role == Role::Teacher {
        sql.push_str(" AND s.teacher_id = ?");
        bind.push(Value::Text(session.user_id.clone()));
    }
    sql.push_str(" ORDER BY s.created_at, s.rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Inserts one syllabus row per template subject that matches a catalog
/// subject by name containment. Without an explicit class the template's
/// class is looked up the same way.
pub fn apply_template(
    conn: &Connection,
    session: &Session,
    template: &SyllabusTemplate,
    class_id: Option<&str>,
) -> RepoResult<TemplateApplied> {
    ensure_writer(session)?;
    let classes = catalog::list_classes(conn)?;
    let class_id = match class_id {
        Some(id) => {
            catalog::class_name(conn, id)?;
            id.to_string()
        }
        None => classes
            .iter()
            .find(|c| contains_ci(&c.name, template.class_name))
            .map(|c| c.id.clone())
            .ok_or_else(|| {
                RepoError::BadInput(format!(
                    "class {} not found; create it first",
                    template.class_name
                ))
            })?,
    };

    let subjects = catalog::list_subjects(conn)?;
    let tx = conn.unchecked_transaction()?;
    let mut inserted = 0;
    let mut skipped_subjects = Vec::new();
    for s in template.subjects {
        match subjects.iter().find(|sub| contains_ci(&sub.name, s.subject)) {
            Some(sub) => {
                insert(&tx, session, &class_id, Some(sub.id.as_str()), template.term, s.content)?;
                inserted += 1;
            }
            None => skipped_subjects.push(s.subject.to_string()),
        }
    }
    tx.commit()?;
    if !skipped_subjects.is_empty() {
        tracing::warn!(template = template.name, skipped = ?skipped_subjects, "template subjects without a catalog match");
    }

    Ok(TemplateApplied {
        class_id,
        inserted,
        skipped_subjects,
        note: template.note.to_string(),
    })
}
