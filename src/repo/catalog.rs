use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::{non_empty, require_admin, RepoError, RepoResult};
use crate::auth::Session;
use crate::model::NamedRef;

pub const SCHOOL_CLASSES: &[&str] = &[
    "Play Group",
    "Nursery",
    "Prep",
    "1st",
    "2nd",
    "3rd",
    "4th",
    "5th",
    "6th",
    "7th",
    "8th",
];

pub const SCHOOL_SUBJECTS: &[&str] = &[
    "English",
    "Urdu",
    "Maths",
    "Drawing",
    "Nazra",
    "G.Knowledge",
    "Islamiat",
    "S.Study",
    "Science",
    "Chemistry",
    "Physics",
    "Biology",
    "MQ/Nazra",
];

pub fn list_classes(conn: &Connection) -> RepoResult<Vec<NamedRef>> {
    let mut stmt = conn.prepare("SELECT id, name FROM classes ORDER BY sort_order, name")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(NamedRef {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_subjects(conn: &Connection) -> RepoResult<Vec<NamedRef>> {
    let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY name")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(NamedRef {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn create_class(conn: &Connection, session: &Session, name: &str) -> RepoResult<NamedRef> {
    require_admin(session, "editing classes")?;
    let name = non_empty("name", name)?;
    insert_class(conn, &name).map(|id| NamedRef { id, name })
}

pub fn create_subject(conn: &Connection, session: &Session, name: &str) -> RepoResult<NamedRef> {
    require_admin(session, "editing subjects")?;
    let name = non_empty("name", name)?;
    insert_subject(conn, &name).map(|id| NamedRef { id, name })
}

fn insert_class(conn: &Connection, name: &str) -> RepoResult<String> {
    if class_id_by_name(conn, name)?.is_some() {
        return Err(RepoError::BadInput(format!("class already exists: {}", name)));
    }
    let next_order: i64 = conn.query_row(
        "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM classes",
        [],
        |r| r.get(0),
    )?;
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO classes(id, name, sort_order) VALUES(?, ?, ?)",
        (&id, name, next_order),
    )?;
    Ok(id)
}

fn insert_subject(conn: &Connection, name: &str) -> RepoResult<String> {
    if subject_id_by_name(conn, name)?.is_some() {
        return Err(RepoError::BadInput(format!("subject already exists: {}", name)));
    }
    let id = Uuid::new_v4().to_string();
    conn.execute("INSERT INTO subjects(id, name) VALUES(?, ?)", (&id, name))?;
    Ok(id)
}

fn class_id_by_name(conn: &Connection, name: &str) -> RepoResult<Option<String>> {
    Ok(conn
        .query_row("SELECT id FROM classes WHERE name = ?", [name], |r| r.get(0))
        .optional()?)
}

fn subject_id_by_name(conn: &Connection, name: &str) -> RepoResult<Option<String>> {
    Ok(conn
        .query_row("SELECT id FROM subjects WHERE name = ?", [name], |r| r.get(0))
        .optional()?)
}

pub fn class_name(conn: &Connection, class_id: &str) -> RepoResult<String> {
    conn.query_row("SELECT name FROM classes WHERE id = ?", [class_id], |r| r.get(0))
        .optional()?
        .ok_or(RepoError::NotFound("class"))
}

pub fn subject_exists(conn: &Connection, subject_id: &str) -> RepoResult<bool> {
    let hit: Option<i64> = conn
        .query_row("SELECT 1 FROM subjects WHERE id = ?", [subject_id], |r| r.get(0))
        .optional()?;
    Ok(hit.is_some())
}

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub classes_added: usize,
    pub subjects_added: usize,
}

/// Adds the standard classes and subjects that are missing. Existing rows
/// (and anything they own) are left alone, so running it twice is a no-op.
pub fn seed_school_structure(conn: &Connection, session: &Session) -> RepoResult<SeedSummary> {
    require_admin(session, "seeding the school structure")?;
    let tx = conn.unchecked_transaction()?;
    let mut summary = SeedSummary::default();
    for name in SCHOOL_CLASSES {
        if class_id_by_name(&tx, name)?.is_none() {
            insert_class(&tx, name)?;
            summary.classes_added += 1;
        }
    }
    for name in SCHOOL_SUBJECTS {
        if subject_id_by_name(&tx, name)?.is_none() {
            insert_subject(&tx, name)?;
            summary.subjects_added += 1;
        }
    }
    tx.commit()?;
    Ok(summary)
}
