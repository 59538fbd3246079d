use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "examdesk.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Staff accounts. The environment admin is never stored here.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    // teacher_id has no foreign key: papers created by the environment admin
    // reference a user that only exists in the session.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS papers(
            id TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            exam_type TEXT NOT NULL,
            duration TEXT NOT NULL,
            status TEXT NOT NULL,
            mcq_instruction TEXT,
            short_instruction TEXT,
            long_instruction TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_papers_teacher ON papers(teacher_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_papers_status ON papers(status)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS questions(
            id TEXT PRIMARY KEY,
            paper_id TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            text TEXT NOT NULL,
            question_type TEXT NOT NULL,
            marks INTEGER,
            options_json TEXT,
            FOREIGN KEY(paper_id) REFERENCES papers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_questions_paper ON questions(paper_id, sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS syllabus(
            id TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            subject_id TEXT,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    // Workspaces from before terms were tracked get the column lazily.
    ensure_syllabus_term(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_syllabus_class ON syllabus(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS date_sheet(
            id TEXT PRIMARY KEY,
            class_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            exam_date TEXT NOT NULL,
            exam_time TEXT,
            room TEXT,
            duration TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(class_id) REFERENCES classes(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_date_sheet_date ON date_sheet(exam_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

fn ensure_syllabus_term(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "syllabus", "term")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE syllabus ADD COLUMN term TEXT NOT NULL DEFAULT 'Mid Term'",
        [],
    )?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_workspace(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("examdesk-db-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    #[test]
    fn open_is_idempotent_and_adds_term_column() {
        let ws = temp_workspace("migrate");
        std::fs::create_dir_all(&ws).expect("mkdir");
        {
            // Simulate a workspace created before terms existed.
            let conn = Connection::open(ws.join(DB_FILE)).expect("open raw");
            conn.execute(
                "CREATE TABLE syllabus(
                    id TEXT PRIMARY KEY,
                    teacher_id TEXT NOT NULL,
                    class_id TEXT NOT NULL,
                    subject_id TEXT,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )
            .expect("legacy table");
        }
        let conn = open_db(&ws).expect("open");
        assert!(table_has_column(&conn, "syllabus", "term").expect("pragma"));
        drop(conn);
        let conn = open_db(&ws).expect("reopen");
        assert!(table_has_column(&conn, "date_sheet", "room").expect("pragma"));
    }

    #[test]
    fn settings_roundtrip_overwrites() {
        let ws = temp_workspace("settings");
        let conn = open_db(&ws).expect("open");
        assert!(settings_get_json(&conn, "school.name").expect("get").is_none());
        settings_set_json(&conn, "school.name", &json!("A")).expect("set");
        settings_set_json(&conn, "school.name", &json!("B")).expect("set again");
        assert_eq!(
            settings_get_json(&conn, "school.name").expect("get"),
            Some(json!("B"))
        );
    }
}
