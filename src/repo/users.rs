use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{non_empty, require_admin, RepoError, RepoResult};
use crate::auth::{self, Session};
use crate::db;
use crate::model::{Role, User};

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_raw: String = row.get(4)?;
    let role = role_raw.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        active: row.get::<_, i64>(5)? != 0,
    })
}

pub fn create(conn: &Connection, session: &Session, new: NewUser<'_>) -> RepoResult<User> {
    require_admin(session, "creating staff accounts")?;
    if new.role == Role::SuperAdmin {
        return Err(RepoError::BadInput(
            "SuperAdmin accounts cannot be created".into(),
        ));
    }
    let name = non_empty("name", new.name)?;
    let email = non_empty("email", new.email)?.to_ascii_lowercase();
    if new.password.is_empty() {
        return Err(RepoError::BadInput("password must not be empty".into()));
    }
    if find_by_email(conn, &email)?.is_some() {
        return Err(RepoError::BadInput(format!("email already registered: {}", email)));
    }
    let password_hash =
        auth::hash_password(new.password).map_err(|e| RepoError::BadInput(e.to_string()))?;

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO users(id, name, email, password_hash, role, is_active, created_at)
         VALUES(?, ?, ?, ?, ?, 1, ?)",
        (&id, &name, &email, &password_hash, new.role.as_str(), db::now_stamp()),
    )?;
    Ok(User {
        id,
        name,
        email,
        password_hash,
        role: new.role,
        active: true,
    })
}

pub fn find_by_email(conn: &Connection, email: &str) -> RepoResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email, password_hash, role, is_active
             FROM users
             WHERE email = ?",
            [email.trim().to_ascii_lowercase()],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Every account except SuperAdmins, by name.
pub fn list_staff(conn: &Connection, session: &Session) -> RepoResult<Vec<User>> {
    require_admin(session, "listing staff")?;
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, role, is_active
         FROM users
         WHERE role != 'SuperAdmin'
         ORDER BY name, email",
    )?;
    let rows = stmt
        .query_map([], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_active(
    conn: &Connection,
    session: &Session,
    user_id: &str,
    active: bool,
) -> RepoResult<()> {
    require_admin(session, "changing account status")?;
    let changed = conn.execute(
        "UPDATE users SET is_active = ? WHERE id = ?",
        (active as i64, user_id),
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound("user"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support::{session, workspace};

    #[test]
    fn teachers_cannot_manage_staff() {
        let conn = workspace();
        let teacher = session("t1", Role::Teacher);
        let err = create(
            &conn,
            &teacher,
            NewUser {
                name: "X",
                email: "x@school.test",
                password: "pw",
                role: Role::Teacher,
            },
        )
        .expect_err("teacher cannot create");
        assert_eq!(err.code(), "forbidden");
        assert_eq!(list_staff(&conn, &teacher).expect_err("no list").code(), "forbidden");
    }

    #[test]
    fn email_is_unique_and_case_insensitive() {
        let conn = workspace();
        let admin = session("a", Role::Principal);
        create(
            &conn,
            &admin,
            NewUser {
                name: "Sana",
                email: "Sana@School.test",
                password: "pw",
                role: Role::Accountant,
            },
        )
        .expect("first");
        let dup = create(
            &conn,
            &admin,
            NewUser {
                name: "Sana 2",
                email: "sana@school.test",
                password: "pw",
                role: Role::Teacher,
            },
        );
        assert!(matches!(dup, Err(RepoError::BadInput(_))));
        let staff = list_staff(&conn, &admin).expect("list");
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].email, "sana@school.test");
        assert!(find_by_email(&conn, "SANA@school.test").expect("find").is_some());
    }

    #[test]
    fn set_active_reports_missing_user() {
        let conn = workspace();
        let admin = session("a", Role::SuperAdmin);
        let err = set_active(&conn, &admin, "missing", false).expect_err("missing");
        assert_eq!(err.code(), "not_found");
    }
}
