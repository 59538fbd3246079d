use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::config::Settings;
use crate::model::Role;
use crate::repo::users;

pub const SUPERADMIN_ID: &str = "superadmin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    Inactive,
    #[error("password hashing failed")]
    Hashing,
    #[error("user lookup failed: {0}")]
    Lookup(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Inactive => "account_inactive",
            AuthError::Hashing => "hash_failed",
            AuthError::Lookup(_) => "db_query_failed",
        }
    }
}

/// The authenticated caller. Handed to every operation that authorizes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::Hashing)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The configured admin pair is checked before any lookup and works even
/// without a workspace.
pub fn login(
    conn: Option<&Connection>,
    settings: &Settings,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let email = email.trim();
    if email == settings.admin_email && password == settings.admin_password {
        return Ok(Session {
            user_id: SUPERADMIN_ID.to_string(),
            name: "Super Admin".to_string(),
            email: settings.admin_email.clone(),
            role: Role::SuperAdmin,
        });
    }

    let Some(conn) = conn else {
        return Err(AuthError::InvalidCredentials);
    };
    let user = users::find_by_email(conn, email)
        .map_err(|e| AuthError::Lookup(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    if !user.active {
        return Err(AuthError::Inactive);
    }
    Ok(Session {
        user_id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support;

    #[test]
    fn admin_bypass_needs_no_workspace() {
        let settings = Settings::default();
        let s = login(None, &settings, " admin@school.com ", "admin123").expect("admin login");
        assert_eq!(s.role, Role::SuperAdmin);
        assert_eq!(s.user_id, SUPERADMIN_ID);
        assert!(matches!(
            login(None, &settings, "admin@school.com", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn stored_user_login_checks_hash_and_active_flag() {
        let conn = test_support::workspace();
        let admin = test_support::session(SUPERADMIN_ID, Role::SuperAdmin);
        let user = users::create(
            &conn,
            &admin,
            users::NewUser {
                name: "Ayesha",
                email: "ayesha@school.test",
                password: "s3cret",
                role: Role::Teacher,
            },
        )
        .expect("create user");

        let settings = Settings::default();
        let s = login(Some(&conn), &settings, "ayesha@school.test", "s3cret").expect("login");
        assert_eq!(s.user_id, user.id);
        assert_eq!(s.role, Role::Teacher);
        assert!(matches!(
            login(Some(&conn), &settings, "ayesha@school.test", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(Some(&conn), &settings, "nobody@school.test", "s3cret"),
            Err(AuthError::InvalidCredentials)
        ));

        users::set_active(&conn, &admin, &user.id, false).expect("deactivate");
        assert!(matches!(
            login(Some(&conn), &settings, "ayesha@school.test", "s3cret"),
            Err(AuthError::Inactive)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("pw").expect("hash");
        let b = hash_password("pw").expect("hash");
        assert_ne!(a, b);
        assert!(verify_password("pw", &a));
        assert!(!verify_password("pw", "garbage"));
    }
}
