//! Typed data access, one function per query shape. Operations that need
//! authorization take the caller's [`Session`] explicitly.

pub mod catalog;
pub mod date_sheet;
pub mod papers;
pub mod syllabus;
pub mod users;

use thiserror::Error;

use crate::auth::Session;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    BadInput(String),
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl RepoError {
    pub fn code(&self) -> &'static str {
        match self {
            RepoError::NotFound(_) => "not_found",
            RepoError::Forbidden(_) => "forbidden",
            RepoError::InvalidTransition(_) => "invalid_transition",
            RepoError::BadInput(_) => "bad_params",
            RepoError::Db(_) => "db_query_failed",
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

pub(crate) fn require_admin(session: &Session, action: &str) -> RepoResult<()> {
    if session.role.is_admin() {
        return Ok(());
    }
    Err(RepoError::Forbidden(format!(
        "{} requires an administrator, not {}",
        action,
        session.role.as_str()
    )))
}

pub(crate) fn non_empty(field: &str, value: &str) -> RepoResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(RepoError::BadInput(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
