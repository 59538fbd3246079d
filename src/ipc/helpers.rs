use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use crate::auth::{AuthError, Session};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::render::RenderError;
use crate::repo::RepoError;

/// Early-return channel for handlers: the error side is a finished response.
pub type HandlerResult<T> = Result<T, serde_json::Value>;

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

/// Trimmed, non-empty string parameter.
pub fn optional_string(req: &Request, key: &str) -> Option<String> {
    param_str(req, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn required_str(req: &Request, key: &str) -> HandlerResult<String> {
    optional_string(req, key)
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing params.{}", key), None))
}

pub fn param_bool(req: &Request, key: &str) -> Option<bool> {
    req.params.get(key).and_then(|v| v.as_bool())
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> HandlerResult<&'a Connection> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn require_session<'a>(state: &'a AppState, req: &Request) -> HandlerResult<&'a Session> {
    state
        .session
        .as_ref()
        .ok_or_else(|| err(&req.id, "not_authenticated", "log in first", None))
}

pub fn authed<'a>(state: &'a AppState, req: &Request) -> HandlerResult<(&'a Connection, &'a Session)> {
    let conn = db_conn(state, req)?;
    let session = require_session(state, req)?;
    Ok((conn, session))
}

pub fn repo_err(req: &Request, e: RepoError) -> serde_json::Value {
    if let RepoError::Db(inner) = &e {
        tracing::warn!(method = %req.method, error = %inner, "database error");
    }
    err(&req.id, e.code(), e.to_string(), None)
}

pub fn auth_err(req: &Request, e: AuthError) -> serde_json::Value {
    err(&req.id, e.code(), e.to_string(), None)
}

pub fn render_err(req: &Request, e: RenderError) -> serde_json::Value {
    tracing::warn!(method = %req.method, error = %e, "document generation failed");
    let details = match &e {
        RenderError::Io { path, .. } => Some(json!({ "path": path })),
        _ => None,
    };
    err(&req.id, e.code(), e.to_string(), details)
}

/// Serializes `value` as the response result.
pub fn ok_json<T: Serialize>(req: &Request, value: &T) -> serde_json::Value {
    match serde_json::to_value(value) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal_error", e.to_string(), None),
    }
}
