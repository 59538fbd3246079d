use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{authed, ok_json, param_bool, param_str, repo_err, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::repo::users::{self, NewUser};
use serde_json::json;

fn handle_users_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match users::list_staff(conn, session) {
        Ok(list) => ok(&req.id, json!({ "users": list })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_users_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (name, email, role_raw) = match (
        required_str(req, "name"),
        required_str(req, "email"),
        required_str(req, "role"),
    ) {
        (Ok(n), Ok(e), Ok(r)) => (n, e, r),
        (Err(resp), _, _) | (_, Err(resp), _) | (_, _, Err(resp)) => return resp,
    };
    let password = param_str(req, "password").unwrap_or_default();
    if password.is_empty() {
        return err(&req.id, "bad_params", "missing params.password", None);
    }
    let role: Role = match role_raw.parse() {
        Ok(r) => r,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    match users::create(
        conn,
        session,
        NewUser {
            name: &name,
            email: &email,
            password,
            role,
        },
    ) {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = role.as_str(), "account created");
            ok_json(req, &user)
        }
        Err(e) => repo_err(req, e),
    }
}

fn handle_users_set_active(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(active) = param_bool(req, "active") else {
        return err(&req.id, "bad_params", "missing params.active", None);
    };
    match users::set_active(conn, session, &user_id, active) {
        Ok(()) => ok(&req.id, json!({ "userId": user_id, "active": active })),
        Err(e) => repo_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.list" => Some(handle_users_list(state, req)),
        "users.create" => Some(handle_users_create(state, req)),
        "users.setActive" => Some(handle_users_set_active(state, req)),
        _ => None,
    }
}
