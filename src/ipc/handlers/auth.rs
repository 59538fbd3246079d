use crate::auth;
use crate::ipc::error::ok;
use crate::ipc::helpers::{auth_err, param_str, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Passwords are compared verbatim; no trimming.
    let password = param_str(req, "password").unwrap_or_default();

    match auth::login(state.db.as_ref(), &state.settings, &email, password) {
        Ok(session) => {
            tracing::info!(email = %session.email, role = session.role.as_str(), "login succeeded");
            let result = json!({ "session": &session });
            state.session = Some(session);
            ok(&req.id, result)
        }
        Err(e) => {
            tracing::info!(email = %email, code = e.code(), "login refused");
            auth_err(req, e)
        }
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was = state.session.take().is_some();
    ok(&req.id, json!({ "loggedOut": was }))
}

fn handle_session(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "session": state.session.as_ref() }))
}

fn handle_hash_password(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(password) = param_str(req, "password").filter(|p| !p.is_empty()) else {
        return crate::ipc::error::err(&req.id, "bad_params", "missing params.password", None);
    };
    match auth::hash_password(password) {
        Ok(hash) => ok(&req.id, json!({ "hash": hash })),
        Err(e) => auth_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "auth.session" => Some(handle_session(state, req)),
        "auth.hashPassword" => Some(handle_hash_password(state, req)),
        _ => None,
    }
}
