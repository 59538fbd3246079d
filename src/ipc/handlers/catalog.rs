use crate::ipc::helpers::{authed, ok_json, repo_err, required_str};
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::repo::catalog;
use serde_json::json;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match catalog::list_classes(conn) {
        Ok(classes) => ok(&req.id, json!({ "classes": classes })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match catalog::list_subjects(conn) {
        Ok(subjects) => ok(&req.id, json!({ "subjects": subjects })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_create(state: &mut AppState, req: &Request, subject: bool) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let created = if subject {
        catalog::create_subject(conn, session, &name)
    } else {
        catalog::create_class(conn, session, &name)
    };
    match created {
        Ok(r) => ok_json(req, &r),
        Err(e) => repo_err(req, e),
    }
}

fn handle_seed_structure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match catalog::seed_school_structure(conn, session) {
        Ok(summary) => ok_json(req, &summary),
        Err(e) => repo_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_create(state, req, false)),
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.create" => Some(handle_create(state, req, true)),
        "school.seedStructure" => Some(handle_seed_structure(state, req)),
        _ => None,
    }
}
