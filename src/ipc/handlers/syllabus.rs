use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{authed, ok_json, optional_string, param_str, repo_err, required_str};
use crate::ipc::types::{AppState, Request};
use crate::repo::syllabus::{self, NewSyllabus};
use crate::templates::{self, SYLLABUS_TEMPLATES};
use serde_json::json;

fn handle_syllabus_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject_id = optional_string(req, "subjectId");
    let term = optional_string(req, "term");
    // Content keeps its line breaks; only emptiness is checked downstream.
    let content = param_str(req, "content").unwrap_or_default();

    match syllabus::create(
        conn,
        session,
        NewSyllabus {
            class_id: &class_id,
            subject_id: subject_id.as_deref(),
            term: term.as_deref(),
            content,
        },
    ) {
        Ok(entry) => ok_json(req, &entry),
        Err(e) => repo_err(req, e),
    }
}

fn handle_syllabus_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match syllabus::list(conn, session) {
        Ok(entries) => ok(&req.id, json!({ "syllabus": entries })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_syllabus_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "syllabusId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match syllabus::get(conn, session, &id) {
        Ok(entry) => ok_json(req, &entry),
        Err(e) => repo_err(req, e),
    }
}

fn handle_syllabus_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "syllabusId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match syllabus::delete(conn, session, &id) {
        Ok(()) => ok(&req.id, json!({ "deleted": id })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_syllabus_templates(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "templates": SYLLABUS_TEMPLATES }))
}

fn handle_syllabus_apply_template(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(template) = templates::find(&name) else {
        return err(
            &req.id,
            "not_found",
            format!("no syllabus template named {}", name),
            None,
        );
    };
    let class_id = optional_string(req, "classId");
    match syllabus::apply_template(conn, session, template, class_id.as_deref()) {
        Ok(applied) => {
            tracing::info!(
                template = template.name,
                inserted = applied.inserted,
                skipped = applied.skipped_subjects.len(),
                "syllabus template applied"
            );
            ok_json(req, &applied)
        }
        Err(e) => repo_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "syllabus.create" => Some(handle_syllabus_create(state, req)),
        "syllabus.list" => Some(handle_syllabus_list(state, req)),
        "syllabus.get" => Some(handle_syllabus_get(state, req)),
        "syllabus.delete" => Some(handle_syllabus_delete(state, req)),
        "syllabus.templates" => Some(handle_syllabus_templates(state, req)),
        "syllabus.applyTemplate" => Some(handle_syllabus_apply_template(state, req)),
        _ => None,
    }
}
