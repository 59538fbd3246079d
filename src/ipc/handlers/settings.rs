use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::documents::{
    date_sheet_notes, school_name, DATE_SHEET_NOTES_KEY, SCHOOL_NAME_KEY,
};
use crate::ipc::helpers::{authed, optional_string, repo_err};
use crate::ipc::types::{AppState, Request};
use crate::render::date_sheet::DEFAULT_NOTES;
use crate::repo::require_admin;
use serde_json::json;

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let notes = date_sheet_notes(conn);
    let effective: Vec<String> = if notes.is_empty() {
        DEFAULT_NOTES.iter().map(|n| n.to_string()).collect()
    } else {
        notes.clone()
    };
    ok(
        &req.id,
        json!({
            "schoolName": school_name(state, conn),
            "dateSheetNotes": notes,
            "effectiveDateSheetNotes": effective,
            "rtlFontLoaded": state.fonts.truetype().is_some(),
        }),
    )
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = require_admin(session, "changing workspace settings") {
        return repo_err(req, e);
    }

    let mut changed = Vec::new();
    if req.params.get("schoolName").is_some() {
        // An empty name clears the override.
        let value = match optional_string(req, "schoolName") {
            Some(name) => json!(name),
            None => serde_json::Value::Null,
        };
        if let Err(e) = db::settings_set_json(conn, SCHOOL_NAME_KEY, &value) {
            return err(&req.id, "db_update_failed", format!("{e:?}"), None);
        }
        changed.push(SCHOOL_NAME_KEY);
    }
    if let Some(raw) = req.params.get("dateSheetNotes") {
        let Some(items) = raw.as_array() else {
            return err(&req.id, "bad_params", "params.dateSheetNotes must be a list", None);
        };
        let notes: Vec<String> = items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if let Err(e) = db::settings_set_json(conn, DATE_SHEET_NOTES_KEY, &json!(notes)) {
            return err(&req.id, "db_update_failed", format!("{e:?}"), None);
        }
        changed.push(DATE_SHEET_NOTES_KEY);
    }

    tracing::info!(keys = ?changed, "workspace settings updated");
    handle_settings_get(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
