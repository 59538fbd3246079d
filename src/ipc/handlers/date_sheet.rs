use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{authed, ok_json, optional_string, repo_err, required_str};
use crate::ipc::types::{AppState, Request};
use crate::repo::date_sheet::{self, DraftEntry};
use chrono::NaiveDate;
use serde_json::json;

fn draft_from_json(v: &serde_json::Value) -> DraftEntry {
    let field = |key: &str| {
        v.get(key)
            .and_then(|x| x.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    DraftEntry {
        class_id: field("classId"),
        subject_id: field("subjectId"),
        exam_date: field("examDate"),
        exam_time: field("examTime"),
        room: field("room"),
        duration: field("duration"),
    }
}

fn handle_datesheet_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(rows) = req.params.get("entries").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing params.entries", None);
    };
    let drafts: Vec<DraftEntry> = rows.iter().map(draft_from_json).collect();

    match date_sheet::create(conn, session, &drafts) {
        Ok(summary) => {
            if !summary.skipped.is_empty() {
                tracing::warn!(skipped = summary.skipped.len(), "incomplete date sheet rows skipped");
            }
            ok_json(req, &summary)
        }
        Err(e) => repo_err(req, e),
    }
}

fn parse_day(req: &Request, key: &str) -> Result<Option<NaiveDate>, serde_json::Value> {
    match optional_string(req, key) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| err(&req.id, "bad_params", format!("params.{} must be YYYY-MM-DD", key), None)),
    }
}

fn handle_datesheet_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let range = match (parse_day(req, "from"), parse_day(req, "to")) {
        (Ok(from), Ok(to)) => match (from, to) {
            (None, None) => None,
            (from, to) => Some((
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )),
        },
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    match date_sheet::list(conn, range) {
        Ok(entries) => ok(&req.id, json!({ "entries": entries })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_datesheet_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "entryId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match date_sheet::delete(conn, session, &id) {
        Ok(()) => ok(&req.id, json!({ "deleted": id })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_datesheet_month(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let year = req
        .params
        .get("year")
        .and_then(|v| v.as_i64())
        .and_then(|y| i32::try_from(y).ok());
    let month = req
        .params
        .get("month")
        .and_then(|v| v.as_u64())
        .and_then(|m| u32::try_from(m).ok());
    let (Some(year), Some(month)) = (year, month) else {
        return err(&req.id, "bad_params", "missing params.year / params.month", None);
    };
    match date_sheet::month_grid(conn, year, month) {
        Ok(grid) => ok_json(req, &grid),
        Err(e) => repo_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "datesheet.create" => Some(handle_datesheet_create(state, req)),
        "datesheet.list" => Some(handle_datesheet_list(state, req)),
        "datesheet.delete" => Some(handle_datesheet_delete(state, req)),
        "datesheet.month" => Some(handle_datesheet_month(state, req)),
        _ => None,
    }
}
