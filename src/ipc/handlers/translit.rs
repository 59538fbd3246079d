use crate::ipc::error::ok;
use crate::ipc::helpers::param_str;
use crate::ipc::types::{AppState, Request};
use crate::translit::{apply_edit, is_rtl_text, transliterate, KEYBOARD_ROWS};
use serde_json::json;

// These work without a workspace or a login; the shell calls them on every
// keystroke.

fn handle_translit_text(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let text = param_str(req, "text").unwrap_or_default();
    let out = transliterate(text);
    let rtl = is_rtl_text(&out);
    ok(&req.id, json!({ "text": out, "rtl": rtl }))
}

fn handle_translit_edit(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let previous = param_str(req, "previous").unwrap_or_default();
    let next = param_str(req, "next").unwrap_or_default();
    ok(&req.id, json!({ "text": apply_edit(previous, next) }))
}

fn handle_translit_keyboard(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "rows": KEYBOARD_ROWS }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "translit.text" => Some(handle_translit_text(state, req)),
        "translit.edit" => Some(handle_translit_edit(state, req)),
        "translit.keyboard" => Some(handle_translit_keyboard(state, req)),
        _ => None,
    }
}
