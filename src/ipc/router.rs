use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type Family = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const FAMILIES: &[Family] = &[
    handlers::core::try_handle,
    handlers::auth::try_handle,
    handlers::users::try_handle,
    handlers::catalog::try_handle,
    handlers::papers::try_handle,
    handlers::syllabus::try_handle,
    handlers::date_sheet::try_handle,
    handlers::documents::try_handle,
    handlers::translit::try_handle,
    handlers::settings::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    tracing::debug!(id = %req.id, method = %req.method, "request");
    for family in FAMILIES {
        if let Some(resp) = family(state, &req) {
            return resp;
        }
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
