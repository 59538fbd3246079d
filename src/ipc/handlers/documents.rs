use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use crate::auth::Session;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    authed, optional_string, param_bool, param_str, render_err, repo_err, required_str,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::SyllabusEntry;
use crate::render::fonts::FontSet;
use crate::render::output::{self, SavedDocument};
use crate::render::paginate::PageGeometry;
use crate::render::{date_sheet, exam, render_to_dir, syllabus, word, Document, Letterhead, RenderError};
use crate::repo::{date_sheet as date_sheet_repo, papers, syllabus as syllabus_repo, RepoError};

pub const SCHOOL_NAME_KEY: &str = "school.name";
pub const DATE_SHEET_NOTES_KEY: &str = "dateSheet.notes";
const DOCUMENTS_DIR: &str = "documents";

/// Workspace override first, then the environment default.
pub fn school_name(state: &AppState, conn: &Connection) -> String {
    match db::settings_get_json(conn, SCHOOL_NAME_KEY) {
        Ok(Some(v)) => {
            if let Some(name) = v.as_str().map(str::trim).filter(|s| !s.is_empty()) {
                return name.to_string();
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "school name setting unreadable"),
    }
    state.settings.school_name.clone()
}

pub fn date_sheet_notes(conn: &Connection) -> Vec<String> {
    match db::settings_get_json(conn, DATE_SHEET_NOTES_KEY) {
        Ok(Some(serde_json::Value::Array(items))) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "date sheet notes setting unreadable");
            Vec::new()
        }
    }
}

/// `params.outDir`, else `<workspace>/documents`.
fn output_dir(state: &AppState, req: &Request) -> HandlerResult<PathBuf> {
    if let Some(dir) = optional_string(req, "outDir") {
        return Ok(PathBuf::from(dir));
    }
    state
        .workspace
        .as_ref()
        .map(|w| w.join(DOCUMENTS_DIR))
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn saved(req: &Request, doc: SavedDocument) -> serde_json::Value {
    ok(&req.id, json!({ "generated": true, "document": doc }))
}

fn not_generated(req: &Request, reason: &str) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "generated": false, "document": null, "reason": reason }),
    )
}

enum ExamFailure {
    Repo(RepoError),
    Render(RenderError),
}

fn generate_exam(
    conn: &Connection,
    session: &Session,
    fonts: &FontSet,
    letterhead: &Letterhead,
    dir: &std::path::Path,
    paper_id: &str,
    taken: Option<&mut HashSet<String>>,
) -> Result<SavedDocument, ExamFailure> {
    let (paper, questions) = papers::get(conn, session, paper_id).map_err(ExamFailure::Repo)?;
    let mut doc = exam::exam_document(&paper, &questions, letterhead);
    if let Some(taken) = taken {
        doc.file_name = output::unique_name(&doc.file_name, taken);
    }
    render_to_dir(&doc, fonts, &PageGeometry::default(), dir).map_err(ExamFailure::Render)
}

fn handle_exam_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let paper_id = match required_str(req, "paperId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let letterhead = Letterhead::new(school_name(state, conn));

    match generate_exam(conn, session, &state.fonts, &letterhead, &dir, &paper_id, None) {
        Ok(doc) => saved(req, doc),
        Err(ExamFailure::Repo(e)) => repo_err(req, e),
        Err(ExamFailure::Render(e)) => render_err(req, e),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchItem {
    paper_id: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<SavedDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

/// Papers are generated one after another; a failing paper is reported and
/// the loop moves on. Names repeated within the batch get a `_2`, `_3`
/// suffix so no paper overwrites another.
fn handle_exam_pdf_batch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(ids) = req.params.get("paperIds").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing params.paperIds", None);
    };
    let ids: Vec<String> = ids
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let letterhead = Letterhead::new(school_name(state, conn));

    let mut items = Vec::with_capacity(ids.len());
    let mut taken = HashSet::new();
    for paper_id in ids {
        let generated = generate_exam(
            conn,
            session,
            &state.fonts,
            &letterhead,
            &dir,
            &paper_id,
            Some(&mut taken),
        );
        let item = match generated {
            Ok(doc) => BatchItem {
                paper_id,
                ok: true,
                document: Some(doc),
                error: None,
            },
            Err(failure) => {
                let (code, message) = match failure {
                    ExamFailure::Repo(e) => (e.code(), e.to_string()),
                    ExamFailure::Render(e) => (e.code(), e.to_string()),
                };
                tracing::warn!(paper_id = %paper_id, code, "batch item failed");
                BatchItem {
                    paper_id,
                    ok: false,
                    document: None,
                    error: Some(json!({ "code": code, "message": message })),
                }
            }
        };
        items.push(item);
    }

    let written: Vec<SavedDocument> = items.iter().filter_map(|i| i.document.clone()).collect();
    let mut archive = None;
    if param_bool(req, "bundle").unwrap_or(false) && !written.is_empty() {
        let name = optional_string(req, "bundleName").unwrap_or_else(|| {
            format!("Exam_Papers_{}.zip", Local::now().format("%Y%m%d_%H%M%S"))
        });
        let path = dir.join(output::normalize_file_name(&name));
        match output::bundle(&path, &written) {
            Ok(doc) => {
                tracing::info!(path = %doc.path, documents = written.len(), "documents bundled");
                archive = Some(doc);
            }
            Err(e) => return render_err(req, e),
        }
    }

    ok(
        &req.id,
        json!({
            "succeeded": written.len(),
            "failed": items.len() - written.len(),
            "items": items,
            "bundle": archive,
        }),
    )
}

fn handle_syllabus_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let id = match required_str(req, "syllabusId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let entry = match syllabus_repo::get(conn, session, &id) {
        Ok(e) => e,
        Err(e) => return repo_err(req, e),
    };
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let note = optional_string(req, "footerNote");
    let doc = syllabus::single_document(
        &entry,
        note.as_deref(),
        &Letterhead::new(school_name(state, conn)),
    );
    match render_to_dir(&doc, &state.fonts, &PageGeometry::default(), &dir) {
        Ok(out) => saved(req, out),
        Err(e) => render_err(req, e),
    }
}

fn class_term_entries(
    conn: &Connection,
    session: &Session,
    req: &Request,
) -> HandlerResult<Vec<SyllabusEntry>> {
    let class_id = required_str(req, "classId")?;
    let term = optional_string(req, "term").unwrap_or_else(|| syllabus_repo::DEFAULT_TERM.to_string());
    syllabus_repo::for_class_term(conn, session, &class_id, &term).map_err(|e| repo_err(req, e))
}

fn handle_combined_syllabus_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let entries = match class_term_entries(conn, session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let note = optional_string(req, "footerNote");
    let letterhead = Letterhead::new(school_name(state, conn));
    let Some(doc) = syllabus::combined_document(&entries, note.as_deref(), &letterhead) else {
        return not_generated(req, "no syllabus entries for this class and term");
    };
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match render_to_dir(&doc, &state.fonts, &PageGeometry::default(), &dir) {
        Ok(out) => saved(req, out),
        Err(e) => render_err(req, e),
    }
}

/// Word export of one entry (`syllabusId`) or of a whole class and term.
fn handle_syllabus_word(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let entries = match optional_string(req, "syllabusId") {
        Some(id) => match syllabus_repo::get(conn, session, &id) {
            Ok(e) => vec![e],
            Err(e) => return repo_err(req, e),
        },
        None => match class_term_entries(conn, session, req) {
            Ok(v) => v,
            Err(resp) => return resp,
        },
    };
    let Some(first) = entries.first() else {
        return not_generated(req, "no syllabus entries for this class and term");
    };
    let title = param_str(req, "title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Syllabus {} {}", first.class_name, first.term));
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let html = word::syllabus_document(&school_name(state, conn), &title, &entries);
    match output::save(&dir, &word::file_name(&title), html.as_bytes(), 0) {
        Ok(out) => saved(req, out),
        Err(e) => render_err(req, e),
    }
}

/// `params.month` as `YYYY-MM` limits the sheet to one calendar month.
fn handle_date_sheet_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, _) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let range = match optional_string(req, "month") {
        None => None,
        Some(raw) => {
            let bounds = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
                .ok()
                .and_then(|d| date_sheet_repo::month_bounds(d.year(), d.month()));
            match bounds {
                Some(b) => Some(b),
                None => return err(&req.id, "bad_params", "params.month must be YYYY-MM", None),
            }
        }
    };
    let entries = match date_sheet_repo::list(conn, range) {
        Ok(v) => v,
        Err(e) => return repo_err(req, e),
    };
    let dir = match output_dir(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let month_name = optional_string(req, "monthName");
    let doc = date_sheet::date_sheet_document(
        &entries,
        month_name.as_deref(),
        &date_sheet_notes(conn),
        &Letterhead::new(school_name(state, conn)),
        Local::now().naive_local(),
    );
    match render_to_dir(&doc, &state.fonts, &PageGeometry::default(), &dir) {
        Ok(out) => saved(req, out),
        Err(e) => render_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "documents.examPdf" => Some(handle_exam_pdf(state, req)),
        "documents.examPdfBatch" => Some(handle_exam_pdf_batch(state, req)),
        "documents.syllabusPdf" => Some(handle_syllabus_pdf(state, req)),
        "documents.combinedSyllabusPdf" => Some(handle_combined_syllabus_pdf(state, req)),
        "documents.syllabusWord" => Some(handle_syllabus_word(state, req)),
        "documents.dateSheetPdf" => Some(handle_date_sheet_pdf(state, req)),
        _ => None,
    }
}
