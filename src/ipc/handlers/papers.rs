use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    authed, ok_json, optional_string, param_bool, repo_err, required_str, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{PaperStatus, QuestionType};
use crate::repo::papers::{self, NewPaper, NewQuestion, ReviewDecision};
use serde_json::json;

fn parse_questions(req: &Request) -> HandlerResult<Vec<NewQuestion>> {
    let bad = |msg: String| err(&req.id, "bad_params", msg, None);
    let Some(items) = req.params.get("questions").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let text = item
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        // Blank rows left in the form are dropped, not rejected.
        if text.is_empty() {
            continue;
        }
        let kind_raw = item.get("type").and_then(|v| v.as_str()).unwrap_or("MCQ");
        let kind: QuestionType = kind_raw
            .parse()
            .map_err(|e: String| bad(format!("questions[{}].type: {}", i, e)))?;
        let marks = match item.get("marks") {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => match v.as_u64().and_then(|m| u32::try_from(m).ok()) {
                Some(m) => Some(m),
                None => return Err(bad(format!("questions[{}].marks must be a whole number", i))),
            },
        };
        let options = item
            .get("options")
            .and_then(|v| v.as_array())
            .map(|opts| {
                opts.iter()
                    .map(|o| o.as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default();
        out.push(NewQuestion {
            text: text.to_string(),
            kind,
            marks,
            options,
        });
    }
    Ok(out)
}

fn handle_papers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fields = (|| -> HandlerResult<NewPaper> {
        Ok(NewPaper {
            class_id: required_str(req, "classId")?,
            subject_id: required_str(req, "subjectId")?,
            exam_type: required_str(req, "examType")?,
            duration: required_str(req, "duration")?,
            mcq_instruction: optional_string(req, "mcqInstruction"),
            short_instruction: optional_string(req, "shortInstruction"),
            long_instruction: optional_string(req, "longInstruction"),
            submit: param_bool(req, "submit").unwrap_or(false),
            questions: parse_questions(req)?,
        })
    })();
    let new = match fields {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match papers::create(conn, session, new) {
        Ok(paper) => ok_json(req, &paper),
        Err(e) => repo_err(req, e),
    }
}

fn handle_papers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match optional_string(req, "status").map(|s| s.parse::<PaperStatus>()) {
        None => None,
        Some(Ok(s)) => Some(s),
        Some(Err(e)) => return err(&req.id, "bad_params", e, None),
    };
    match papers::list(conn, session, status) {
        Ok(list) => ok(&req.id, json!({ "papers": list })),
        Err(e) => repo_err(req, e),
    }
}

fn handle_papers_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let paper_id = match required_str(req, "paperId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match papers::get(conn, session, &paper_id) {
        Ok((paper, questions)) => ok(
            &req.id,
            json!({
                "paper": paper,
                "questions": questions,
                "totalMarks": crate::model::total_marks(&questions),
            }),
        ),
        Err(e) => repo_err(req, e),
    }
}

fn handle_papers_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let paper_id = match required_str(req, "paperId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match papers::submit(conn, session, &paper_id) {
        Ok(paper) => ok_json(req, &paper),
        Err(e) => repo_err(req, e),
    }
}

fn handle_papers_review(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (paper_id, decision_raw) = match (required_str(req, "paperId"), required_str(req, "decision")) {
        (Ok(p), Ok(d)) => (p, d),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let Some(decision) = ReviewDecision::parse(&decision_raw) else {
        return err(
            &req.id,
            "bad_params",
            "decision must be approve or reject",
            Some(json!({ "decision": decision_raw })),
        );
    };
    match papers::review(conn, session, &paper_id, decision) {
        Ok(paper) => ok_json(req, &paper),
        Err(e) => repo_err(req, e),
    }
}

fn handle_papers_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (conn, session) = match authed(state, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match papers::stats(conn, session) {
        Ok(stats) => ok_json(req, &stats),
        Err(e) => repo_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "papers.create" => Some(handle_papers_create(state, req)),
        "papers.list" => Some(handle_papers_list(state, req)),
        "papers.get" => Some(handle_papers_get(state, req)),
        "papers.submit" => Some(handle_papers_submit(state, req)),
        "papers.review" => Some(handle_papers_review(state, req)),
        "papers.stats" => Some(handle_papers_stats(state, req)),
        _ => None,
    }
}
