use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use super::{catalog, non_empty, optional_text, require_admin, RepoError, RepoResult};
use crate::auth::Session;
use crate::db;
use crate::model::{ExamPaper, PaperStatus, Question, QuestionType, Role};

pub struct NewQuestion {
    pub text: String,
    pub kind: QuestionType,
    pub marks: Option<u32>,
    pub options: Vec<String>,
}

pub struct NewPaper {
    pub class_id: String,
    pub subject_id: String,
    pub exam_type: String,
    pub duration: String,
    pub mcq_instruction: Option<String>,
    pub short_instruction: Option<String>,
    pub long_instruction: Option<String>,
    /// false keeps the paper as a Draft.
    pub submit: bool,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "approve" | "approved" => Some(ReviewDecision::Approve),
            "reject" | "rejected" => Some(ReviewDecision::Reject),
            _ => None,
        }
    }

    fn target(self) -> PaperStatus {
        match self {
            ReviewDecision::Approve => PaperStatus::Approved,
            ReviewDecision::Reject => PaperStatus::Rejected,
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
}

const PAPER_SELECT: &str = "SELECT
       p.id, p.teacher_id, u.name, p.class_id, c.name, p.subject_id, s.name,
       p.exam_type, p.duration, p.mcq_instruction, p.short_instruction,
       p.long_instruction, p.status, p.created_at
     FROM papers p
     JOIN classes c ON c.id = p.class_id
     JOIN subjects s ON s.id = p.subject_id
     LEFT JOIN users u ON u.id = p.teacher_id";

fn paper_from_row(row: &Row<'_>) -> rusqlite::Result<ExamPaper> {
    let status_raw: String = row.get(12)?;
    let status = status_raw.parse::<PaperStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(12, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(ExamPaper {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        teacher_name: row.get(2)?,
        class_id: row.get(3)?,
        class_name: row.get(4)?,
        subject_id: row.get(5)?,
        subject_name: row.get(6)?,
        exam_type: row.get(7)?,
        duration: row.get(8)?,
        mcq_instruction: row.get(9)?,
        short_instruction: row.get(10)?,
        long_instruction: row.get(11)?,
        status,
        created_at: row.get(13)?,
    })
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let kind_raw: String = row.get(3)?;
    let kind = kind_raw.parse::<QuestionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    let marks: Option<i64> = row.get(4)?;
    Ok(Question {
        id: row.get(0)?,
        paper_id: row.get(1)?,
        text: row.get(2)?,
        kind,
        marks: marks.and_then(|m| u32::try_from(m).ok()),
        options_json: row.get(5)?,
    })
}

fn can_create(role: Role) -> bool {
    matches!(role, Role::Teacher | Role::SuperAdmin | Role::Principal)
}

/// Inserts the paper and its questions atomically.
pub fn create(conn: &Connection, session: &Session, new: NewPaper) -> RepoResult<ExamPaper> {
    if !can_create(session.role) {
        return Err(RepoError::Forbidden(format!(
            "{} cannot create exam papers",
            session.role.as_str()
        )));
    }
    if new.questions.is_empty() {
        return Err(RepoError::BadInput("a paper needs at least one question".into()));
    }
    let exam_type = non_empty("examType", &new.exam_type)?;
    let duration = new.duration.trim().to_string();
    catalog::class_name(conn, &new.class_id)?;
    if !catalog::subject_exists(conn, &new.subject_id)? {
        return Err(RepoError::NotFound("subject"));
    }
    for (i, q) in new.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(RepoError::BadInput(format!("question {} has no text", i + 1)));
        }
    }

    let status = if new.submit {
        PaperStatus::Submitted
    } else {
        PaperStatus::Draft
    };
    let paper_id = Uuid::new_v4().to_string();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO papers(
            id, teacher_id, class_id, subject_id, exam_type, duration, status,
            mcq_instruction, short_instruction, long_instruction, created_at
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &paper_id,
            &session.user_id,
            &new.class_id,
            &new.subject_id,
            &exam_type,
            &duration,
            status.as_str(),
            optional_text(new.mcq_instruction.as_deref()),
            optional_text(new.short_instruction.as_deref()),
            optional_text(new.long_instruction.as_deref()),
            db::now_stamp(),
        ),
    )?;
    for (i, q) in new.questions.iter().enumerate() {
        // Options are only meaningful for multiple choice.
        let options_json = match q.kind {
            QuestionType::Mcq => Some(
                serde_json::to_string(&q.options)
                    .map_err(|e| RepoError::BadInput(e.to_string()))?,
            ),
            _ => None,
        };
        tx.execute(
            "INSERT INTO questions(id, paper_id, sort_order, text, question_type, marks, options_json)
             VALUES(?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                &paper_id,
                i as i64,
                q.text.trim(),
                q.kind.as_str(),
                q.marks.map(i64::from),
                options_json,
            ),
        )?;
    }
    tx.commit()?;

    let (paper, _) = get(conn, session, &paper_id)?;
    Ok(paper)
}

fn visible_to(session: &Session, paper: &ExamPaper) -> bool {
    match session.role {
        Role::SuperAdmin | Role::Principal => true,
        Role::Teacher => paper.teacher_id == session.user_id,
        Role::Accountant => false,
    }
}

/// Teachers see their own papers, administrators all of them.
pub fn list(
    conn: &Connection,
    session: &Session,
    status: Option<PaperStatus>,
) -> RepoResult<Vec<ExamPaper>> {
    if session.role == Role::Accountant {
        return Err(RepoError::Forbidden("accountants cannot view exam papers".into()));
    }
    let mut sql = format!("{} WHERE 1 = 1", PAPER_SELECT);
    let mut bind: Vec<Value> = Vec::new();
    if session.role == Role::Teacher {
        sql.push_str(" AND p.teacher_id = ?");
        bind.push(Value::Text(session.user_id.clone()));
    }
    if let Some(s) = status {
        sql.push_str(" AND p.status = ?");
        bind.push(Value::Text(s.as_str().to_string()));
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), paper_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The paper with its questions in entry order.
pub fn get(
    conn: &Connection,
    session: &Session,
    paper_id: &str,
) -> RepoResult<(ExamPaper, Vec<Question>)> {
    let paper = conn
        .query_row(
            &format!("{} WHERE p.id = ?", PAPER_SELECT),
            [paper_id],
            paper_from_row,
        )
        .optional()?
        .ok_or(RepoError::NotFound("paper"))?;
    if !visible_to(session, &paper) {
        return Err(RepoError::Forbidden("paper belongs to another teacher".into()));
    }

    let mut stmt = conn.prepare(
        "SELECT id, paper_id, text, question_type, marks, options_json
         FROM questions
         WHERE paper_id = ?
         ORDER BY sort_order",
    )?;
    let questions = stmt
        .query_map([paper_id], question_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok((paper, questions))
}

fn set_status(
    conn: &Connection,
    paper_id: &str,
    from: PaperStatus,
    to: PaperStatus,
) -> RepoResult<()> {
    // Guarded update so a concurrent transition cannot be overwritten.
    let changed = conn.execute(
        "UPDATE papers SET status = ? WHERE id = ? AND status = ?",
        (to.as_str(), paper_id, from.as_str()),
    )?;
    if changed == 0 {
        return Err(RepoError::InvalidTransition(format!(
            "paper is no longer {}",
            from
        )));
    }
    tracing::info!(paper_id, from = %from, to = %to, "paper status changed");
    Ok(())
}

/// Draft -> Submitted, by the paper's owner.
pub fn submit(conn: &Connection, session: &Session, paper_id: &str) -> RepoResult<ExamPaper> {
    let (paper, _) = get(conn, session, paper_id)?;
    if paper.teacher_id != session.user_id {
        return Err(RepoError::Forbidden("only the author can submit a paper".into()));
    }
    if paper.status != PaperStatus::Draft {
        return Err(RepoError::InvalidTransition(format!(
            "cannot submit a paper that is {}",
            paper.status
        )));
    }
    set_status(conn, paper_id, PaperStatus::Draft, PaperStatus::Submitted)?;
    get(conn, session, paper_id).map(|(p, _)| p)
}

/// Submitted -> Approved | Rejected, by an administrator. Reviewed papers
/// are final.
pub fn review(
    conn: &Connection,
    session: &Session,
    paper_id: &str,
    decision: ReviewDecision,
) -> RepoResult<ExamPaper> {
    require_admin(session, "reviewing papers")?;
    let (paper, _) = get(conn, session, paper_id)?;
    if paper.status != PaperStatus::Submitted {
        return Err(RepoError::InvalidTransition(format!(
            "cannot review a paper that is {}",
            paper.status
        )));
    }
    set_status(conn, paper_id, PaperStatus::Submitted, decision.target())?;
    get(conn, session, paper_id).map(|(p, _)| p)
}

/// Dashboard counters, scoped like [`list`].
pub fn stats(conn: &Connection, session: &Session) -> RepoResult<PaperStats> {
    if session.role == Role::Accountant {
        return Ok(PaperStats::default());
    }
    let (filter, bind): (&str, Vec<Value>) = if session.role == Role::Teacher {
        ("WHERE teacher_id = ?", vec![Value::Text(session.user_id.clone())])
    } else {
        ("", Vec::new())
    };
    let sql = format!(
        "SELECT
           COUNT(*),
           COALESCE(SUM(CASE WHEN status = 'Submitted' THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN status = 'Approved' THEN 1 ELSE 0 END), 0)
         FROM papers {}",
        filter
    );
    let stats = conn.query_row(&sql, params_from_iter(bind), |r| {
        Ok(PaperStats {
            total: r.get(0)?,
            pending: r.get(1)?,
            approved: r.get(2)?,
        })
    })?;
    Ok(stats)
}
