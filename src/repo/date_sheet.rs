use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, Row};
use serde::Serialize;
use uuid::Uuid;

use super::{catalog, optional_text, require_admin, RepoError, RepoResult};
use crate::auth::Session;
use crate::db;
use crate::model::{parse_exam_time, sort_date_sheet, DateSheetEntry};

/// One row of a bulk insert as typed into the form; every field optional so
/// half-filled rows can be skipped instead of failing the batch.
#[derive(Debug, Default, Clone)]
pub struct DraftEntry {
    pub class_id: Option<String>,
    pub subject_id: Option<String>,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub room: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFailure {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInsert {
    pub inserted: Vec<String>,
    pub skipped: Vec<usize>,
    pub failed: Vec<RowFailure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub entries: Vec<DateSheetEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Blank cells before day 1, Sunday-first.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<DateSheetEntry> {
    let date_raw: String = row.get(5)?;
    let exam_date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let time_raw: Option<String> = row.get(6)?;
    Ok(DateSheetEntry {
        id: row.get(0)?,
        class_id: row.get(1)?,
        class_name: row.get(2)?,
        subject_id: row.get(3)?,
        subject_name: row.get(4)?,
        exam_date,
        exam_time: time_raw.as_deref().and_then(parse_exam_time),
        room: row.get(7)?,
        duration: row.get(8)?,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    // Accept full timestamps by keeping the date part.
    let date_part = t.get(..10).unwrap_or(t);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn insert_one(conn: &Connection, draft: &DraftEntry) -> RepoResult<Option<String>> {
    let (Some(class_id), Some(subject_id), Some(date_raw)) = (
        optional_text(draft.class_id.as_deref()),
        optional_text(draft.subject_id.as_deref()),
        optional_text(draft.exam_date.as_deref()),
    ) else {
        return Ok(None);
    };
    let exam_date = parse_date(&date_raw)
        .ok_or_else(|| RepoError::BadInput(format!("invalid date: {}", date_raw)))?;
    let exam_time = optional_text(draft.exam_time.as_deref());
    if let Some(t) = exam_time.as_deref() {
        if parse_exam_time(t).is_none() {
            return Err(RepoError::BadInput(format!("invalid time: {}", t)));
        }
    }
    catalog::class_name(conn, &class_id)?;
    if !catalog::subject_exists(conn, &subject_id)? {
        return Err(RepoError::NotFound("subject"));
    }

    // No clash detection: overlapping date/time/room entries are accepted.
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO date_sheet(id, class_id, subject_id, exam_date, exam_time, room, duration, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &id,
            &class_id,
            &subject_id,
            exam_date.format("%Y-%m-%d").to_string(),
            exam_time,
            optional_text(draft.room.as_deref()),
            optional_text(draft.duration.as_deref()),
            db::now_stamp(),
        ),
    )?;
    Ok(Some(id))
}

/// Inserts each complete row independently; incomplete rows are skipped and
/// a failing row does not stop the rest.
pub fn create(
    conn: &Connection,
    session: &Session,
    drafts: &[DraftEntry],
) -> RepoResult<BulkInsert> {
    require_admin(session, "editing the date sheet")?;
    let mut out = BulkInsert {
        inserted: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };
    for (index, draft) in drafts.iter().enumerate() {
        match insert_one(conn, draft) {
            Ok(Some(id)) => out.inserted.push(id),
            Ok(None) => out.skipped.push(index),
            Err(RepoError::Db(e)) => return Err(RepoError::Db(e)),
            Err(e) => {
                tracing::warn!(index, error = %e, "date sheet row rejected");
                out.failed.push(RowFailure {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(out)
}

/// Ascending by date, then time. Every role may read the schedule.
pub fn list(
    conn: &Connection,
    range: Option<(NaiveDate, NaiveDate)>,
) -> RepoResult<Vec<DateSheetEntry>> {
    let mut stmt = conn.prepare(
        "SELECT ds.id, ds.class_id, c.name, ds.subject_id, sub.name,
                ds.exam_date, ds.exam_time, ds.room, ds.duration
         FROM date_sheet ds
         JOIN classes c ON c.id = ds.class_id
         JOIN subjects sub ON sub.id = ds.subject_id",
    )?;
    let mut rows = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    if let Some((from, to)) = range {
        rows.retain(|r| r.exam_date >= from && r.exam_date <= to);
    }
    // Times are free text in the store; order in memory on parsed values.
    sort_date_sheet(&mut rows);
    Ok(rows)
}

pub fn delete(conn: &Connection, session: &Session, id: &str) -> RepoResult<()> {
    require_admin(session, "editing the date sheet")?;
    let changed = conn.execute("DELETE FROM date_sheet WHERE id = ?", [id])?;
    if changed == 0 {
        return Err(RepoError::NotFound("date sheet entry"));
    }
    Ok(())
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

pub fn month_grid(
    conn: &Connection,
    year: i32,
    month: u32,
) -> RepoResult<MonthGrid> {
    let (first, last) = month_bounds(year, month)
        .ok_or_else(|| RepoError::BadInput(format!("invalid month: {}-{}", year, month)))?;
    let mut entries = list(conn, Some((first, last)))?;
    let mut days = Vec::new();
    let mut date = first;
    loop {
        let (today, rest): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.exam_date == date);
        entries = rest;
        days.push(CalendarDay {
            day: date.day(),
            date,
            entries: today,
        });
        if date >= last {
            break;
        }
        match date.succ_opt() {
            Some(d) => date = d,
            None => break,
        }
    }
    Ok(MonthGrid {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}
