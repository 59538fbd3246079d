use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    Principal,
    Teacher,
    Accountant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::Principal => "Principal",
            Role::Teacher => "Teacher",
            Role::Accountant => "Accountant",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Principal)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SuperAdmin" => Ok(Role::SuperAdmin),
            "Principal" => Ok(Role::Principal),
            "Teacher" => Ok(Role::Teacher),
            "Accountant" => Ok(Role::Accountant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PaperStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaperStatus::Draft => "Draft",
            PaperStatus::Submitted => "Submitted",
            PaperStatus::Approved => "Approved",
            PaperStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(PaperStatus::Draft),
            "Submitted" => Ok(PaperStatus::Submitted),
            "Approved" => Ok(PaperStatus::Approved),
            "Rejected" => Ok(PaperStatus::Rejected),
            other => Err(format!("unknown paper status: {}", other)),
        }
    }
}

/// Question category. Declaration order is the section order on paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    Short,
    Long,
}

impl QuestionType {
    pub const SECTION_ORDER: [QuestionType; 3] =
        [QuestionType::Mcq, QuestionType::Short, QuestionType::Long];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Short => "Short",
            QuestionType::Long => "Long",
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MCQ" | "Mcq" | "mcq" => Ok(QuestionType::Mcq),
            "Short" | "short" => Ok(QuestionType::Short),
            "Long" | "long" => Ok(QuestionType::Long),
            other => Err(format!("unknown question type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPaper {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: Option<String>,
    pub class_id: String,
    pub class_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub exam_type: String,
    pub duration: String,
    pub mcq_instruction: Option<String>,
    pub short_instruction: Option<String>,
    pub long_instruction: Option<String>,
    pub status: PaperStatus,
    pub created_at: String,
}

impl ExamPaper {
    pub fn instruction_for(&self, kind: QuestionType) -> Option<&str> {
        let v = match kind {
            QuestionType::Mcq => self.mcq_instruction.as_deref(),
            QuestionType::Short => self.short_instruction.as_deref(),
            QuestionType::Long => self.long_instruction.as_deref(),
        };
        v.map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub paper_id: String,
    pub text: String,
    pub kind: QuestionType,
    pub marks: Option<u32>,
    /// JSON array of option strings, multiple-choice only.
    pub options_json: Option<String>,
}

impl Question {
    /// Parsed option list. Anything that is not a JSON array of strings
    /// yields an empty list and renders as blank slots.
    pub fn options(&self) -> Vec<String> {
        self.options_json
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default()
    }
}

pub fn total_marks(questions: &[Question]) -> u32 {
    questions.iter().map(|q| q.marks.unwrap_or(0)).sum()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusEntry {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: Option<String>,
    pub class_id: String,
    pub class_name: String,
    /// `None` is the whole-class placeholder.
    pub subject_id: Option<String>,
    pub subject_name: Option<String>,
    pub term: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSheetEntry {
    pub id: String,
    pub class_id: String,
    pub class_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub exam_date: chrono::NaiveDate,
    pub exam_time: Option<chrono::NaiveTime>,
    pub room: Option<String>,
    pub duration: Option<String>,
}

/// Ascending by date, then by time of day; untimed entries lead their date.
pub fn sort_date_sheet(entries: &mut [DateSheetEntry]) {
    entries.sort_by(|a, b| {
        a.exam_date
            .cmp(&b.exam_date)
            .then_with(|| a.exam_time.cmp(&b.exam_time))
    });
}

pub fn parse_exam_time(raw: &str) -> Option<chrono::NaiveTime> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| chrono::NaiveTime::parse_from_str(t, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn q(marks: Option<u32>) -> Question {
        Question {
            id: String::new(),
            paper_id: String::new(),
            text: "q".into(),
            kind: QuestionType::Short,
            marks,
            options_json: None,
        }
    }

    fn entry(date: &str, time: Option<&str>) -> DateSheetEntry {
        DateSheetEntry {
            id: format!("{}-{:?}", date, time),
            class_id: "c".into(),
            class_name: "5th".into(),
            subject_id: "s".into(),
            subject_name: "Maths".into(),
            exam_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
            exam_time: time.and_then(parse_exam_time),
            room: None,
            duration: None,
        }
    }

    #[test]
    fn total_marks_treats_missing_as_zero() {
        let qs = vec![q(Some(5)), q(None), q(Some(10))];
        assert_eq!(total_marks(&qs), 15);
        assert_eq!(total_marks(&[]), 0);
    }

    #[test]
    fn date_sheet_sorts_by_date_then_time() {
        let mut rows = vec![
            entry("2026-11-02", Some("09:00")),
            entry("2026-10-30", Some("13:30")),
            entry("2026-10-30", Some("08:00")),
            entry("2026-10-30", None),
        ];
        sort_date_sheet(&mut rows);
        let keys: Vec<(NaiveDate, Option<chrono::NaiveTime>)> =
            rows.iter().map(|r| (r.exam_date, r.exam_time)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(rows[0].exam_time, None);
        assert_eq!(rows[3].exam_date.to_string(), "2026-11-02");
    }

    #[test]
    fn options_tolerate_garbage() {
        let mut question = q(Some(1));
        question.kind = QuestionType::Mcq;
        question.options_json = Some("[\"x\",\"y\"]".into());
        assert_eq!(question.options(), vec!["x", "y"]);
        question.options_json = Some("not json".into());
        assert!(question.options().is_empty());
    }

    #[test]
    fn parses_common_time_formats() {
        assert!(parse_exam_time("09:30").is_some());
        assert!(parse_exam_time("9:30 AM").is_some());
        assert!(parse_exam_time("   ").is_none());
    }
}
