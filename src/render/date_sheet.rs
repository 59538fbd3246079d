use chrono::{Datelike, NaiveDateTime};

use crate::model::{sort_date_sheet, DateSheetEntry};

use super::layout::{Align, Cell, Paragraph, Rgb, Row, TextStyle, Unit};
use super::output::normalize_file_name;
use super::script::{Direction, ENGLISH};
use super::{signature_row, Document, Footer, Letterhead};

pub const DEFAULT_NOTES: [&str; 2] = [
    "Timing for all exams is 8:00 AM to 12:00 PM.",
    "All school dues MUST be paid before the start of examinations.",
];

const COLUMNS: [(&str, f32); 6] = [
    ("Date", 1.3),
    ("Day", 1.4),
    ("Class", 1.1),
    ("Subject", 1.8),
    ("Time", 1.1),
    ("Room", 0.9),
];

const PLACEHOLDER: &str = "---";

fn table_row(values: [String; 6], header: bool) -> Row {
    let mut style = TextStyle::new(14.0).leading(1.4);
    if header {
        style = style.bold();
    }
    let cells = values
        .into_iter()
        .zip(COLUMNS)
        .map(|(v, (_, weight))| Cell::new(Paragraph::new(v, style).direction(Direction::Ltr)).weight(weight))
        .collect();
    let row = Row::new(cells).padding(8.0).border(Rgb::BLACK);
    if header {
        row.fill(Rgb::SHADE)
    } else {
        row
    }
}

fn entry_values(e: &DateSheetEntry) -> [String; 6] {
    let or_placeholder = |v: Option<&str>| {
        v.map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(PLACEHOLDER)
            .to_string()
    };
    [
        e.exam_date.format("%d/%m/%Y").to_string(),
        e.exam_date.format("%A").to_string(),
        e.class_name.clone(),
        e.subject_name.clone(),
        e.exam_time
            .map(|t| t.format("%I:%M %p").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        or_placeholder(e.room.as_deref()),
    ]
}

/// Month label used in the heading and the file name when none is given.
pub fn month_label(entries: &[DateSheetEntry]) -> Option<String> {
    entries
        .iter()
        .map(|e| e.exam_date)
        .min()
        .map(|d| d.format("%B %Y").to_string())
}

pub fn file_name(month: &str) -> String {
    normalize_file_name(&format!("DateSheet_{}.pdf", month))
}

/// Schedule sorted by date then time, one unit per calendar month, then the
/// notes, signatures and the generation stamp.
pub fn date_sheet_document(
    entries: &[DateSheetEntry],
    month_name: Option<&str>,
    notes: &[String],
    letterhead: &Letterhead,
    generated_at: NaiveDateTime,
) -> Document {
    let mut sorted = entries.to_vec();
    sort_date_sheet(&mut sorted);
    let month = month_name
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| month_label(&sorted))
        .unwrap_or_else(|| "All".to_string());

    let mut header = Unit::new();
    header.paragraph(
        Paragraph::new(letterhead.school_name.to_uppercase(), TextStyle::new(26.0).bold())
            .align(Align::Center),
    );
    header.paragraph(
        Paragraph::new(
            format!("EXAMINATION DATE SHEET - {}", month),
            TextStyle::new(20.0).color(Rgb::SLATE),
        )
        .align(Align::Center),
    );
    header.rule(2.0, Rgb::BLACK);
    let mut units = vec![header];

    let mut groups: Vec<Vec<&DateSheetEntry>> = Vec::new();
    for e in &sorted {
        let same_month = groups.last().and_then(|g| g.last()).is_some_and(|prev| {
            prev.exam_date.year() == e.exam_date.year() && prev.exam_date.month() == e.exam_date.month()
        });
        if same_month {
            if let Some(g) = groups.last_mut() {
                g.push(e);
            }
        } else {
            groups.push(vec![e]);
        }
    }

    if groups.is_empty() {
        let mut unit = Unit::new();
        unit.space(20.0).paragraph(
            Paragraph::new("No examinations scheduled.", TextStyle::new(15.0).italic())
                .align(Align::Center),
        );
        units.push(unit);
    }
    for group in groups {
        let mut unit = Unit::new();
        let heading = group[0].exam_date.format("%B %Y").to_string();
        unit.space(16.0)
            .paragraph(Paragraph::new(heading, TextStyle::new(18.0).bold()))
            .space(6.0)
            .row(table_row(COLUMNS.map(|(name, _)| name.to_string()), true));
        for e in group {
            unit.row(table_row(entry_values(e), false));
        }
        units.push(unit);
    }

    let notes: Vec<String> = if notes.iter().any(|n| !n.trim().is_empty()) {
        notes.iter().filter(|n| !n.trim().is_empty()).cloned().collect()
    } else {
        DEFAULT_NOTES.iter().map(|n| n.to_string()).collect()
    };
    let note_style = TextStyle::new(15.0).bold();
    let mut paragraphs = vec![Paragraph::new("NOTE:", TextStyle::new(16.0).bold()).align(Align::Center)];
    paragraphs.extend(
        notes
            .iter()
            .enumerate()
            .map(|(i, n)| Paragraph::new(format!("{}. {}", i + 1, n.trim()), note_style)),
    );
    let mut note_unit = Unit::new();
    note_unit
        .space(20.0)
        .row(Row::new(vec![Cell::stack(paragraphs)]).padding(10.0).border(Rgb::BLACK));
    units.push(note_unit);

    let mut closing = Unit::new();
    closing
        .space(60.0)
        .row(signature_row("Examination In-charge", "Principal Signature"))
        .space(20.0)
        .paragraph(
            Paragraph::new(
                format!("Generated on: {}", generated_at.format("%d/%m/%Y %H:%M:%S")),
                TextStyle::new(10.0).color(Rgb::GRAY),
            )
            .align(Align::End),
        );
    units.push(closing);

    Document {
        title: format!("Examination Date Sheet {}", month),
        file_name: file_name(&month),
        units,
        footer: Footer::page_numbers(&ENGLISH, Direction::Ltr),
    }
}
