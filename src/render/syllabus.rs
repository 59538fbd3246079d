use chrono::NaiveDate;

use crate::model::SyllabusEntry;
use crate::translit::is_rtl_text;

use super::layout::{Align, Cell, Paragraph, Rgb, Row, TextStyle, Unit};
use super::output::normalize_file_name;
use super::script::{is_rtl_subject, Direction, ENGLISH};
use super::{note_box, signature_row, Document, Footer, Letterhead};

const FALLBACK_TERM: &str = "Final Exam";

fn term_label(term: &str) -> &str {
    let t = term.trim();
    if t.is_empty() {
        FALLBACK_TERM
    } else {
        t
    }
}

fn content_direction(entry: &SyllabusEntry) -> Direction {
    let by_subject = entry.subject_name.as_deref().is_some_and(is_rtl_subject);
    if by_subject || is_rtl_text(&entry.content) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

fn display_date(stamp: &str) -> String {
    stamp
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| stamp.to_string())
}

pub fn single_file_name(entry: &SyllabusEntry) -> String {
    match entry.subject_name.as_deref() {
        Some(subject) => normalize_file_name(&format!("{}_{}_Syllabus.pdf", subject, entry.class_name)),
        None => normalize_file_name(&format!("{}_Combined_Syllabus.pdf", entry.class_name)),
    }
}

pub fn combined_file_name(class_name: &str, term: &str) -> String {
    normalize_file_name(&format!("Syllabus_{}_{}.pdf", class_name, term_label(term)))
}

fn title_block(unit: &mut Unit, letterhead: &Letterhead, term: &str, school_size: f32) {
    unit.paragraph(
        Paragraph::new(
            letterhead.school_name.to_uppercase(),
            TextStyle::new(school_size).bold(),
        )
        .align(Align::Center),
    );
    unit.paragraph(
        Paragraph::new(
            format!("\u{201c}Syllabus for {}\u{201d}", term_label(term)),
            TextStyle::new(school_size - 4.0).bold().color(Rgb::SLATE),
        )
        .align(Align::Center),
    );
}

fn closing_units(units: &mut Vec<Unit>, footer_note: Option<&str>, left_signature: &str) {
    if let Some(note) = footer_note.map(str::trim).filter(|n| !n.is_empty()) {
        let mut unit = Unit::new();
        unit.space(30.0).row(note_box(note));
        units.push(unit);
    }
    let mut unit = Unit::new();
    unit.space(60.0)
        .row(signature_row(left_signature, "Principal's Approval"));
    units.push(unit);
}

/// One syllabus entry on its own document.
pub fn single_document(
    entry: &SyllabusEntry,
    footer_note: Option<&str>,
    letterhead: &Letterhead,
) -> Document {
    let mut header = Unit::new();
    title_block(&mut header, letterhead, &entry.term, 22.0);
    header.rule(2.0, Rgb::BLACK);
    let meta = TextStyle::new(16.0).bold();
    let subject = match entry.subject_name.as_deref() {
        Some(s) => format!("Subject: {}", s),
        None => "Full Class Syllabus".to_string(),
    };
    header.row(Row::new(vec![
        Cell::new(Paragraph::new(format!("Class: {}", entry.class_name), meta)),
        Cell::new(Paragraph::new(subject, meta).align(Align::Center)),
        Cell::new(
            Paragraph::new(format!("Date: {}", display_date(&entry.created_at)), TextStyle::new(14.0))
                .align(Align::End),
        ),
    ]));
    header.rule(1.5, Rgb::BLACK);
    header.paragraph(Paragraph::new(
        format!("Teacher: {}", entry.teacher_name.as_deref().unwrap_or("N/A")),
        TextStyle::new(14.0).bold(),
    ));
    header.space(10.0);

    let mut body = Unit::new();
    body.paragraph(
        Paragraph::new(entry.content.as_str(), TextStyle::new(15.0).leading(1.6))
            .direction(content_direction(entry)),
    );

    let mut units = vec![header, body];
    closing_units(&mut units, footer_note, "Incharge Signature");

    Document {
        title: format!("Syllabus {} {}", entry.class_name, term_label(&entry.term)),
        file_name: single_file_name(entry),
        units,
        footer: Footer::page_numbers(&ENGLISH, Direction::Ltr),
    }
}

/// Every subject block of one class and term. `None` for an empty list.
pub fn combined_document(
    entries: &[SyllabusEntry],
    footer_note: Option<&str>,
    letterhead: &Letterhead,
) -> Option<Document> {
    let first = entries.first()?;
    let mut header = Unit::new();
    title_block(&mut header, letterhead, &first.term, 28.0);
    header.paragraph(
        Paragraph::new(format!("Class: {}", first.class_name), TextStyle::new(20.0).bold())
            .align(Align::Center),
    );
    header.rule(2.0, Rgb::BLACK);

    let mut units = vec![header];
    for entry in entries {
        let mut unit = Unit::new();
        let heading = match entry.subject_name.as_deref() {
            Some(s) => format!("{}:", s),
            None => "Full Class Syllabus:".to_string(),
        };
        unit.space(25.0)
            .paragraph(
                Paragraph::new(heading, TextStyle::new(20.0).bold().underline())
                    .direction(Direction::Ltr),
            )
            .rule(2.0, Rgb::SLATE)
            .paragraph(
                Paragraph::new(
                    entry.content.as_str(),
                    TextStyle::new(16.0).leading(1.8).color(Rgb::SLATE),
                )
                .direction(content_direction(entry)),
            );
        units.push(unit);
    }
    closing_units(&mut units, footer_note, "Examination Incharge");

    Some(Document {
        title: format!("Syllabus {} {}", first.class_name, term_label(&first.term)),
        file_name: combined_file_name(&first.class_name, &first.term),
        units,
        footer: Footer::page_numbers(&ENGLISH, Direction::Ltr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::FontSet;
    use crate::render::paginate::PageGeometry;
    use crate::render::render_pdf;

    fn entry(subject: Option<&str>, content: &str) -> SyllabusEntry {
        SyllabusEntry {
            id: "s".into(),
            teacher_id: "t".into(),
            teacher_name: Some("Ms. Ayesha".into()),
            class_id: "c".into(),
            class_name: "2nd".into(),
            subject_id: subject.map(|_| "sub".to_string()),
            subject_name: subject.map(str::to_string),
            term: "Final Exam".into(),
            content: content.into(),
            created_at: "2026-10-18T09:30:00".into(),
        }
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.units
            .iter()
            .flat_map(|u| u.texts().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn single_document_layout() {
        let doc = single_document(
            &entry(Some("English"), "Lesson 7\n\nLesson 10"),
            Some("All work done in your books & copies."),
            &Letterhead::new("Fatima Jinnah School & College Kohat"),
        );
        let all = texts(&doc);
        assert!(all.contains(&"FATIMA JINNAH SCHOOL & COLLEGE KOHAT".to_string()));
        assert!(all.contains(&"\u{201c}Syllabus for Final Exam\u{201d}".to_string()));
        assert!(all.contains(&"Subject: English".to_string()));
        assert!(all.contains(&"Date: 18/10/2026".to_string()));
        assert!(all.contains(&"Teacher: Ms. Ayesha".to_string()));
        assert!(all.contains(&"Note:".to_string()));
        assert!(all.contains(&"Incharge Signature".to_string()));
        assert_eq!(doc.file_name, "English_2nd_Syllabus.pdf");

        let rendered = render_pdf(&doc, &FontSet::builtin(), &PageGeometry::default()).expect("pdf");
        assert_eq!(rendered.pages, 1);
    }

    #[test]
    fn whole_class_entry_is_labelled_and_named() {
        let mut e = entry(None, "Everything");
        e.term = " ".into();
        let doc = single_document(&e, None, &Letterhead::new("S"));
        let all = texts(&doc);
        assert!(all.contains(&"Full Class Syllabus".to_string()));
        assert!(!all.contains(&"Note:".to_string()));
        assert_eq!(doc.file_name, "2nd_Combined_Syllabus.pdf");
        assert!(all.contains(&"\u{201c}Syllabus for Final Exam\u{201d}".to_string()));
    }

    #[test]
    fn combined_document_has_a_unit_per_subject() {
        assert!(combined_document(&[], None, &Letterhead::new("S")).is_none());
        let entries = vec![entry(Some("English"), "a"), entry(Some("Drawing"), "b")];
        let doc = combined_document(&entries, None, &Letterhead::new("S")).expect("doc");
        // header, two subjects, signatures
        assert_eq!(doc.units.len(), 4);
        let all = texts(&doc);
        assert!(all.contains(&"Drawing:".to_string()));
        assert!(all.contains(&"Examination Incharge".to_string()));
        assert_eq!(doc.file_name, "Syllabus_2nd_Final_Exam.pdf");
    }

    #[test]
    fn urdu_subjects_render_right_to_left() {
        assert_eq!(content_direction(&entry(Some("Islamiat"), "Lesson 2")), Direction::Rtl);
        assert_eq!(content_direction(&entry(Some("English"), "سبق")), Direction::Rtl);
        assert_eq!(content_direction(&entry(None, "Lesson")), Direction::Ltr);
    }
}
