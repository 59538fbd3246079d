use crate::model::{total_marks, ExamPaper, Question, QuestionType};
use crate::translit::is_rtl_text;

use super::layout::{Align, Cell, Paragraph, Rgb, Row, TextStyle, Unit};
use super::output::normalize_file_name;
use super::script::{vocabulary, Direction, Vocabulary};
use super::{school_header, Document, Footer, Letterhead};

const MCQ_SLOTS: usize = 4;

pub fn paper_direction(paper: &ExamPaper, questions: &[Question]) -> Direction {
    if is_rtl_text(&paper.subject_name) || questions.iter().any(|q| is_rtl_text(&q.text)) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

pub fn file_name(paper: &ExamPaper, direction: Direction) -> String {
    let raw = match direction {
        Direction::Ltr => format!("{}_{}_Exam.pdf", paper.subject_name, paper.class_name),
        Direction::Rtl => format!("{}_Urdu_Exam.pdf", paper.subject_name),
    };
    normalize_file_name(&raw)
}

fn header_unit(
    paper: &ExamPaper,
    questions: &[Question],
    letterhead: &Letterhead,
    vocab: &Vocabulary,
    dir: Direction,
) -> Unit {
    let mut unit = Unit::new();
    school_header(&mut unit, letterhead, Rgb::BLUE, 28.0);
    unit.paragraph(
        Paragraph::new(
            format!("{} {}", paper.exam_type, vocab.examination),
            TextStyle::new(20.0).color(Rgb::GRAY),
        )
        .align(Align::Center),
    );
    unit.rule(1.0, Rgb::LIGHT_GRAY);

    let meta = TextStyle::new(15.0);
    let line = |label: &str, value: &str, align: Align| {
        Paragraph::new(format!("{}: {}", label, value), meta)
            .direction(dir)
            .align(align)
    };
    let total = total_marks(questions).to_string();
    unit.row(
        Row::new(vec![
            Cell::stack(vec![
                line(vocab.subject, &paper.subject_name, Align::Start),
                line(vocab.class, &paper.class_name, Align::Start),
            ]),
            Cell::stack(vec![
                line(vocab.time, &paper.duration, Align::End),
                line(vocab.total_marks, &total, Align::End),
            ]),
        ])
        .direction(dir),
    );
    unit.rule(1.0, Rgb::LIGHT_GRAY);
    unit.paragraph(
        Paragraph::new(vocab.general_instructions, TextStyle::new(13.0).italic()).direction(dir),
    );
    unit.space(12.0);
    unit
}

fn section_heading(unit: &mut Unit, paper: &ExamPaper, kind: QuestionType, vocab: &Vocabulary, dir: Direction) {
    let instruction = paper
        .instruction_for(kind)
        .unwrap_or_else(|| vocab.default_instruction(kind));
    unit.paragraph(
        Paragraph::new(vocab.section_title(kind), TextStyle::new(19.0).bold()).direction(dir),
    );
    unit.paragraph(
        Paragraph::new(
            format!("{}: {}", vocab.instruction, instruction),
            TextStyle::new(13.0).italic(),
        )
        .direction(dir),
    );
    unit.space(10.0);
}

/// Options in original order, padded with blank slots to four, two per row.
fn option_rows(options: &[String], vocab: &Vocabulary, dir: Direction) -> Vec<Row> {
    let mut labelled: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| format!("{} {}", vocab.option_label(i), opt))
        .collect();
    while labelled.len() < MCQ_SLOTS {
        labelled.push(format!("{} ", vocab.option_label(labelled.len())));
    }
    let style = TextStyle::new(15.0);
    labelled
        .chunks(2)
        .map(|pair| {
            let mut cells = vec![Cell::new(Paragraph::new("", style)).weight(0.6)];
            for text in pair {
                cells.push(Cell::new(Paragraph::new(text.trim_end(), style).direction(dir)).weight(4.7));
            }
            if pair.len() == 1 {
                cells.push(Cell::new(Paragraph::new("", style)).weight(4.7));
            }
            Row::new(cells).direction(dir).gap(8.0)
        })
        .collect()
}

fn question_blocks(unit: &mut Unit, number: usize, q: &Question, vocab: &Vocabulary, dir: Direction) {
    let body = TextStyle::new(16.0);
    let marks = q
        .marks
        .map(|m| format!("({} {})", m, vocab.marks))
        .unwrap_or_default();
    unit.row(
        Row::new(vec![
            Cell::new(Paragraph::new(format!("{}.", number), body.bold()).direction(dir)).weight(0.6),
            Cell::new(Paragraph::new(q.text.as_str(), body).direction(dir)).weight(7.8),
            Cell::new(
                Paragraph::new(marks, body.italic().color(Rgb::GRAY))
                    .direction(dir)
                    .align(Align::End),
            )
            .weight(1.6),
        ])
        .direction(dir)
        .gap(6.0),
    );
    if q.kind == QuestionType::Mcq {
        for row in option_rows(&q.options(), vocab, dir) {
            unit.row(row);
        }
    }
    unit.space(12.0);
}

/// Header, then the non-empty sections in fixed order. Each section after
/// the first starts on a new page; its heading travels with its first
/// question so it is never stranded at a page bottom.
pub fn exam_document(paper: &ExamPaper, questions: &[Question], letterhead: &Letterhead) -> Document {
    let dir = paper_direction(paper, questions);
    let vocab = vocabulary(dir);
    let mut units = vec![header_unit(paper, questions, letterhead, vocab, dir)];

    let mut first_section = true;
    for kind in QuestionType::SECTION_ORDER {
        let section: Vec<&Question> = questions.iter().filter(|q| q.kind == kind).collect();
        if section.is_empty() {
            continue;
        }
        for (i, q) in section.iter().enumerate() {
            let mut unit = Unit::new();
            if i == 0 {
                if !first_section {
                    unit = unit.break_before();
                }
                section_heading(&mut unit, paper, kind, vocab, dir);
            }
            question_blocks(&mut unit, i + 1, q, vocab, dir);
            units.push(unit);
        }
        first_section = false;
    }

    Document {
        title: format!("{} {} - {}", paper.subject_name, paper.exam_type, paper.class_name),
        file_name: file_name(paper, dir),
        units,
        footer: Footer {
            left: vocab.prepared_by.to_string(),
            right: vocab.approved_by.to_string(),
            vocabulary: vocab,
            direction: dir,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaperStatus;
    use std::path::PathBuf;

    use crate::render::fonts::{FontSet, TrueTypeFont};
    use crate::render::layout::{layout_unit, Item};
    use crate::render::paginate::{compose, paginate, PageGeometry};
    use crate::render::render_pdf;

    fn paper(subject: &str) -> ExamPaper {
        ExamPaper {
            id: "p1".into(),
            teacher_id: "t1".into(),
            teacher_name: None,
            class_id: "c1".into(),
            class_name: "5th".into(),
            subject_id: "s1".into(),
            subject_name: subject.into(),
            exam_type: "Mid Term".into(),
            duration: "2 Hours".into(),
            mcq_instruction: None,
            short_instruction: Some("  ".into()),
            long_instruction: Some("Attempt any two.".into()),
            status: PaperStatus::Draft,
            created_at: String::new(),
        }
    }

    fn question(text: &str, kind: QuestionType, marks: Option<u32>, options: Option<&str>) -> Question {
        Question {
            id: text.into(),
            paper_id: "p1".into(),
            text: text.into(),
            kind,
            marks,
            options_json: options.map(str::to_string),
        }
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.units
            .iter()
            .flat_map(|u| u.texts().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn sections_follow_fixed_order_and_empty_ones_vanish() {
        let qs = vec![
            question("Explain photosynthesis.", QuestionType::Long, Some(10), None),
            question("Capital of Pakistan?", QuestionType::Mcq, Some(1), Some(r#"["Lahore","Islamabad"]"#)),
            question("Largest planet?", QuestionType::Mcq, None, Some("not json")),
        ];
        let doc = exam_document(&paper("Science"), &qs, &Letterhead::new("FJS"));
        let all = texts(&doc);
        let pos = |needle: &str| all.iter().position(|t| t.contains(needle));

        let a = pos("SECTION - A").expect("mcq section");
        let c = pos("SECTION - C").expect("long section");
        assert!(a < c);
        assert!(pos("SECTION - B").is_none());
        assert!(pos("Attempt any 5").is_none());
        assert!(pos("Instruction: Attempt all questions.").is_some());
        assert!(pos("Instruction: Attempt any two.").is_some());
        assert!(pos("Total Marks: 11").is_some());
        assert!(pos("(a) Lahore").is_some());
        assert!(all.iter().any(|t| t == "(d)"));

        // header, two MCQs, one long question; the long section breaks.
        assert_eq!(doc.units.len(), 4);
        assert!(!doc.units[1].break_before);
        assert!(doc.units[3].break_before);
        assert_eq!(doc.file_name, "Science_5th_Exam.pdf");
    }

    #[test]
    fn numbering_restarts_per_section() {
        let qs = vec![
            question("s1", QuestionType::Short, Some(2), None),
            question("s2", QuestionType::Short, Some(2), None),
            question("l1", QuestionType::Long, Some(5), None),
        ];
        let doc = exam_document(&paper("English"), &qs, &Letterhead::new("FJS"));
        let all = texts(&doc);
        assert_eq!(all.iter().filter(|t| *t == "1.").count(), 2);
        assert_eq!(all.iter().filter(|t| *t == "2.").count(), 1);
        assert!(all.iter().any(|t| t == "Instruction: Attempt any 5 questions."));
    }

    #[test]
    fn fifth_option_uses_its_position() {
        let qs = vec![question(
            "Pick one",
            QuestionType::Mcq,
            Some(1),
            Some(r#"["w","x","y","z","v"]"#),
        )];
        let doc = exam_document(&paper("GK"), &qs, &Letterhead::new("FJS"));
        assert!(texts(&doc).iter().any(|t| t == "(5) v"));
    }

    #[test]
    fn urdu_papers_switch_vocabulary_and_need_a_font() {
        let qs = vec![question("پاکستان کا دارالحکومت؟", QuestionType::Mcq, Some(1), None)];
        let doc = exam_document(&paper("Urdu"), &qs, &Letterhead::new("FJS"));
        assert_eq!(doc.file_name, "Urdu_Urdu_Exam.pdf");
        assert_eq!(doc.footer.left, "تیار کردہ: شعبہ امتحانات");
        let all = texts(&doc);
        assert!(all.iter().any(|t| t == "حصہ اول (کثیر الانتخابی سوالات)"));
        assert!(all.iter().any(|t| t == "(الف)"));

        let err = render_pdf(&doc, &FontSet::builtin(), &PageGeometry::default()).expect_err("no font");
        assert_eq!(err.code(), "font_unavailable");
    }

    #[test]
    fn long_papers_paginate_with_a_footer_on_every_page() {
        let qs: Vec<Question> = (0..60)
            .map(|i| question(&format!("Question number {}", i), QuestionType::Short, Some(2), None))
            .collect();
        let doc = exam_document(&paper("History"), &qs, &Letterhead::new("FJS"));
        let rendered = render_pdf(&doc, &FontSet::builtin(), &PageGeometry::default()).expect("pdf");
        assert!(rendered.pages >= 3);
        let raw = String::from_utf8_lossy(&rendered.bytes);
        assert!(raw.contains(&format!("(Page {} of {})", rendered.pages, rendered.pages)));
        assert!(raw.contains("(Prepared by: Examination Dept.)"));
    }

    #[test]
    fn question_taller_than_a_page_continues_on_the_next() {
        let text: Vec<String> = (0..70).map(|i| format!("Step {} of the derivation", i)).collect();
        let qs = vec![question(&text.join("\n"), QuestionType::Long, Some(20), None)];
        let doc = exam_document(&paper("Physics"), &qs, &Letterhead::new("FJS"));

        let geometry = PageGeometry::default();
        let band = geometry.band_height();
        let fonts = FontSet::builtin();
        let laid: Vec<_> = doc
            .units
            .iter()
            .map(|u| layout_unit(u, geometry.content_width(), &fonts))
            .collect();
        let pages = paginate(compose(&laid, band), band);
        assert!(pages.len() >= 2);

        let mut seen = Vec::new();
        let mut per_page = Vec::new();
        for page in &pages {
            let mut on_page = 0;
            for item in &page.items {
                if let Item::Text { y, text, .. } = item {
                    assert!(*y <= band, "{:?} drawn below the band at {}", text, y);
                    seen.push(text.clone());
                    on_page += 1;
                }
            }
            per_page.push(on_page);
        }
        assert!(per_page[0] > 0 && per_page[1] > 0, "text per page {:?}", per_page);
        for line in &text {
            assert!(seen.contains(line), "{} missing", line);
        }
        assert!(seen.iter().any(|t| t == "(20 Marks)"));
    }

    #[test]
    fn urdu_paper_embeds_the_configured_face() {
        let path = std::env::var_os("EXAMDESK_TEST_FONT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        if !path.exists() {
            eprintln!("skipping: no TrueType face at {}", path.display());
            return;
        }
        let font = TrueTypeFont::load(&path).expect("font parses");
        assert!(font.has_glyph('\u{0627}'), "{} has no Arabic glyphs", path.display());
        let (alef, advance) = font.glyph('\u{0627}');
        assert_ne!(alef, 0);
        let fonts = FontSet::with_truetype(font);

        let qs = vec![question("پاکستان کا دارالحکومت؟", QuestionType::Short, Some(2), None)];
        let doc = exam_document(&paper("Urdu"), &qs, &Letterhead::new("FJS"));
        let rendered = render_pdf(&doc, &fonts, &PageGeometry::default()).expect("pdf");
        let raw = String::from_utf8_lossy(&rendered.bytes);

        assert!(raw.contains("/Subtype /Type0"));
        assert!(raw.contains("/Encoding /Identity-H"));
        assert!(raw.contains("/Subtype /CIDFontType2"));
        assert!(raw.contains("/FontFile2"));
        assert!(raw.contains("/ToUnicode"));
        assert!(raw.contains("beginbfchar"));
        assert!(raw.contains(&format!("<{:04X}> <0627>", alef)));
        let width = (advance * 1000.0).round() as i32;
        assert!(raw.contains(&format!("{} [{}]", alef, width)));
    }
}
