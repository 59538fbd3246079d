use crate::model::QuestionType;
use crate::translit::{is_rtl_char, is_rtl_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn of(text: &str) -> Self {
        if is_rtl_text(text) {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

/// Subjects typeset right-to-left whatever their content.
pub fn is_rtl_subject(name: &str) -> bool {
    let n = name.to_lowercase();
    ["urdu", "islamiat", "nazra"].iter().any(|s| n.contains(s))
}

/// Fixed strings of an exam paper in one script.
#[derive(Debug)]
pub struct Vocabulary {
    pub examination: &'static str,
    pub subject: &'static str,
    pub class: &'static str,
    pub time: &'static str,
    pub total_marks: &'static str,
    pub general_instructions: &'static str,
    pub instruction: &'static str,
    pub marks: &'static str,
    section_titles: [&'static str; 3],
    default_instructions: [&'static str; 3],
    pub option_labels: [&'static str; 4],
    pub prepared_by: &'static str,
    pub approved_by: &'static str,
    pub page_label: &'static str,
}

pub const ENGLISH: Vocabulary = Vocabulary {
    examination: "Examination",
    subject: "Subject",
    class: "Class",
    time: "Time",
    total_marks: "Total Marks",
    general_instructions:
        "Instructions: Attempt all questions. Use of calculator is permitted where necessary.",
    instruction: "Instruction",
    marks: "Marks",
    section_titles: [
        "SECTION - A (MULTIPLE CHOICE QUESTIONS)",
        "SECTION - B (SHORT QUESTIONS)",
        "SECTION - C (LONG QUESTIONS)",
    ],
    default_instructions: [
        "Attempt all questions.",
        "Attempt any 5 questions.",
        "Attempt any 3 questions.",
    ],
    option_labels: ["(a)", "(b)", "(c)", "(d)"],
    prepared_by: "Prepared by: Examination Dept.",
    approved_by: "Approved by: Principal",
    page_label: "Page {page} of {pages}",
};

pub const URDU: Vocabulary = Vocabulary {
    examination: "امتحان",
    subject: "مضمون",
    class: "جماعت",
    time: "وقت",
    total_marks: "کل نمبر",
    general_instructions: "ہدایات: تمام سوالات حل کریں۔",
    instruction: "ہدایت",
    marks: "نمبر",
    section_titles: [
        "حصہ اول (کثیر الانتخابی سوالات)",
        "حصہ دوم (مختصر سوالات)",
        "حصہ سوم (تفصیلی سوالات)",
    ],
    default_instructions: [
        "تمام سوالات حل کریں۔",
        "کوئی سے پانچ سوالات کے جوابات تحریر کریں۔",
        "کوئی سے تین سوالات کے جوابات تحریر کریں۔",
    ],
    option_labels: ["(الف)", "(ب)", "(ج)", "(د)"],
    prepared_by: "تیار کردہ: شعبہ امتحانات",
    approved_by: "دستخط پرنسپل",
    page_label: "صفحہ {page} از {pages}",
};

pub fn vocabulary(direction: Direction) -> &'static Vocabulary {
    match direction {
        Direction::Ltr => &ENGLISH,
        Direction::Rtl => &URDU,
    }
}

fn section_index(kind: QuestionType) -> usize {
    match kind {
        QuestionType::Mcq => 0,
        QuestionType::Short => 1,
        QuestionType::Long => 2,
    }
}

impl Vocabulary {
    pub fn section_title(&self, kind: QuestionType) -> &'static str {
        self.section_titles[section_index(kind)]
    }

    pub fn default_instruction(&self, kind: QuestionType) -> &'static str {
        self.default_instructions[section_index(kind)]
    }

    /// Label of the option at `index`; past the fourth the 1-based position.
    pub fn option_label(&self, index: usize) -> String {
        self.option_labels
            .get(index)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("({})", index + 1))
    }

    pub fn page_of(&self, page: usize, pages: usize) -> String {
        self.page_label
            .replace("{page}", &page.to_string())
            .replace("{pages}", &pages.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Rtl,
    Ltr,
    Neutral,
}

fn classify(c: char) -> Class {
    // Digits, Arabic-Indic ones included, keep left-to-right order.
    if c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c) || ('\u{06F0}'..='\u{06F9}').contains(&c)
    {
        Class::Ltr
    } else if is_rtl_char(c) {
        Class::Rtl
    } else if c.is_alphanumeric() {
        Class::Ltr
    } else {
        Class::Neutral
    }
}

fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        other => other,
    }
}

/// Reorders one line of right-to-left text into left-to-right drawing order:
/// run order is reversed, RTL runs are reversed and mirrored, embedded LTR
/// runs (words, numbers) keep their reading order. Neutrals between two LTR
/// characters join the LTR run; every other neutral takes the line direction.
pub fn visual_order(line: &str, direction: Direction) -> String {
    if direction == Direction::Ltr {
        return line.to_string();
    }
    let chars: Vec<char> = line.chars().collect();
    let classes: Vec<Class> = chars.iter().map(|c| classify(*c)).collect();
    let strong_before = |i: usize| classes[..i].iter().rev().find(|k| **k != Class::Neutral).copied();
    let strong_after = |i: usize| classes[i + 1..].iter().find(|k| **k != Class::Neutral).copied();

    let resolved: Vec<bool> = (0..chars.len())
        .map(|i| match classes[i] {
            Class::Rtl => true,
            Class::Ltr => false,
            Class::Neutral => {
                !(strong_before(i) == Some(Class::Ltr) && strong_after(i) == Some(Class::Ltr))
            }
        })
        .collect();

    let mut runs: Vec<(bool, Vec<char>)> = Vec::new();
    for (c, rtl) in chars.into_iter().zip(resolved) {
        match runs.last_mut() {
            Some((r, buf)) if *r == rtl => buf.push(c),
            _ => runs.push((rtl, vec![c])),
        }
    }

    let mut out = String::with_capacity(line.len());
    for (rtl, buf) in runs.into_iter().rev() {
        if rtl {
            out.extend(buf.into_iter().rev().map(mirror));
        } else {
            out.extend(buf);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtl_runs_reverse_and_ltr_runs_keep_order() {
        assert_eq!(visual_order("ابت", Direction::Rtl), "تبا");
        assert_eq!(visual_order("سبق 12 ب", Direction::Rtl), "ب 12 قبس");
        assert_eq!(visual_order("(الف) Pen drive", Direction::Rtl), "Pen drive (فلا)");
        assert_eq!(visual_order("plain", Direction::Ltr), "plain");
    }

    #[test]
    fn option_labels_fall_back_to_position() {
        assert_eq!(ENGLISH.option_label(0), "(a)");
        assert_eq!(URDU.option_label(3), "(د)");
        assert_eq!(ENGLISH.option_label(4), "(5)");
        assert_eq!(ENGLISH.page_of(2, 7), "Page 2 of 7");
    }

    #[test]
    fn urdu_family_subjects_are_rtl() {
        assert!(is_rtl_subject("Urdu"));
        assert!(is_rtl_subject("Islamiat (Compulsory)"));
        assert!(!is_rtl_subject("English"));
        assert_eq!(Direction::of("Lesson 1"), Direction::Ltr);
        assert_eq!(Direction::of("سبق 1"), Direction::Rtl);
    }
}
