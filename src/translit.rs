// Phonetic Latin -> Urdu transliteration for text typed into edit fields.

const SINGLE: &[(char, &str)] = &[
    ('a', "ا"),
    ('b', "ب"),
    ('c', "چ"),
    ('d', "د"),
    ('e', "ع"),
    ('f', "ف"),
    ('g', "گ"),
    ('h', "ہ"),
    ('i', "ی"),
    ('j', "ج"),
    ('k', "ک"),
    ('l', "ل"),
    ('m', "م"),
    ('n', "ن"),
    ('o', "و"),
    ('p', "پ"),
    ('q', "ق"),
    ('r', "ر"),
    ('s', "س"),
    ('t', "ت"),
    ('u', "و"),
    ('v', "و"),
    ('w', "و"),
    ('x', "ش"),
    ('y', "ی"),
    ('z', "ز"),
    ('A', "آ"),
    ('B', "بھ"),
    ('D', "ڈ"),
    ('E', "ء"),
    ('G', "غ"),
    ('H', "ح"),
    ('I', "ئ"),
    ('J', "جھ"),
    ('K', "کھ"),
    ('L', "ل"),
    ('M', "م"),
    ('N', "ں"),
    ('O', "ۃ"),
    ('P', "پھ"),
    ('R', "ڑ"),
    ('S', "ص"),
    ('T', "ٹ"),
    ('W', "و"),
    ('X', "ژ"),
    ('Y', "ے"),
    ('Z', "ذ"),
    (';', "؛"),
    (',', "،"),
    ('?', "؟"),
    ('.', "۔"),
    ('1', "۱"),
    ('2', "۲"),
    ('3', "۳"),
    ('4', "۴"),
    ('5', "۵"),
    ('6', "۶"),
    ('7', "۷"),
    ('8', "۸"),
    ('9', "۹"),
    ('0', "۰"),
];

const DIGRAPHS: &[([char; 2], &str)] = &[
    (['s', 'h'], "ش"),
    (['k', 'h'], "خ"),
    (['t', 'h'], "تھ"),
    (['c', 'h'], "چ"),
    (['g', 'h'], "غ"),
    (['d', 'h'], "دھ"),
    (['p', 'h'], "پھ"),
    (['b', 'h'], "بھ"),
    (['j', 'h'], "جھ"),
    (['R', 'h'], "ڑھ"),
];

/// On-screen keyboard rows, top to bottom.
pub const KEYBOARD_ROWS: [&[&str]; 4] = [
    &["ق", "و", "ع", "ر", "ت", "ے", "و", "ی", "ہ", "پ"],
    &["ا", "س", "د", "ف", "گ", "ہ", "ج", "ک", "ل"],
    &["ز", "ش", "چ", "ط", "ب", "ن", "م"],
    &["ئ", "ء", "آ", "ڈ", "ٹ", "ڑ", "ژ", "ذ", "غ", "خ"],
];

fn single(c: char) -> Option<&'static str> {
    SINGLE.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

fn digraph(a: char, b: char) -> Option<&'static str> {
    DIGRAPHS
        .iter()
        .find(|(k, _)| k[0] == a && k[1] == b)
        .map(|(_, v)| *v)
}

/// Greedy left-to-right conversion. Digraphs win over single characters and
/// unmapped characters pass through unchanged.
pub fn transliterate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        if i + 1 < chars.len() {
            if let Some(v) = digraph(chars[i], chars[i + 1]) {
                out.push_str(v);
                i += 2;
                continue;
            }
        }
        match single(chars[i]) {
            Some(v) => out.push_str(v),
            None => out.push(chars[i]),
        }
        i += 1;
    }
    out
}

/// Applies one edit of a text field. `previous` is the committed text,
/// `next` the raw field content after the keystroke.
///
/// Deletions are accepted verbatim. Otherwise only the inserted segment
/// (between the common prefix and common suffix) is converted; committed
/// text on either side is never touched.
pub fn apply_edit(previous: &str, next: &str) -> String {
    let prev: Vec<char> = previous.chars().collect();
    let new: Vec<char> = next.chars().collect();
    if new.len() < prev.len() {
        return next.to_string();
    }

    let prefix = prev
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = prev.len().min(new.len()) - prefix;
    let suffix = prev
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let inserted: String = new[prefix..new.len() - suffix].iter().collect();
    let mut out: String = new[..prefix].iter().collect();
    out.push_str(&transliterate(&inserted));
    out.extend(new[new.len() - suffix..].iter());
    out
}

/// True when the text contains any Arabic-script codepoint.
pub fn is_rtl_text(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

pub fn is_rtl_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digraph_beats_two_singles() {
        assert_eq!(transliterate("kh"), "خ");
        assert_eq!(transliterate("shakh"), "شاخ");
        assert_eq!(transliterate("Rh"), "ڑھ");
    }

    #[test]
    fn unmapped_characters_pass_through() {
        assert_eq!(transliterate("F!"), "F!");
        assert_eq!(transliterate(" "), " ");
        assert_eq!(transliterate("12"), "۱۲");
    }

    #[test]
    fn greedy_never_backtracks() {
        // "s","h","h": the first pair is consumed as a digraph, the trailing
        // "h" stands alone.
        assert_eq!(transliterate("shh"), "شہ");
    }

    #[test]
    fn deletion_is_passed_through() {
        let before = "سلام";
        let after: String = before.chars().take(3).collect();
        assert_eq!(apply_edit(before, &after), after);
        // Even Latin leftovers are not re-converted on delete.
        assert_eq!(apply_edit("ab", "a"), "a");
    }

    #[test]
    fn appended_pair_is_one_digraph() {
        assert_eq!(apply_edit("سلام ", "سلام kh"), "سلام خ");
    }

    #[test]
    fn keystroke_by_keystroke_commits_each_char() {
        let step1 = apply_edit("", "k");
        assert_eq!(step1, "ک");
        let typed = format!("{}h", step1);
        assert_eq!(apply_edit(&step1, &typed), "کہ");
    }

    #[test]
    fn insertion_in_the_middle_keeps_both_sides() {
        assert_eq!(apply_edit("اب", "اmب"), "امب");
    }

    #[test]
    fn rtl_detection() {
        assert!(is_rtl_text("Class 2 اردو"));
        assert!(!is_rtl_text("English only"));
        assert!(!is_rtl_text(""));
    }
}
