use crate::model::SyllabusEntry;

use super::script::is_rtl_subject;
use crate::translit::is_rtl_text;

const BOM: &str = "\u{feff}";

const STYLE: &str = "body { font-family: 'Calibri', 'Segoe UI', Arial, sans-serif; }
.header-info { text-align: center; border-bottom: 2pt solid #000; padding-bottom: 10pt; margin-bottom: 20pt; }
.school-name { font-size: 24pt; font-weight: bold; margin: 0; text-transform: uppercase; }
.exam-title { font-size: 18pt; font-weight: bold; margin: 5pt 0; text-decoration: underline; }
.section-block { margin-top: 20pt; page-break-inside: avoid; }
.subject-title { font-size: 16pt; font-weight: bold; text-decoration: underline; margin-bottom: 10pt; display: block; }
.text-content { font-size: 12pt; margin-top: 10pt; text-align: left; }
.urdu { direction: rtl; text-align: right; font-family: 'Jameel Noori Nastaleeq', 'Noto Nastaliq Urdu', serif; font-size: 15pt; line-height: 2; }
.meta-data { font-size: 10pt; color: #555; font-style: italic; margin-top: 10pt; border-top: 1pt solid #eee; padding-top: 5pt; }
.signature-area { margin-top: 60pt; }";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One paragraph per source line; blank lines keep their spacing.
fn content_paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                "<p style=\"margin: 0; padding: 5pt 0;\">&nbsp;</p>".to_string()
            } else {
                format!(
                    "<p style=\"margin: 0; padding: 2pt 0; line-height: 1.5;\">{}</p>",
                    escape_html(line)
                )
            }
        })
        .collect()
}

pub fn file_name(title: &str) -> String {
    format!("{}.doc", title.trim().replace(' ', "_"))
}

/// Word-readable HTML document for a list of syllabus blocks, prefixed with
/// a UTF-8 byte order mark.
pub fn syllabus_document(school_name: &str, title: &str, entries: &[SyllabusEntry]) -> String {
    let mut html = String::new();
    html.push_str(BOM);
    html.push_str(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
         xmlns:w='urn:schemas-microsoft-com:office:word' \
         xmlns='http://www.w3.org/TR/REC-html40'>\n",
    );
    html.push_str(&format!(
        "<head><meta charset='utf-8'><title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n",
        escape_html(title),
        STYLE
    ));
    html.push_str(&format!(
        "<div class=\"header-info\">\n<p class=\"school-name\">{}</p>\n<p class=\"exam-title\">&ldquo;{}&rdquo;</p>\n</div>\n",
        escape_html(school_name),
        escape_html(title)
    ));

    for entry in entries {
        let subject = entry.subject_name.as_deref().unwrap_or("Full Class");
        let urdu = is_rtl_subject(subject) || is_rtl_text(&entry.content);
        html.push_str(&format!(
            "<div class=\"section-block\">\n<div class=\"subject-title\">SUBJECT: {} (CLASS: {})</div>\n",
            escape_html(&subject.to_uppercase()),
            escape_html(&entry.class_name)
        ));
        html.push_str(&format!(
            "<div class=\"text-content{}\">{}</div>\n",
            if urdu { " urdu" } else { "" },
            content_paragraphs(&entry.content)
        ));
        html.push_str(&format!(
            "<div class=\"meta-data\">Teacher: {}</div>\n</div>\n",
            escape_html(entry.teacher_name.as_deref().unwrap_or("N/A"))
        ));
    }

    html.push_str(
        "<div class=\"signature-area\">\n<table width=\"100%\" style=\"margin-top: 40pt;\">\n<tr>\n\
         <td width=\"50%\" align=\"left\" style=\"border-top: 1pt solid #000; padding-top: 5pt;\"><b>Examination Incharge Signature</b></td>\n\
         <td width=\"50%\" align=\"right\" style=\"border-top: 1pt solid #000; padding-top: 5pt;\"><b>Principal's Approval</b></td>\n\
         </tr>\n</table>\n</div>\n</body>\n</html>\n",
    );
    html
}
