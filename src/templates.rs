use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSubject {
    pub subject: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusTemplate {
    pub name: &'static str,
    pub class_name: &'static str,
    pub term: &'static str,
    pub note: &'static str,
    pub subjects: &'static [TemplateSubject],
}

pub const SYLLABUS_TEMPLATES: &[SyllabusTemplate] = &[SyllabusTemplate {
    name: "Class 2 Final Exam (Full Set)",
    class_name: "2nd",
    term: "Final Exam",
    note: "All work done in your books & copies.",
    subjects: &[
        TemplateSubject {
            subject: "English",
            content: "Lesson No# 07 Boating in the lake
Lesson No# 10 The little sparrow

Words / Meanings
Tick the correct option to answer each statement.
Write (T) for True and (F) for False.
Singular / Plural
Masculine / Feminine
Words / opposite
Question / Answers",
        },
        TemplateSubject {
            subject: "Mathematics",
            content: "Exercise 2.1 to 3.1
Addition (+) , Subtraction (-)
Notation one 1 to Fifty 50.
Table: 2, 3, 4, 5, 6, 7.
Shape name Circle, Square, Triangle
Rectangle, Cube, Cone, Cylinder
Cuboid.",
        },
        TemplateSubject {
            subject: "General Science",
            content: "Lesson No# 2 Our Flag
Lesson No# 6 Our Natural Environment Resources.

Fill in the blanks.
Words / Meanings. Tick the correct options.
Question / Answers
Tick (✓) the correct statement and Cross (X) the wrong ones.",
        },
        TemplateSubject {
            subject: "Drawing",
            content: "Draw (and colour it).

Ice cream, Drum, Kettle,
Parachute, Butterfly, Ladybird
Sparrow, Cock, Pear.",
        },
        TemplateSubject {
            subject: "Urdu",
            content: "سبق نمبر 3 رسولﷺ کا بچپن سچ بولنے سے
سبق نمبر 6 محنت کی پابندی

الفاظ / معنی ۔ سوالات / جوابات ۔

درست جواب پر (✓) کا نشان لگائیں ۔ خالی جگہ پُر کریں ۔

واحد / جمع ، مذکر / مونث ، الفاظ / متضاد",
        },
        TemplateSubject {
            subject: "Islamiat",
            content: "سبق نمبر 2 آخرت ، روزہ ، عیدین

اسلامی تہوار ، حضرت محمد رسول اللہ ﷺ کی بعثت اور امانت

الفاظ / معنی ، سوالات / جوابات ۔

درست جواب پر (✓) کا نشان لگائیں ۔

خالی جگہ پُر کریں ۔
“ قائم / دائم / ناکام “",
        },
        TemplateSubject {
            subject: "Nazra",
            content: "تعوذ اور تسمیہ ، درود شریف

سورۃ الفلق ، سورۃ الناس ، نماز ، درودِ ابراہیمی

کلمہ طیبہ ، بیت الخلاء میں جانے اور نکلنے کی دعا ۔

علم میں اضافے کی دعا ، سونے اور جاگنے کی دعا ۔",
        },
    ],
}];

pub fn find(name: &str) -> Option<&'static SyllabusTemplate> {
    SYLLABUS_TEMPLATES.iter().find(|t| t.name == name)
}
