//! Rendering: from the raw answer schema to a presentational tree.
//!
//! The tree is pure data (serde-serializable), produced by a stateless walk
//! over the fetched document. Same document + same subject ⇒ same tree,
//! always in document order. A node missing its expected children renders as
//! empty, never as an error; an unrecognized category renders as a visible
//! diagnostic fragment.

use serde::Serialize;
use serde_json::Value;

use crate::domain::Subject;
use crate::schema::{Question, Section};

pub mod latex;
pub mod mandarin;
pub mod math;

/// One presentational building block. Frontends map these 1:1 onto markup;
/// the backend never deals in markup itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    /// Inline spans rendered together on one line, sharing a decoration.
    TextGroup { decoration: Decoration, spans: Vec<String> },
    /// One verbatim block line (equations, operation items, measurements).
    Block { text: String },
    /// 2-D grid, row-major.
    Table { rows: Vec<Vec<String>> },
    /// One group of checkboxes.
    CheckboxGroup { items: Vec<CheckboxItem> },
    /// Matching widget layers, one row per layer. Connection lines are never
    /// drawn; a `Hint` fragment points at the original worksheet instead.
    MatchingGrid { layers: Vec<Vec<String>> },
    /// Fixed see-the-original-worksheet hint line.
    Hint { text: String },
    /// Simplified LaTeX expressions shown inline as one group.
    TexGroup { exprs: Vec<String> },
    /// Mandarin vocabulary words, inline.
    WordList { words: Vec<String> },
    /// Mandarin words with phonetic annotations positioned above.
    AnnotatedWords { pairs: Vec<AnnotatedWord> },
    /// Diagnostic fallback for an unrecognized category: a visible marker
    /// with the literal tag, plus the raw node dumped for developer
    /// visibility.
    Unknown { category: String, message: String, raw: Value },
}

impl Fragment {
    /// Diagnostic fallback with its visible marker text.
    pub fn unknown(category: String, raw: Value) -> Fragment {
        let message = format!("未知題型: {category}");
        Fragment::Unknown { category, message, raw }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    #[default]
    None,
    Overline,
    Underline,
}

impl Decoration {
    /// Unrecognized decoration names degrade to plain text.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "overline" => Decoration::Overline,
            "underline" => Decoration::Underline,
            _ => Decoration::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckboxItem {
    pub checked: bool,
    pub label: Option<String>,
}

impl CheckboxItem {
    pub fn glyph(&self) -> char {
        if self.checked {
            '✓'
        } else {
            '○'
        }
    }
}

// Serialized with the glyph included, so clients show the same mark the
// rule picked (✓ for checked, ○ otherwise).
impl Serialize for CheckboxItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("CheckboxItem", 3)?;
        st.serialize_field("checked", &self.checked)?;
        st.serialize_field("glyph", &self.glyph())?;
        if let Some(label) = &self.label {
            st.serialize_field("label", label)?;
        }
        st.end()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotatedWord {
    pub word: String,
    /// Joined zhuyin symbols for this word, when the data carries them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zhuyin: Option<String>,
}

/// The rendered form of a whole answer file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub sections: Vec<RenderedSection>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub body: SectionBody,
}

/// Math sections hold one extra nesting level; Mandarin sections hold
/// questions directly. Which arm is built depends on the selected subject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionBody {
    Subsections(Vec<RenderedSubsection>),
    Questions(Vec<RenderedQuestion>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedSubsection {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub questions: Vec<RenderedQuestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedQuestion {
    /// Question label: explicit title from the data, else the 1-based index.
    pub number: String,
    pub fragments: Vec<Fragment>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All fragments in document order, across every nesting level.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.sections.iter().flat_map(|s| {
            let questions: Vec<&RenderedQuestion> = match &s.body {
                SectionBody::Subsections(subs) => subs.iter().flat_map(|b| b.questions.iter()).collect(),
                SectionBody::Questions(qs) => qs.iter().collect(),
            };
            questions.into_iter().flat_map(|q| q.fragments.iter())
        })
    }

    /// How many unrecognized-category fallbacks the document produced.
    /// Logged after every render so schema gaps stay visible.
    pub fn unknown_count(&self) -> usize {
        self.fragments().filter(|f| matches!(f, Fragment::Unknown { .. })).count()
    }
}

/// Walk a fetched document into its presentational tree.
pub fn render_document(doc: &[Section], subject: Subject) -> RenderedDocument {
    RenderedDocument {
        sections: doc.iter().map(|s| render_section(s, subject)).collect(),
    }
}

fn render_section(section: &Section, subject: Subject) -> RenderedSection {
    let body = match subject {
        Subject::Math => SectionBody::Subsections(
            section
                .section
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(render_subsection)
                .collect(),
        ),
        Subject::Mandarin => SectionBody::Questions(render_questions(section, mandarin::render_question)),
    };
    RenderedSection {
        title: section.title.clone(),
        subtitle: section.subtitle.clone(),
        body,
    }
}

fn render_subsection(section: &Section) -> RenderedSubsection {
    RenderedSubsection {
        title: section.title.clone(),
        subtitle: section.subtitle.clone(),
        questions: render_questions(section, math::render_question),
    }
}

fn render_questions(section: &Section, render: fn(&Question) -> Vec<Fragment>) -> Vec<RenderedQuestion> {
    section
        .question
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, q)| RenderedQuestion { number: q.number(i), fragments: render(q) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Vec<Section> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn walker_preserves_section_order() {
        let sections = doc(json!([
            { "title": "三、應用", "question": [] },
            { "title": "一、寫寫看", "question": [] },
            { "title": "二、圈圈看", "question": [] }
        ]));
        let rendered = render_document(&sections, Subject::Mandarin);
        let titles: Vec<&str> = rendered.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["三、應用", "一、寫寫看", "二、圈圈看"]);
    }

    #[test]
    fn missing_children_render_empty_not_error() {
        // Math section without `section`, subsection without `question`,
        // question without `answers`: each level degrades to empty.
        let sections = doc(json!([
            { "title": "甲" },
            { "title": "乙", "section": [ { "title": "乙一" } ] },
            { "title": "丙", "section": [ { "title": "丙一", "question": [ {} ] } ] }
        ]));
        let rendered = render_document(&sections, Subject::Math);
        assert_eq!(rendered.sections.len(), 3);
        assert_eq!(rendered.sections[0].body, SectionBody::Subsections(vec![]));
        match &rendered.sections[2].body {
            SectionBody::Subsections(subs) => {
                assert_eq!(subs[0].questions.len(), 1);
                assert!(subs[0].questions[0].fragments.is_empty());
            }
            other => panic!("expected subsections, got {other:?}"),
        }
    }

    #[test]
    fn mandarin_sections_hold_questions_directly() {
        let sections = doc(json!([
            { "title": "一、語詞", "question": [
                { "category": "vocabulary", "answers": ["日出", "月亮"] }
            ] }
        ]));
        let rendered = render_document(&sections, Subject::Mandarin);
        match &rendered.sections[0].body {
            SectionBody::Questions(qs) => {
                assert_eq!(qs.len(), 1);
                assert_eq!(qs[0].number, "1");
                assert_eq!(
                    qs[0].fragments,
                    vec![Fragment::WordList { words: vec!["日出".into(), "月亮".into()] }]
                );
            }
            other => panic!("expected questions, got {other:?}"),
        }
    }

    #[test]
    fn fragment_iterator_spans_both_layouts() {
        let math = doc(json!([
            { "title": "A", "section": [ { "title": "A1", "question": [
                { "answers": [ { "category": "equation", "extras": { "items": ["1+1=2"] } } ] }
            ] } ] }
        ]));
        let rendered = render_document(&math, Subject::Math);
        assert_eq!(rendered.fragments().count(), 1);
        assert_eq!(rendered.unknown_count(), 0);
    }
}
