//! Built-in sample data.
//!
//! A miniature mapping plus one answer file per subject, so the viewer is
//! demonstrable without a data directory and tests have realistic fixtures.
//! The shapes mirror real publisher files, including the newline inside the
//! grade keys.

use serde_json::json;

use crate::domain::Subject;
use crate::loader::Mapping;
use crate::schema::AnswerDocument;

pub const SEED_MATH_LESSON: &str = "sample/math-u2.json";
pub const SEED_MANDARIN_LESSON: &str = "sample/mandarin-l1.json";

/// Minimal per-subject mapping covering one grade with two lessons.
pub fn seed_mapping(subject: Subject) -> Mapping {
  let value = match subject {
    Subject::Math => json!({
      "一年級\n113下學期": {
        "單元1": { "workbook": SEED_MATH_LESSON },
        "單元2": { "workbook": SEED_MATH_LESSON }
      }
    }),
    Subject::Mandarin => json!({
      "一年級\n113下學期": {
        "第一課": { "workbook": SEED_MANDARIN_LESSON, "words": "天空 白雲 太陽" },
        "第二課": { "sentence": SEED_MANDARIN_LESSON }
      }
    }),
  };
  serde_json::from_value(value).expect("seed mapping is valid")
}

/// The sample answer file for a seed lesson path, if it is one.
pub fn seed_answers(subject: Subject, path: &str) -> Option<AnswerDocument> {
  let value = match (subject, path) {
    (Subject::Math, SEED_MATH_LESSON) => json!([
      {
        "title": "一、基本練習",
        "section": [
          {
            "title": "算算看",
            "question": [
              {
                "title": 1,
                "answers": [
                  { "category": "equation", "extras": { "items": ["7+5=12", "12-5=7"] } },
                  { "category": "tex", "extras": { "tex": [["\\frac{1}{2}\\times\\frac{3}{4}"]] } }
                ]
              },
              {
                "title": 2,
                "answers": [
                  { "category": "checkbox", "extras": { "items": [[
                    { "checked": "checked", "value": "25" },
                    { "checked": "", "value": "52" }
                  ]] } }
                ]
              }
            ]
          },
          {
            "title": "圈圈看",
            "subtitle": "把正確的答案圈起來",
            "question": [
              {
                "answers": [
                  { "category": "matching", "extras": {
                    "layerWidgets": [["8", "9"], ["七", "八"]],
                    "multiConnections": [[0, 1]]
                  } }
                ]
              }
            ]
          }
        ]
      }
    ]),
    (Subject::Mandarin, SEED_MANDARIN_LESSON) => json!([
      {
        "title": "一、語詞練習",
        "question": [
          { "category": "vocabulary", "answers": ["天空", "白雲"] },
          { "category": "vocabularyZhuyin", "answers": ["太陽"], "zhuyin": [["ㄊㄞˋ", "ㄧㄤˊ"]] },
          { "category": "checkbox", "extras": { "items": [[
            { "checked": "checked", "value": "是" },
            { "checked": "", "value": "否" }
          ]] } }
        ]
      }
    ]),
    _ => return None,
  };
  Some(serde_json::from_value(value).expect("seed answers are valid"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::loader::lessons_for_grade;
  use crate::render::{render_document, Fragment};

  // End-to-end over the seed data: resolve a grade, pick the second lesson,
  // load and render it, and check that checkboxes came out as glyphs with no
  // unrecognized categories anywhere.
  #[test]
  fn seed_math_lesson_renders_checkboxes_without_fallbacks() {
    let mapping = seed_mapping(Subject::Math);
    let lessons = lessons_for_grade(&mapping, "一年級113下學期").expect("seed grade");
    assert_eq!(lessons[1].name, "單元2");

    let doc = seed_answers(Subject::Math, &lessons[1].path).expect("seed answers");
    let rendered = render_document(&doc, Subject::Math);

    let checked: usize = rendered
      .fragments()
      .filter_map(|f| match f {
        Fragment::CheckboxGroup { items } => Some(items.iter().filter(|i| i.glyph() == '✓').count()),
        _ => None,
      })
      .sum();
    assert!(checked >= 1, "expected at least one checked glyph");
    assert_eq!(rendered.unknown_count(), 0);
  }

  #[test]
  fn seed_mandarin_lesson_renders_cleanly() {
    let doc = seed_answers(Subject::Mandarin, SEED_MANDARIN_LESSON).expect("seed answers");
    let rendered = render_document(&doc, Subject::Mandarin);
    assert_eq!(rendered.unknown_count(), 0);
    assert!(rendered.fragments().any(|f| matches!(f, Fragment::AnnotatedWords { .. })));
  }
}
