//! Category renderer registry for Mandarin questions.
//!
//! Unlike Math, the category tag lives on the question itself and the
//! question is the rendering unit. Four tags are known; `vocabularyZhuyin`
//! and `wordZhuyin` are two spellings that both occur in real data and share
//! one renderer (kept as distinct tags on purpose). Anything else renders
//! the same diagnostic fallback as Math.

use serde_json::Value;

use super::math::{checkbox_groups, decode_extras, matching_fragments, CheckboxExtras, MatchingExtras};
use super::{AnnotatedWord, Fragment};
use crate::schema::Question;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MandarinCategory {
    Vocabulary,
    VocabularyZhuyin,
    WordZhuyin,
    Matching,
    Checkbox,
    Unknown(String),
}

impl MandarinCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "vocabulary" => MandarinCategory::Vocabulary,
            "vocabularyZhuyin" => MandarinCategory::VocabularyZhuyin,
            "wordZhuyin" => MandarinCategory::WordZhuyin,
            "matching" => MandarinCategory::Matching,
            "checkbox" => MandarinCategory::Checkbox,
            other => MandarinCategory::Unknown(other.to_string()),
        }
    }
}

/// Render one Mandarin question into presentational fragments.
pub fn render_question(question: &Question) -> Vec<Fragment> {
    let tag = question.category.as_deref().unwrap_or_default();
    match MandarinCategory::from_tag(tag) {
        MandarinCategory::Vocabulary => {
            vec![Fragment::WordList { words: question.answer_strings() }]
        }
        MandarinCategory::VocabularyZhuyin | MandarinCategory::WordZhuyin => {
            vec![Fragment::AnnotatedWords { pairs: zhuyin_pairs(question) }]
        }
        MandarinCategory::Matching => render_matching(question),
        MandarinCategory::Checkbox => render_checkbox(question),
        MandarinCategory::Unknown(tag) => {
            let raw = raw_question(question);
            vec![Fragment::unknown(tag, raw)]
        }
    }
}

/// Pair each answer word with its joined phonetic annotation, by position.
/// Words past the end of the `zhuyin` array simply go unannotated.
fn zhuyin_pairs(question: &Question) -> Vec<AnnotatedWord> {
    let zhuyin = question.zhuyin.as_deref().unwrap_or_default();
    question
        .answer_strings()
        .into_iter()
        .enumerate()
        .map(|(i, word)| AnnotatedWord { word, zhuyin: zhuyin.get(i).map(|syms| syms.concat()) })
        .collect()
}

/// Matching requires both `layerWidgets` and `multiConnections` keys to be
/// present; if either is absent the question renders nothing.
fn render_matching(question: &Question) -> Vec<Fragment> {
    let Some(extras) = question.extras.as_ref() else { return Vec::new() };
    if extras.get("layerWidgets").is_none() || extras.get("multiConnections").is_none() {
        return Vec::new();
    }
    let ex: MatchingExtras = decode_extras(extras);
    matching_fragments(&ex)
}

/// Checkbox requires `extras.items`; absent means nothing to render.
fn render_checkbox(question: &Question) -> Vec<Fragment> {
    let Some(extras) = question.extras.as_ref() else { return Vec::new() };
    if extras.get("items").is_none() {
        return Vec::new();
    }
    let ex: CheckboxExtras = decode_extras(extras);
    checkbox_groups(&ex.items)
}

fn raw_question(question: &Question) -> Value {
    let mut map = serde_json::Map::new();
    if let Some(title) = &question.title {
        map.insert("title".into(), serde_json::to_value(title.to_display()).unwrap_or(Value::Null));
    }
    if let Some(category) = &question.category {
        map.insert("category".into(), Value::String(category.clone()));
    }
    if let Some(answers) = &question.answers {
        map.insert("answers".into(), Value::Array(answers.clone()));
    }
    if let Some(zhuyin) = &question.zhuyin {
        map.insert("zhuyin".into(), serde_json::to_value(zhuyin).unwrap_or(Value::Null));
    }
    if let Some(extras) = &question.extras {
        map.insert("extras".into(), extras.clone());
    }
    Value::Object(map)
}
