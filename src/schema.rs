//! Raw answer-file schema.
//!
//! Answer files are loosely typed: almost every field may be absent, and the
//! shape of a leaf's payload is determined by a free-text `category` tag.
//! The contract here is deliberately permissive (`#[serde(default)]` on
//! everything): absence of a field means "empty", never a parse error.
//! Narrowing into typed per-category payloads happens in the renderers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A whole answer file: an ordered sequence of sections.
pub type AnswerDocument = Vec<Section>;

/// One titled grouping within an answer document.
///
/// Exactly one of `section` (Math: one extra nesting level) or `question`
/// (Mandarin) is populated at the top level; which one is decided by the
/// subject the user selected, not by inspecting the data.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Section {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub subtitle: Option<String>,
  #[serde(default)]
  pub section: Option<Vec<Section>>,
  #[serde(default)]
  pub question: Option<Vec<Question>>,
}

/// Question label: data files write either a string or a bare number.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Label {
  Text(String),
  Number(i64),
}

impl Label {
  pub fn to_display(&self) -> String {
    match self {
      Label::Text(s) => s.clone(),
      Label::Number(n) => n.to_string(),
    }
  }
}

/// One question node.
///
/// For Mandarin the question itself is the rendering unit: `category` lives
/// here and `answers` are plain strings. For Math the question is only a
/// container and each element of `answers` is an object carrying its own
/// category (see [`RawAnswer`]).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Question {
  #[serde(default)]
  pub title: Option<Label>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub answers: Option<Vec<Value>>,
  /// Mandarin only: phonetic annotations, one list of symbols per answer word.
  #[serde(default)]
  pub zhuyin: Option<Vec<Vec<String>>>,
  /// Mandarin matching/checkbox payload.
  #[serde(default)]
  pub extras: Option<Value>,
}

impl Question {
  /// The label shown before the answers: explicit title, else 1-based index.
  pub fn number(&self, index: usize) -> String {
    match &self.title {
      Some(label) => label.to_display(),
      None => (index + 1).to_string(),
    }
  }

  /// Mandarin view of `answers`: each element as display text.
  /// Non-string elements are stringified rather than dropped.
  pub fn answer_strings(&self) -> Vec<String> {
    self
      .answers
      .as_deref()
      .unwrap_or_default()
      .iter()
      .map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      })
      .collect()
  }

  /// Math view of `answers`: each element decoded as an answer leaf.
  /// Malformed elements decode to the empty answer, which renders nothing.
  pub fn raw_answers(&self) -> Vec<RawAnswer> {
    self
      .answers
      .as_deref()
      .unwrap_or_default()
      .iter()
      .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
      .collect()
  }
}

/// A Math answer leaf: category tag plus the category-shaped `extras` payload.
/// Unknown sibling fields are kept (`rest`) so the diagnostic fallback can
/// dump the node exactly as the file wrote it.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawAnswer {
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub extras: Value,
  #[serde(flatten)]
  pub rest: serde_json::Map<String, Value>,
}
