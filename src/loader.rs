//! Lesson loader: publisher mapping files and answer files.
//!
//! Two interchangeable data sources sit behind one type:
//!   - a local data directory (the same one served statically at `/data`),
//!   - an upstream HTTP base URL (reqwest), for deployments where the
//!     publisher JSON is hosted elsewhere.
//! Plus the built-in seed source used when no data directory exists, so the
//! server stays demonstrable out of the box.
//!
//! Every load is a plain fetch-and-parse: no caching, no retry. Failures
//! become human-readable messages shown in place of content.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::{LessonRef, Publisher, Subject};
use crate::schema::AnswerDocument;
use crate::seeds;
use crate::util::strip_newlines;

/// A publisher mapping file: grade/semester key → lesson name → entry.
/// Key order is the file's own order (serde_json `preserve_order`).
pub type Mapping = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum LoadError {
  /// Network or filesystem failure fetching a data file.
  #[error("{message}（{detail}）")]
  Fetch { message: &'static str, detail: String },
  /// The file was fetched but is not valid JSON of the expected shape.
  #[error("資料格式錯誤: {0}")]
  Parse(String),
  /// Grade key missing from a mapping file. Lists what is available, as a
  /// developer-facing diagnostic.
  #[error("找不到 {grade} 的資料。可用的選項: {available}")]
  GradeNotFound { grade: String, available: String },
  /// A lesson with no usable answer path, or a path escaping the data root.
  #[error("無效的課次資料: {0}")]
  InvalidLesson(String),
  /// The answer file loaded fine but holds no sections at all.
  #[error("暫無答案資料")]
  EmptyAnswers,
}

const MAPPING_FETCH_FAILED: &str = "無法載入資料";
const ANSWERS_FETCH_FAILED: &str = "無法載入答案資料";

enum DataSource {
  Dir(PathBuf),
  Upstream { client: reqwest::Client, base_url: String },
  Seed,
}

pub struct Loader {
  source: DataSource,
}

impl Loader {
  /// Serve from a local data directory.
  pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
    Self { source: DataSource::Dir(dir.into()) }
  }

  /// Serve from an upstream HTTP base URL (the `/data` root, e.g.
  /// `https://cdn.example.tw/data`).
  pub fn from_upstream(base_url: &str) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .unwrap_or_else(|_| reqwest::Client::new());
    Self {
      source: DataSource::Upstream { client, base_url: base_url.trim_end_matches('/').to_string() },
    }
  }

  /// Serve the built-in sample data only.
  pub fn from_seeds() -> Self {
    Self { source: DataSource::Seed }
  }

  /// Load the lesson-index mapping for one subject/publisher pair.
  #[instrument(level = "info", skip(self), fields(subject = subject.data_path(), publisher = publisher.id()))]
  pub async fn load_mapping(&self, subject: Subject, publisher: Publisher) -> Result<Mapping, LoadError> {
    let rel = format!("{}.json", publisher.id());
    if let DataSource::Seed = self.source {
      return Ok(seeds::seed_mapping(subject));
    }
    let mapping: Mapping = self.fetch_json(subject, &rel, MAPPING_FETCH_FAILED).await?;
    info!(target: "lesson", grades = mapping.len(), "Mapping loaded");
    Ok(mapping)
  }

  /// Load one lesson's answer file by its mapping-relative path.
  #[instrument(level = "info", skip(self), fields(subject = subject.data_path(), %path))]
  pub async fn load_answers(&self, subject: Subject, path: &str) -> Result<AnswerDocument, LoadError> {
    if path.is_empty() {
      return Err(LoadError::InvalidLesson("缺少答案檔路徑".to_string()));
    }
    if let DataSource::Seed = self.source {
      return seeds::seed_answers(subject, path).ok_or_else(|| LoadError::Fetch {
        message: ANSWERS_FETCH_FAILED,
        detail: format!("seed 資料中沒有 {path}"),
      });
    }
    let doc: AnswerDocument = self.fetch_json(subject, path, ANSWERS_FETCH_FAILED).await?;
    info!(target: "lesson", sections = doc.len(), "Answer file loaded");
    Ok(doc)
  }

  async fn fetch_json<T: DeserializeOwned>(
    &self,
    subject: Subject,
    rel: &str,
    fail_message: &'static str,
  ) -> Result<T, LoadError> {
    // Both real sources resolve client-supplied paths, so both get the
    // traversal check.
    let rel_path = sanitize_relative(rel)?;
    match &self.source {
      DataSource::Dir(dir) => {
        let full = dir.join(subject.data_path()).join(rel_path);
        let text = tokio::fs::read_to_string(&full).await.map_err(|e| {
          warn!(target: "lesson", path = %full.display(), error = %e, "Data file read failed");
          LoadError::Fetch { message: fail_message, detail: e.to_string() }
        })?;
        serde_json::from_str(&text).map_err(|e| LoadError::Parse(e.to_string()))
      }
      DataSource::Upstream { client, base_url } => {
        let url = format!("{}/{}/{}", base_url, subject.data_path(), rel);
        let resp = client.get(&url).send().await.map_err(|e| {
          warn!(target: "lesson", %url, error = %e, "Upstream fetch failed");
          LoadError::Fetch { message: fail_message, detail: e.to_string() }
        })?;
        if !resp.status().is_success() {
          return Err(LoadError::Fetch { message: fail_message, detail: format!("HTTP {}", resp.status()) });
        }
        resp.json().await.map_err(|e| LoadError::Parse(e.to_string()))
      }
      DataSource::Seed => unreachable!("seed source is handled by the callers"),
    }
  }
}

/// Reject mapping paths that would escape the data root.
fn sanitize_relative(rel: &str) -> Result<&Path, LoadError> {
  let path = Path::new(rel);
  let ok = path.components().all(|c| matches!(c, Component::Normal(_)));
  if ok {
    Ok(path)
  } else {
    Err(LoadError::InvalidLesson(format!("不合法的路徑 {rel}")))
  }
}

/// Resolve a grade key against a mapping and list that grade's lessons in
/// file order.
///
/// Grade keys embed a newline between grade name and semester, and data
/// files disagree on the exact newline representation, so both sides are
/// compared with all newlines stripped. Normalization lives in
/// `util::strip_newlines` and nowhere else.
pub fn lessons_for_grade(mapping: &Mapping, grade: &str) -> Result<Vec<LessonRef>, LoadError> {
  let wanted = strip_newlines(grade);
  let entry = mapping.iter().find(|(key, _)| strip_newlines(key) == wanted);
  let Some((_, lessons)) = entry else {
    return Err(LoadError::GradeNotFound {
      grade: grade.to_string(),
      available: mapping.keys().cloned().collect::<Vec<_>>().join(", "),
    });
  };
  let Some(lessons) = lessons.as_object() else {
    return Err(LoadError::Parse(format!("{grade} 的課次列表不是物件")));
  };
  Ok(lessons.iter().map(|(name, info)| lesson_ref(name, info)).collect())
}

/// One mapping entry → a selectable lesson. The answer path is `workbook`,
/// falling back to `sentence`; entries with neither stay listed but carry an
/// empty path, which `load_answers` rejects with the invalid-lesson message.
fn lesson_ref(name: &str, info: &Value) -> LessonRef {
  let path = info
    .get("workbook")
    .and_then(Value::as_str)
    .or_else(|| info.get("sentence").and_then(Value::as_str))
    .unwrap_or_default();
  LessonRef {
    name: name.to_string(),
    path: path.to_string(),
    words: info.get("words").and_then(Value::as_str).map(str::to_string),
    extra_words: info.get("extraWords").and_then(Value::as_str).map(str::to_string),
  }
}
