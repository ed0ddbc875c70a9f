//! Application state: configuration, the data loader, and the catalog.
//!
//! The state is read-only after startup; every request works against the
//! same config and loader. There are no caches: each lesson selection
//! re-fetches its files, exactly once, and the result lives only in the
//! response.

use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::domain::{grade_grid, GradeCard, LessonRef, Publisher, Subject};
use crate::loader::{lessons_for_grade, LoadError, Loader};
use crate::render::{render_document, RenderedDocument};

pub struct AppState {
    pub config: AppConfig,
    loader: Loader,
}

impl AppState {
    /// Build state from env: pick the data source and log which one won.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = AppConfig::from_env();
        let loader = if let Some(base) = &config.data_base_url {
            info!(target: "xizuo_backend", base_url = %base, "Serving data from upstream HTTP");
            Loader::from_upstream(base)
        } else if config.data_dir.is_dir() {
            info!(target: "xizuo_backend", dir = %config.data_dir.display(), "Serving data from local directory");
            Loader::from_dir(&config.data_dir)
        } else {
            info!(
                target: "xizuo_backend",
                dir = %config.data_dir.display(),
                "No data directory found; serving built-in sample data"
            );
            Loader::from_seeds()
        };
        Self { config, loader }
    }

    pub fn with_loader(config: AppConfig, loader: Loader) -> Self {
        Self { config, loader }
    }

    /// The grade-selection grid with the configured academic years.
    pub fn grade_cards(&self) -> Vec<GradeCard> {
        grade_grid(&self.config.catalog.upper_year, &self.config.catalog.lower_year)
    }

    /// Lessons for one grade key: loads the publisher mapping and resolves
    /// the (newline-normalized) grade against it.
    #[instrument(level = "info", skip(self), fields(subject = subject.data_path(), publisher = publisher.id()))]
    pub async fn lessons(
        &self,
        subject: Subject,
        publisher: Publisher,
        grade: &str,
    ) -> Result<Vec<LessonRef>, LoadError> {
        let mapping = self.loader.load_mapping(subject, publisher).await?;
        let lessons = lessons_for_grade(&mapping, grade)?;
        info!(target: "lesson", count = lessons.len(), "Lesson list resolved");
        Ok(lessons)
    }

    /// Load one answer file and walk it into its presentational tree.
    /// Unrecognized-category counts are logged so schema gaps stay visible.
    #[instrument(level = "info", skip(self), fields(subject = subject.data_path(), %path))]
    pub async fn answers(&self, subject: Subject, path: &str) -> Result<RenderedDocument, LoadError> {
        let doc = self.loader.load_answers(subject, path).await?;
        let rendered = render_document(&doc, subject);
        if rendered.is_empty() {
            return Err(LoadError::EmptyAnswers);
        }
        info!(
            target: "lesson",
            sections = rendered.sections.len(),
            unknown = rendered.unknown_count(),
            "Answer document rendered"
        );
        Ok(rendered)
    }
}
