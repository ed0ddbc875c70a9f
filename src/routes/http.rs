//! HTTP endpoint handlers. Thin wrappers over `AppState`; load failures are
//! converted to the displayed-error payload here and never propagate further.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument, warn};

use crate::loader::LoadError;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for LoadError {
    fn into_response(self) -> Response {
        let status = match &self {
            LoadError::InvalidLesson(_) => StatusCode::BAD_REQUEST,
            LoadError::GradeNotFound { .. } | LoadError::Fetch { .. } | LoadError::EmptyAnswers => {
                StatusCode::NOT_FOUND
            }
            LoadError::Parse(_) => StatusCode::BAD_GATEWAY,
        };
        warn!(target: "lesson", error = %self, "Request failed");
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

/// Everything the shell needs to draw the selection screens.
#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CatalogOut {
        subjects: subject_cards(),
        publishers: publisher_cards(),
        grades: state.grade_cards(),
    })
}

#[instrument(level = "info", skip(state, q), fields(subject = q.subject.data_path(), publisher = q.publisher.id()))]
pub async fn http_get_lessons(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LessonsQuery>,
) -> Result<Json<LessonsOut>, LoadError> {
    let lessons = state.lessons(q.subject, q.publisher, &q.grade).await?;
    info!(target: "lesson", count = lessons.len(), "HTTP lesson list served");
    Ok(Json(LessonsOut { lessons }))
}

#[instrument(level = "info", skip(state, q), fields(subject = q.subject.data_path(), path = %q.path))]
pub async fn http_get_answers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AnswersQuery>,
) -> Result<Json<AnswersOut>, LoadError> {
    let document = state.answers(q.subject, &q.path).await?;
    info!(
        target: "lesson",
        sections = document.sections.len(),
        unknown = document.unknown_count(),
        "HTTP answer document served"
    );
    Ok(Json(AnswersOut { document }))
}
