//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{GradeCard, GradeKey, LessonRef, Publisher, Subject};
use crate::render::RenderedDocument;

/// Messages the client can send over WebSocket. One message per navigation
/// action; the server answers each with the resulting screen or an error.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectSubject { subject: Subject },
    SelectPublisher { publisher: Publisher },
    SelectGrade { grade: GradeKey },
    SelectLesson { lesson: LessonRef },
    Back,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Screen { screen: ScreenOut },
    /// A failure shown in place of content; navigation state is unchanged.
    Error { message: String },
}

/// One fully-populated screen, ready to draw. Tagged with the screen's
/// stable name so clients can switch on it directly.
#[derive(Debug, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenOut {
    Home {
        title: String,
        subjects: Vec<SubjectOut>,
    },
    Publisher {
        title: String,
        subject: Subject,
        publishers: Vec<PublisherOut>,
    },
    Grade {
        title: String,
        subject: Subject,
        publisher: Publisher,
        grades: Vec<GradeCard>,
    },
    Lesson {
        title: String,
        subject: Subject,
        publisher: Publisher,
        grade: GradeKey,
        lessons: Vec<LessonRef>,
    },
    Answer {
        title: String,
        subject: Subject,
        lesson: LessonRef,
        document: RenderedDocument,
    },
}

/// Subject card for the home screen.
#[derive(Debug, Serialize)]
pub struct SubjectOut {
    pub id: Subject,
    pub name: &'static str,
    pub icon: &'static str,
}

pub fn subject_cards() -> Vec<SubjectOut> {
    vec![
        SubjectOut { id: Subject::Mandarin, name: Subject::Mandarin.display_name(), icon: "📖" },
        SubjectOut { id: Subject::Math, name: Subject::Math.display_name(), icon: "🔢" },
    ]
}

/// Publisher card for the publisher-selection screen.
#[derive(Debug, Serialize)]
pub struct PublisherOut {
    pub id: Publisher,
    pub name: &'static str,
    pub name_en: &'static str,
}

pub fn publisher_cards() -> Vec<PublisherOut> {
    Publisher::ALL
        .iter()
        .map(|p| PublisherOut { id: *p, name: p.display_name(), name_en: p.display_name_en() })
        .collect()
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LessonsQuery {
    pub subject: Subject,
    pub publisher: Publisher,
    /// Grade key; newlines may arrive in any representation (or stripped),
    /// the lookup normalizes before comparing.
    pub grade: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswersQuery {
    pub subject: Subject,
    /// Answer-file path relative to the subject's data directory, as found
    /// in the mapping file.
    pub path: String,
}

#[derive(Serialize)]
pub struct CatalogOut {
    pub subjects: Vec<SubjectOut>,
    pub publishers: Vec<PublisherOut>,
    pub grades: Vec<GradeCard>,
}

#[derive(Serialize)]
pub struct LessonsOut {
    pub lessons: Vec<LessonRef>,
}

#[derive(Serialize)]
pub struct AnswersOut {
    pub document: RenderedDocument,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_wire_form() {
        let msg: ClientWsMessage =
            serde_json::from_str(r#"{ "type": "select_subject", "subject": "math" }"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::SelectSubject { subject: Subject::Math }));

        let msg: ClientWsMessage = serde_json::from_str(
            r#"{ "type": "select_grade",
                 "grade": { "grade": "一年級", "academic_year": "114", "semester": "upper" } }"#,
        )
        .unwrap();
        match msg {
            ClientWsMessage::SelectGrade { grade } => assert_eq!(grade.key(), "一年級\n114上學期"),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn screen_payloads_carry_their_tag() {
        let out = ScreenOut::Home { title: "習作小幫手".into(), subjects: subject_cards() };
        let v = serde_json::to_value(ServerWsMessage::Screen { screen: out }).unwrap();
        assert_eq!(v["type"], "screen");
        assert_eq!(v["screen"]["screen"], "home");
        assert_eq!(v["screen"]["subjects"][1]["icon"], "🔢");
    }
}
