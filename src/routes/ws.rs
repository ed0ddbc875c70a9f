//! WebSocket navigation sessions.
//!
//! One socket = one viewer session holding the current screen. Each client
//! message is a navigation event; the transition commits immediately, then
//! the screen's payload (which may require a data fetch) is built in a
//! spawned task tagged with the session's generation counter. A payload
//! whose generation no longer matches (the user navigated again while the
//! fetch was in flight) is discarded instead of overwriting newer content.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::loader::LoadError;
use crate::nav::{NavEvent, Screen};
use crate::protocol::{publisher_cards, subject_cards, ClientWsMessage, ScreenOut, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "xizuo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

struct NavSession {
  id: Uuid,
  screen: Screen,
  generation: u64,
}

impl NavSession {
  /// Whether a screen payload tagged with `generation` is still current.
  fn accepts(&self, generation: u64) -> bool {
    generation == self.generation
  }
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let mut session = NavSession { id: Uuid::new_v4(), screen: Screen::Home, generation: 0 };
  info!(target: "xizuo_backend", session = %session.id, "WebSocket connected");

  // Payload builders report back through this channel, tagged with the
  // generation they were started for.
  let (tx, mut rx) = mpsc::channel::<(u64, ServerWsMessage)>(8);

  // Greet the client with the home screen.
  spawn_payload(&state, &tx, session.generation, session.screen.clone());

  loop {
    tokio::select! {
      Some((generation, reply)) = rx.recv() => {
        if !session.accepts(generation) {
          debug!(target: "xizuo_backend", session = %session.id, generation, current = session.generation,
            "Discarding stale screen payload");
          continue;
        }
        let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "xizuo_backend", session = %session.id, error = %e, "WS send error");
          break;
        }
      }

      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(ClientWsMessage::Ping) => {
                // Control reply, sent directly: unlike screen payloads it
                // must not be dropped by the staleness check.
                let pong = serde_json::to_string(&ServerWsMessage::Pong)
                  .unwrap_or_else(|_| r#"{"type":"pong"}"#.to_string());
                if socket.send(Message::Text(pong)).await.is_err() { break; }
              }
              Ok(incoming) => {
                debug!(target: "xizuo_backend", session = %session.id, "WS received: {:?}", &incoming);
                handle_nav_event(&state, &tx, &mut session, incoming);
              }
              Err(e) => {
                debug!(target: "xizuo_backend", session = %session.id,
                  raw = %crate::util::trunc_for_log(&txt, 200), "Unparseable WS message");
                let _ = tx.send((session.generation, ServerWsMessage::Error {
                  message: format!("Invalid JSON: {}", e),
                })).await;
              }
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
    }
  }
  info!(target: "xizuo_backend", session = %session.id, "WebSocket disconnected");
}

/// Apply one navigation event: commit the transition, bump the generation
/// (invalidating any in-flight payload), and start building the new
/// screen's payload.
fn handle_nav_event(
  state: &Arc<AppState>,
  tx: &mpsc::Sender<(u64, ServerWsMessage)>,
  session: &mut NavSession,
  msg: ClientWsMessage,
) {
  let event = match msg {
    ClientWsMessage::SelectSubject { subject } => NavEvent::SelectSubject(subject),
    ClientWsMessage::SelectPublisher { publisher } => NavEvent::SelectPublisher(publisher),
    ClientWsMessage::SelectGrade { grade } => NavEvent::SelectGrade(grade),
    ClientWsMessage::SelectLesson { lesson } => NavEvent::SelectLesson(lesson),
    ClientWsMessage::Back => NavEvent::Back,
    ClientWsMessage::Ping => return,
  };

  match session.screen.clone().apply(event) {
    Ok(next) => {
      session.generation += 1;
      session.screen = next.clone();
      info!(target: "xizuo_backend", session = %session.id, screen = next.tag(),
        generation = session.generation, "Navigated");
      spawn_payload(state, tx, session.generation, next);
    }
    Err(e) => {
      let tx = tx.clone();
      let generation = session.generation;
      let message = e.to_string();
      tokio::spawn(async move {
        let _ = tx.send((generation, ServerWsMessage::Error { message })).await;
      });
    }
  }
}

fn spawn_payload(
  state: &Arc<AppState>,
  tx: &mpsc::Sender<(u64, ServerWsMessage)>,
  generation: u64,
  screen: Screen,
) {
  let state = state.clone();
  let tx = tx.clone();
  tokio::spawn(async move {
    let reply = match build_screen(&state, &screen).await {
      Ok(out) => ServerWsMessage::Screen { screen: out },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    };
    let _ = tx.send((generation, reply)).await;
  });
}

/// Build the payload a screen needs to draw. The selection screens are
/// static; the lesson list and answer screens each require one fetch.
async fn build_screen(state: &AppState, screen: &Screen) -> Result<ScreenOut, LoadError> {
  let title = screen.title();
  match screen {
    Screen::Home => Ok(ScreenOut::Home { title, subjects: subject_cards() }),
    Screen::PublisherSelect { subject } => Ok(ScreenOut::Publisher {
      title,
      subject: *subject,
      publishers: publisher_cards(),
    }),
    Screen::GradeSelect { subject, publisher } => Ok(ScreenOut::Grade {
      title,
      subject: *subject,
      publisher: *publisher,
      grades: state.grade_cards(),
    }),
    Screen::LessonList { subject, publisher, grade } => {
      let lessons = state.lessons(*subject, *publisher, &grade.key()).await?;
      Ok(ScreenOut::Lesson {
        title,
        subject: *subject,
        publisher: *publisher,
        grade: grade.clone(),
        lessons,
      })
    }
    Screen::Answer { subject, lesson, .. } => {
      let document = state.answers(*subject, &lesson.path).await?;
      Ok(ScreenOut::Answer { title, subject: *subject, lesson: lesson.clone(), document })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::domain::{GradeKey, LessonRef, Publisher, Semester, Subject};
  use crate::loader::Loader;
  use crate::seeds::SEED_MATH_LESSON;

  fn seed_state() -> AppState {
    AppState::with_loader(
      AppConfig { data_dir: "./data".into(), data_base_url: None, catalog: Default::default() },
      Loader::from_seeds(),
    )
  }

  #[test]
  fn pong_wire_form_matches_the_fallback_literal() {
    // Pings are answered on the socket directly, outside the generation
    // tagging, so the serialized form and the fallback must agree.
    let pong = serde_json::to_string(&ServerWsMessage::Pong).unwrap();
    assert_eq!(pong, r#"{"type":"pong"}"#);
  }

  #[tokio::test]
  async fn stale_generation_payloads_are_discarded() {
    let state = Arc::new(seed_state());
    let mut session = NavSession { id: Uuid::new_v4(), screen: Screen::Home, generation: 0 };
    let (tx, mut rx) = mpsc::channel::<(u64, ServerWsMessage)>(8);

    // A home payload starts building, then a navigation commits before it
    // lands: the session moves on and the old generation goes stale.
    spawn_payload(&state, &tx, session.generation, session.screen.clone());
    session.generation += 1;
    session.screen = Screen::PublisherSelect { subject: Subject::Math };
    spawn_payload(&state, &tx, session.generation, session.screen.clone());

    // Replies can land in either order; filter them the way the session
    // loop does and only the current one may survive.
    let mut delivered = Vec::new();
    for _ in 0..2 {
      let (generation, reply) = rx.recv().await.expect("payload reply");
      if session.accepts(generation) {
        delivered.push(reply);
      }
    }
    match &delivered[..] {
      [ServerWsMessage::Screen { screen: ScreenOut::Publisher { subject, .. } }] => {
        assert!(matches!(subject, Subject::Math));
      }
      other => panic!("expected exactly the publisher screen, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn static_screens_build_without_fetching() {
    let state = seed_state();
    let out = build_screen(&state, &Screen::Home).await.unwrap();
    assert!(matches!(out, ScreenOut::Home { .. }));

    let screen = Screen::GradeSelect { subject: Subject::Math, publisher: Publisher::Hanlin };
    match build_screen(&state, &screen).await.unwrap() {
      ScreenOut::Grade { grades, title, .. } => {
        assert_eq!(grades.len(), 6);
        assert_eq!(title, "數學 - 翰林 - 選擇年級");
      }
      other => panic!("expected grade screen, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn lesson_screen_resolves_the_grade_key() {
    let state = seed_state();
    let screen = Screen::LessonList {
      subject: Subject::Math,
      publisher: Publisher::Hanlin,
      grade: GradeKey::new("一年級", "113", Semester::Lower),
    };
    match build_screen(&state, &screen).await.unwrap() {
      ScreenOut::Lesson { lessons, .. } => assert_eq!(lessons.len(), 2),
      other => panic!("expected lesson screen, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn answer_screen_failure_stays_a_message() {
    let state = seed_state();
    let screen = Screen::Answer {
      subject: Subject::Math,
      publisher: Publisher::Hanlin,
      grade: GradeKey::new("一年級", "113", Semester::Lower),
      lesson: LessonRef { name: "單元9".into(), path: "missing.json".into(), words: None, extra_words: None },
    };
    let err = build_screen(&state, &screen).await.unwrap_err();
    assert!(err.to_string().contains("無法載入答案資料"));

    let ok = Screen::Answer {
      subject: Subject::Math,
      publisher: Publisher::Hanlin,
      grade: GradeKey::new("一年級", "113", Semester::Lower),
      lesson: LessonRef { name: "單元2".into(), path: SEED_MATH_LESSON.into(), words: None, extra_words: None },
    };
    match build_screen(&state, &ok).await.unwrap() {
      ScreenOut::Answer { document, title, .. } => {
        assert_eq!(title, "單元2");
        assert_eq!(document.unknown_count(), 0);
      }
      other => panic!("expected answer screen, got {other:?}"),
    }
  }
}
