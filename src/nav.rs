//! The five-screen navigation machine.
//!
//! Screens form a fixed linear stack: home → publisher → grade → lesson →
//! answer. Each screen is an enum variant carrying exactly the selections
//! made so far, so an impossible state (a lesson without a subject, say) is
//! unrepresentable. `back` pops one level and drops the popped selections;
//! the whole navigation record is replaced on every transition, never
//! partially mutated.

use thiserror::Error;

use crate::domain::{GradeKey, LessonRef, Publisher, Subject};

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Screen {
  #[default]
  Home,
  PublisherSelect { subject: Subject },
  GradeSelect { subject: Subject, publisher: Publisher },
  LessonList { subject: Subject, publisher: Publisher, grade: GradeKey },
  Answer { subject: Subject, publisher: Publisher, grade: GradeKey, lesson: LessonRef },
}

/// A navigation request from the client.
#[derive(Clone, Debug)]
pub enum NavEvent {
  SelectSubject(Subject),
  SelectPublisher(Publisher),
  SelectGrade(GradeKey),
  SelectLesson(LessonRef),
  Back,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} from the {screen} screen")]
pub struct NavError {
  pub action: &'static str,
  pub screen: &'static str,
}

impl Screen {
  /// Stable tag for logs and the wire protocol.
  pub fn tag(&self) -> &'static str {
    match self {
      Screen::Home => "home",
      Screen::PublisherSelect { .. } => "publisher",
      Screen::GradeSelect { .. } => "grade",
      Screen::LessonList { .. } => "lesson",
      Screen::Answer { .. } => "answer",
    }
  }

  /// Apply one navigation event. Selections are only valid on the screen
  /// that offers them; `Back` is valid everywhere (a no-op on home).
  pub fn apply(self, event: NavEvent) -> Result<Screen, NavError> {
    match (self, event) {
      (Screen::Home, NavEvent::SelectSubject(subject)) => Ok(Screen::PublisherSelect { subject }),
      (Screen::PublisherSelect { subject }, NavEvent::SelectPublisher(publisher)) => {
        Ok(Screen::GradeSelect { subject, publisher })
      }
      (Screen::GradeSelect { subject, publisher }, NavEvent::SelectGrade(grade)) => {
        Ok(Screen::LessonList { subject, publisher, grade })
      }
      (Screen::LessonList { subject, publisher, grade }, NavEvent::SelectLesson(lesson)) => {
        Ok(Screen::Answer { subject, publisher, grade, lesson })
      }
      (screen, NavEvent::Back) => Ok(screen.back()),
      (screen, event) => Err(NavError { action: event.action(), screen: screen.tag() }),
    }
  }

  /// Pop one level of the stack, dropping the selections the popped screen
  /// introduced.
  pub fn back(self) -> Screen {
    match self {
      Screen::Home => Screen::Home,
      Screen::PublisherSelect { .. } => Screen::Home,
      Screen::GradeSelect { subject, .. } => Screen::PublisherSelect { subject },
      Screen::LessonList { subject, publisher, .. } => Screen::GradeSelect { subject, publisher },
      Screen::Answer { subject, publisher, grade, .. } => {
        Screen::LessonList { subject, publisher, grade }
      }
    }
  }

  /// Header title for the current screen.
  pub fn title(&self) -> String {
    match self {
      Screen::Home => "習作小幫手".to_string(),
      Screen::PublisherSelect { subject } => format!("{} - 選擇出版社", subject.display_name()),
      Screen::GradeSelect { subject, publisher } => {
        format!("{} - {} - 選擇年級", subject.display_name(), publisher.display_name())
      }
      Screen::LessonList { subject, publisher, grade } => {
        format!("{} - {} - {}", subject.display_name(), publisher.display_name(), grade.display())
      }
      Screen::Answer { lesson, .. } => lesson.name.clone(),
    }
  }
}

impl NavEvent {
  fn action(&self) -> &'static str {
    match self {
      NavEvent::SelectSubject(_) => "select a subject",
      NavEvent::SelectPublisher(_) => "select a publisher",
      NavEvent::SelectGrade(_) => "select a grade",
      NavEvent::SelectLesson(_) => "select a lesson",
      NavEvent::Back => "go back",
    }
  }
}
