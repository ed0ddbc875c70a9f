//! Domain models: subjects, publishers, grade keys, and lesson references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which workbook line is being viewed. Chosen on the home screen and fixed
/// for the rest of the navigation cycle; the answer-file layout (one or two
/// section levels) is decided by this flag, never by inspecting the data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
  Mandarin,
  Math,
}

impl Subject {
  /// Path segment under `/data/` holding this subject's files.
  pub fn data_path(&self) -> &'static str {
    match self {
      Subject::Mandarin => "mandarin",
      Subject::Math => "math",
    }
  }

  /// Traditional-Chinese display name used in screen titles.
  pub fn display_name(&self) -> &'static str {
    match self {
      Subject::Mandarin => "國文",
      Subject::Math => "數學",
    }
  }
}

/// The three supported publisher curricula.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Publisher {
  Hanlin,
  Kangxuan,
  Nanone,
}

impl Publisher {
  pub const ALL: [Publisher; 3] = [Publisher::Hanlin, Publisher::Kangxuan, Publisher::Nanone];

  /// File stem of the publisher's mapping file (`hanlin.json` etc).
  pub fn id(&self) -> &'static str {
    match self {
      Publisher::Hanlin => "hanlin",
      Publisher::Kangxuan => "kangxuan",
      Publisher::Nanone => "nanone",
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Publisher::Hanlin => "翰林",
      Publisher::Kangxuan => "康軒",
      Publisher::Nanone => "南一",
    }
  }

  /// Latin-script subtitle shown on the publisher cards.
  pub fn display_name_en(&self) -> &'static str {
    match self {
      Publisher::Hanlin => "Hanlin",
      Publisher::Kangxuan => "Kangxuan",
      Publisher::Nanone => "Nanone",
    }
  }
}

/// Grade display names, first through sixth grade.
pub const GRADE_NAMES: [&str; 6] = ["一年級", "二年級", "三年級", "四年級", "五年級", "六年級"];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
  Upper,
  Lower,
}

impl Semester {
  pub fn display_name(&self) -> &'static str {
    match self {
      Semester::Upper => "上學期",
      Semester::Lower => "下學期",
    }
  }
}

/// A fully-resolved grade/semester selection.
///
/// Mapping files index lessons by the composite key
/// `"<grade>\n<academic year><semester>"` (e.g. `"三年級\n114上學期"`); the
/// embedded newline is a data convention we inherit, not a choice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeKey {
  pub grade: String,
  pub academic_year: String,
  pub semester: Semester,
}

impl GradeKey {
  pub fn new(grade: &str, academic_year: &str, semester: Semester) -> Self {
    Self { grade: grade.to_string(), academic_year: academic_year.to_string(), semester }
  }

  /// The composite lookup key as mapping files spell it.
  pub fn key(&self) -> String {
    format!("{}\n{}{}", self.grade, self.academic_year, self.semester.display_name())
  }

  /// Single-line form for titles and logs.
  pub fn display(&self) -> String {
    format!("{}{}{}", self.grade, self.academic_year, self.semester.display_name())
  }
}

impl fmt::Display for GradeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.display())
  }
}

/// One row of the grade-selection grid: a grade with its two semester keys.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GradeCard {
  pub grade: String,
  pub semesters: Vec<GradeKey>,
}

/// The full grade grid, six grades × two semesters, with the academic year
/// each semester belongs to.
pub fn grade_grid(upper_year: &str, lower_year: &str) -> Vec<GradeCard> {
  GRADE_NAMES
    .iter()
    .map(|grade| GradeCard {
      grade: grade.to_string(),
      semesters: vec![
        GradeKey::new(grade, upper_year, Semester::Upper),
        GradeKey::new(grade, lower_year, Semester::Lower),
      ],
    })
    .collect()
}

/// One selectable lesson, produced from a publisher mapping file.
/// `path` is relative to the subject's data directory.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LessonRef {
  pub name: String,
  pub path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub words: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extra_words: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grade_key_matches_mapping_file_convention() {
    let g = GradeKey::new("三年級", "114", Semester::Upper);
    assert_eq!(g.key(), "三年級\n114上學期");
    assert_eq!(g.display(), "三年級114上學期");
  }

  #[test]
  fn grade_grid_covers_six_grades_and_both_semesters() {
    let grid = grade_grid("114", "113");
    assert_eq!(grid.len(), 6);
    assert_eq!(grid[0].grade, "一年級");
    assert_eq!(grid[0].semesters[0].key(), "一年級\n114上學期");
    assert_eq!(grid[5].semesters[1].key(), "六年級\n113下學期");
  }

  #[test]
  fn subject_and_publisher_ids_are_data_paths() {
    assert_eq!(Subject::Mandarin.data_path(), "mandarin");
    assert_eq!(Publisher::Kangxuan.id(), "kangxuan");
    assert_eq!(Publisher::Nanone.display_name(), "南一");
  }
}
