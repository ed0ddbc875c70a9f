//! Small utility helpers used across modules.

/// Remove every newline character (LF and CR) from a string.
/// Grade keys embed a newline between the grade name and the semester label,
/// and data files disagree on which representation they use; lookups compare
/// the stripped forms. See `loader::lessons_for_grade`.
pub fn strip_newlines(s: &str) -> String {
  s.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge answer-file payloads. The cut backs off
/// to a char boundary so CJK text never splits mid-character.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
