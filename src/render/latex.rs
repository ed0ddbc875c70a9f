//! LaTeX → plain text simplification for `tex` answers.
//!
//! Answer files ship fractions as raw LaTeX (`\frac{1}{2}`); the viewer shows
//! them as plain text (`1/2`). Only the handful of constructs that actually
//! occur in the data are recognized; everything else passes through verbatim.
//!
//! Example:
//!   input:  "\\frac{1}{2}\\times\\frac{3}{4}"
//!   output: "1/2×3/4"

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

static FRAC_RE: OnceLock<Regex> = OnceLock::new();
static TEXT_RE: OnceLock<Regex> = OnceLock::new();

/// Convert a LaTeX expression to plain text.
///
/// Rules, in order:
/// 1. `\frac{A}{B}` → `A/B` (brace contents must not contain braces; nested
///    fractions are not supported by the data and not handled here)
/// 2. `\text{A}` → `A`
/// 3. `\times` → `×`, `\div` → `÷`, `\pm` → `±`
///
/// Total: never fails, unrecognized input is returned unchanged.
pub fn convert_latex_to_text(latex: &str) -> String {
    let frac = FRAC_RE
        .get_or_init(|| Regex::new(r"\\frac\s*\{([^}]*)\}\s*\{([^}]*)\}").expect("frac regex"));
    let text = TEXT_RE.get_or_init(|| Regex::new(r"\\text\{([^}]*)\}").expect("text regex"));

    let out = frac.replace_all(latex, |caps: &Captures| {
        format!("{}/{}", caps[1].trim(), caps[2].trim())
    });
    let out = text.replace_all(&out, "$1");

    out.replace("\\times", "×").replace("\\div", "÷").replace("\\pm", "±")
}

/// JSON-level wrapper: simplifies strings, returns anything else unchanged.
/// Covers absent or malformed `tex` entries without failing.
pub fn simplify_value(v: &Value) -> Value {
    match v {
        Value::String(s) => Value::String(convert_latex_to_text(s)),
        other => other.clone(),
    }
}
