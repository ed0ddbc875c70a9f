//! Category renderer registry for Math answers.
//!
//! Each answer leaf carries a free-text `category` tag and a payload whose
//! shape is entirely determined by that tag. Known tags are a closed sum
//! type; anything else lands in `Unknown` and renders as a diagnostic
//! fragment rather than failing. Payload decoding is lenient throughout: a
//! malformed or absent field means "render nothing for that piece".

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::latex;
use super::{CheckboxItem, Decoration, Fragment};
use crate::schema::{Question, RawAnswer};

/// The known Math category tags, plus the two degenerate states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MathCategory {
    Text,
    Equation,
    TablesOptional,
    Checkbox,
    Matching,
    CircleMatching,
    Multiply,
    Division,
    Factorization,
    Regrouping,
    ShortDivision,
    ShortDivisionGcf,
    Tex,
    Length,
    Weight,
    Capacity,
    Time,
    Money,
    Blocks,
    Image,
    /// Empty or missing tag: explicitly suppressed, renders nothing.
    Empty,
    /// Anything else: renders the diagnostic fallback.
    Unknown(String),
}

impl MathCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => MathCategory::Text,
            "equation" => MathCategory::Equation,
            "tablesOptional" => MathCategory::TablesOptional,
            "checkbox" => MathCategory::Checkbox,
            "matching" => MathCategory::Matching,
            "circleMatching" => MathCategory::CircleMatching,
            "multiply" => MathCategory::Multiply,
            "division" => MathCategory::Division,
            "factorization" => MathCategory::Factorization,
            "regrouping" => MathCategory::Regrouping,
            "short_division" => MathCategory::ShortDivision,
            "short_division_gcf" => MathCategory::ShortDivisionGcf,
            "tex" => MathCategory::Tex,
            "length" => MathCategory::Length,
            "weight" => MathCategory::Weight,
            "capacity" => MathCategory::Capacity,
            "time" => MathCategory::Time,
            "money" => MathCategory::Money,
            "blocks" => MathCategory::Blocks,
            "image" => MathCategory::Image,
            "" => MathCategory::Empty,
            other => MathCategory::Unknown(other.to_string()),
        }
    }

    /// Fixed hint line for the arithmetic-operation tags, which are
    /// deliberately not rendered in full.
    fn operation_hint(&self) -> Option<&'static str> {
        match self {
            MathCategory::Multiply => Some("乘法運算 - 請參考原習作題目"),
            MathCategory::Division => Some("除法運算 - 請參考原習作題目"),
            MathCategory::Factorization => Some("因數分解 - 請參考原習作題目"),
            MathCategory::Regrouping => Some("進位/退位運算 - 請參考原習作題目"),
            MathCategory::ShortDivision => Some("短除法 - 請參考原習作題目"),
            MathCategory::ShortDivisionGcf => Some("短除法求最大公因數 - 請參考原習作題目"),
            _ => None,
        }
    }

    fn is_measurement(&self) -> bool {
        matches!(
            self,
            MathCategory::Length
                | MathCategory::Weight
                | MathCategory::Capacity
                | MathCategory::Time
                | MathCategory::Money
                | MathCategory::Blocks
        )
    }
}

// Per-category payload shapes. Every field defaults so partial payloads
// decode to partial renders instead of errors.

#[derive(Debug, Default, Deserialize)]
struct TextExtras {
    #[serde(default)]
    decoration: String,
    #[serde(default)]
    texts: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemsExtras {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TableExtras {
    #[serde(default)]
    row: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CheckboxExtras {
    #[serde(default)]
    pub(crate) items: Vec<Vec<CheckboxRaw>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CheckboxRaw {
    #[serde(default)]
    checked: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MatchingExtras {
    #[serde(default, rename = "multiConnections")]
    pub(crate) multi_connections: Vec<Value>,
    #[serde(default, rename = "layerWidgets")]
    pub(crate) layer_widgets: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct TexExtras {
    #[serde(default)]
    tex: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct MeasurementExtras {
    #[serde(default)]
    texts: Vec<Vec<String>>,
    #[serde(default)]
    items: Vec<Value>,
}

/// Lenient payload decode: any shape mismatch yields the empty payload.
pub(crate) fn decode_extras<T: DeserializeOwned + Default>(extras: &Value) -> T {
    serde_json::from_value(extras.clone()).unwrap_or_default()
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render all answers of one Math question, in answer order.
pub fn render_question(question: &Question) -> Vec<Fragment> {
    question.raw_answers().iter().flat_map(render_answer).collect()
}

/// Render one Math answer leaf into presentational fragments.
pub fn render_answer(answer: &RawAnswer) -> Vec<Fragment> {
    // An answer without a payload renders nothing, whatever its tag says.
    if answer.extras.is_null() {
        return Vec::new();
    }

    let category = MathCategory::from_tag(&answer.category);

    if let Some(hint) = category.operation_hint() {
        let ex: ItemsExtras = decode_extras(&answer.extras);
        let mut out = vec![Fragment::Hint { text: hint.to_string() }];
        out.extend(ex.items.iter().map(|item| Fragment::Block { text: value_text(item) }));
        return out;
    }

    if category.is_measurement() {
        let ex: MeasurementExtras = decode_extras(&answer.extras);
        let mut out: Vec<Fragment> = ex
            .texts
            .into_iter()
            .map(|spans| Fragment::TextGroup { decoration: Decoration::None, spans })
            .collect();
        out.extend(ex.items.iter().map(|item| Fragment::Block { text: value_text(item) }));
        return out;
    }

    match category {
        MathCategory::Text => {
            let ex: TextExtras = decode_extras(&answer.extras);
            let decoration = Decoration::from_tag(&ex.decoration);
            ex.texts
                .into_iter()
                .map(|spans| Fragment::TextGroup { decoration, spans })
                .collect()
        }
        MathCategory::Equation => {
            let ex: ItemsExtras = decode_extras(&answer.extras);
            ex.items.iter().map(|item| Fragment::Block { text: value_text(item) }).collect()
        }
        MathCategory::TablesOptional => {
            let ex: TableExtras = decode_extras(&answer.extras);
            if ex.row.is_empty() {
                Vec::new()
            } else {
                vec![Fragment::Table { rows: ex.row }]
            }
        }
        MathCategory::Checkbox => {
            let ex: CheckboxExtras = decode_extras(&answer.extras);
            checkbox_groups(&ex.items)
        }
        MathCategory::Matching => {
            let ex: MatchingExtras = decode_extras(&answer.extras);
            matching_fragments(&ex)
        }
        MathCategory::CircleMatching => {
            vec![Fragment::Hint { text: "配對題型 - 請參考原習作題目".to_string() }]
        }
        MathCategory::Tex => {
            let ex: TexExtras = decode_extras(&answer.extras);
            ex.tex
                .into_iter()
                .map(|group| Fragment::TexGroup {
                    exprs: group.iter().map(|v| value_text(&latex::simplify_value(v))).collect(),
                })
                .collect()
        }
        MathCategory::Image => {
            vec![Fragment::Hint { text: "圖形題 - 請參考原習作題目".to_string() }]
        }
        MathCategory::Empty => Vec::new(),
        MathCategory::Unknown(tag) => {
            let raw = serde_json::to_value(answer).unwrap_or(Value::Null);
            vec![Fragment::unknown(tag, raw)]
        }
        // Operation and measurement tags were handled above.
        _ => Vec::new(),
    }
}

/// Checkbox groups: ✓ for `checked == "checked"`, ○ otherwise, label kept
/// in order. Shared with the Mandarin registry, which uses the same rule.
pub(crate) fn checkbox_groups(items: &[Vec<CheckboxRaw>]) -> Vec<Fragment> {
    items
        .iter()
        .map(|group| Fragment::CheckboxGroup {
            items: group
                .iter()
                .map(|raw| CheckboxItem { checked: raw.checked == "checked", label: raw.value.clone() })
                .collect(),
        })
        .collect()
}

/// Matching: widget layers become a grid; connection lines are never drawn.
/// A non-empty `multiConnections` appends the see-the-original hint instead.
/// Shared with the Mandarin registry.
pub(crate) fn matching_fragments(ex: &MatchingExtras) -> Vec<Fragment> {
    let mut out = Vec::new();
    if !ex.layer_widgets.is_empty() {
        out.push(Fragment::MatchingGrid { layers: ex.layer_widgets.clone() });
    }
    if !ex.multi_connections.is_empty() {
        out.push(Fragment::Hint { text: "配對關係：請參考原習作題目".to_string() });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(v: Value) -> RawAnswer {
        serde_json::from_value(v).unwrap()
    }

    fn render(v: Value) -> Vec<Fragment> {
        render_answer(&answer(v))
    }

    #[test]
    fn every_known_category_avoids_the_fallback() {
        let samples = [
            json!({ "category": "text", "extras": { "decoration": "underline", "texts": [["八"]] } }),
            json!({ "category": "equation", "extras": { "items": ["3+4=7"] } }),
            json!({ "category": "tablesOptional", "extras": { "row": [["1", "2"]] } }),
            json!({ "category": "checkbox", "extras": { "items": [[{ "checked": "checked" }]] } }),
            json!({ "category": "matching", "extras": { "layerWidgets": [["甲"]] } }),
            json!({ "category": "circleMatching", "extras": {} }),
            json!({ "category": "multiply", "extras": { "items": ["12×3"] } }),
            json!({ "category": "division", "extras": {} }),
            json!({ "category": "factorization", "extras": {} }),
            json!({ "category": "regrouping", "extras": {} }),
            json!({ "category": "short_division", "extras": {} }),
            json!({ "category": "short_division_gcf", "extras": {} }),
            json!({ "category": "tex", "extras": { "tex": [["\\frac{1}{2}"]] } }),
            json!({ "category": "length", "extras": { "texts": [["5公分"]] } }),
            json!({ "category": "weight", "extras": { "items": ["3公斤"] } }),
            json!({ "category": "capacity", "extras": {} }),
            json!({ "category": "time", "extras": {} }),
            json!({ "category": "money", "extras": {} }),
            json!({ "category": "blocks", "extras": {} }),
            json!({ "category": "image", "extras": {} }),
        ];
        for sample in samples {
            let fragments = render(sample.clone());
            assert!(
                !fragments.iter().any(|f| matches!(f, Fragment::Unknown { .. })),
                "fallback hit for {sample}"
            );
        }
    }

    #[test]
    fn unknown_category_renders_diagnostic_with_literal_tag() {
        let fragments = render(json!({ "category": "spiral", "extras": { "weird": true } }));
        match &fragments[..] {
            [Fragment::Unknown { category, message, raw }] => {
                assert_eq!(category, "spiral");
                assert_eq!(message, "未知題型: spiral");
                assert_eq!(raw["category"], "spiral");
                assert_eq!(raw["extras"]["weird"], true);
            }
            other => panic!("expected one Unknown fragment, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_missing_category_is_suppressed() {
        assert!(render(json!({ "category": "", "extras": { "items": ["x"] } })).is_empty());
        assert!(render(json!({ "extras": { "items": ["x"] } })).is_empty());
    }

    #[test]
    fn missing_extras_renders_nothing_for_any_tag() {
        assert!(render(json!({ "category": "equation" })).is_empty());
        assert!(render(json!({ "category": "spiral" })).is_empty());
    }

    #[test]
    fn checkbox_glyphs_and_labels_stay_in_order() {
        let fragments = render(json!({
            "category": "checkbox",
            "extras": { "items": [[
                { "checked": "checked", "value": "A" },
                { "checked": "x", "value": "B" }
            ]] }
        }));
        match &fragments[..] {
            [Fragment::CheckboxGroup { items }] => {
                let glyphs: Vec<char> = items.iter().map(|i| i.glyph()).collect();
                assert_eq!(glyphs, ['✓', '○']);
                let labels: Vec<_> = items.iter().map(|i| i.label.as_deref()).collect();
                assert_eq!(labels, [Some("A"), Some("B")]);
            }
            other => panic!("expected one checkbox group, got {other:?}"),
        }
    }

    #[test]
    fn text_decoration_applies_to_every_span_in_the_group() {
        let fragments = render(json!({
            "category": "text",
            "extras": { "decoration": "overline", "texts": [["3", "5"], ["7"]] }
        }));
        assert_eq!(
            fragments,
            vec![
                Fragment::TextGroup {
                    decoration: Decoration::Overline,
                    spans: vec!["3".into(), "5".into()]
                },
                Fragment::TextGroup { decoration: Decoration::Overline, spans: vec!["7".into()] },
            ]
        );
    }

    #[test]
    fn unrecognized_decoration_degrades_to_plain() {
        let fragments = render(json!({
            "category": "text",
            "extras": { "decoration": "sparkles", "texts": [["九"]] }
        }));
        assert_eq!(
            fragments,
            vec![Fragment::TextGroup { decoration: Decoration::None, spans: vec!["九".into()] }]
        );
    }

    #[test]
    fn matching_hints_instead_of_drawing_connections() {
        let fragments = render(json!({
            "category": "matching",
            "extras": { "layerWidgets": [["左1", "左2"], ["右1", "右2"]], "multiConnections": [[0, 1]] }
        }));
        assert_eq!(fragments.len(), 2);
        assert!(matches!(&fragments[0], Fragment::MatchingGrid { layers } if layers.len() == 2));
        assert!(matches!(&fragments[1], Fragment::Hint { text } if text == "配對關係：請參考原習作題目"));

        // circleMatching never renders anything but the hint.
        let fragments = render(json!({
            "category": "circleMatching",
            "extras": { "multiConnections": [[0, 1]] }
        }));
        assert_eq!(fragments, vec![Fragment::Hint { text: "配對題型 - 請參考原習作題目".into() }]);
    }

    #[test]
    fn operation_tags_hint_and_dump_items() {
        let fragments = render(json!({
            "category": "short_division_gcf",
            "extras": { "items": ["2 | 12 18", "3 | 6 9"] }
        }));
        assert_eq!(
            fragments,
            vec![
                Fragment::Hint { text: "短除法求最大公因數 - 請參考原習作題目".into() },
                Fragment::Block { text: "2 | 12 18".into() },
                Fragment::Block { text: "3 | 6 9".into() },
            ]
        );
    }

    #[test]
    fn measurement_texts_and_items_render_independently() {
        let fragments = render(json!({
            "category": "money",
            "extras": { "texts": [["50元", "100元"]], "items": ["共150元"] }
        }));
        assert_eq!(
            fragments,
            vec![
                Fragment::TextGroup {
                    decoration: Decoration::None,
                    spans: vec!["50元".into(), "100元".into()]
                },
                Fragment::Block { text: "共150元".into() },
            ]
        );
        // Either side alone is fine too.
        let only_items = render(json!({ "category": "time", "extras": { "items": ["3時20分"] } }));
        assert_eq!(only_items, vec![Fragment::Block { text: "3時20分".into() }]);
    }

    #[test]
    fn tex_expressions_are_simplified() {
        let fragments = render(json!({
            "category": "tex",
            "extras": { "tex": [["\\frac{1}{2}", "\\frac{1}{2}\\times\\frac{3}{4}"]] }
        }));
        assert_eq!(
            fragments,
            vec![Fragment::TexGroup { exprs: vec!["1/2".into(), "1/2×3/4".into()] }]
        );
    }
}
