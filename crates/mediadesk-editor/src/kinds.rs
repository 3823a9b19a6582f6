//! Inline editor variants.
//!
//! A closed set of editable element flavors sharing one capability
//! interface (see [`crate::InlineEditor`]); each variant only overrides how
//! the entered value is parsed and how the saved value is displayed.

use chrono::NaiveDate;
use mediadesk_core::{AssetKind, ElementContext};
use regex::Regex;
use serde_json::Value;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub unit: String,
    pub position: CurrencyPosition,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            unit: "$".to_string(),
            position: CurrencyPosition::Before,
        }
    }
}

impl CurrencyFormat {
    fn from_element(element: &ElementContext) -> Self {
        let default = Self::default();
        Self {
            unit: element
                .data("currency-unit")
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .unwrap_or(default.unit),
            position: match element.data("currency-position") {
                Some("after") => CurrencyPosition::After,
                _ => CurrencyPosition::Before,
            },
        }
    }

    /// Amount in integer cents from free text such as `"$12.34"`.
    pub fn parse_cents(&self, text: &str) -> Option<i64> {
        let pattern = Regex::new(r"[^0-9.]+").ok()?;
        let cleaned = pattern.replace_all(text, "");
        let amount: f64 = cleaned.parse().ok()?;
        Some((amount * 100.0).round() as i64)
    }

    pub fn format_cents(&self, cents: i64) -> String {
        let amount = format!("{:.2}", cents as f64 / 100.0);
        match self.position {
            CurrencyPosition::Before => format!("{}{}", self.unit, amount),
            CurrencyPosition::After => format!("{}{}", amount, self.unit),
        }
    }
}

/// Integer range with an optional `[stored, label]` lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub step: Option<i64>,
    pub values: Vec<(Value, String)>,
}

impl RangeSpec {
    fn from_element(element: &ElementContext) -> Self {
        let int = |name: &str| element.data(name).and_then(|v| v.trim().parse().ok());
        let values = element
            .data("range-values")
            .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok())
            .map(|rows| rows.into_iter().filter_map(table_row).collect())
            .unwrap_or_default();
        Self {
            min: int("range-min"),
            max: int("range-max"),
            step: int("range-step"),
            values,
        }
    }

    fn row(&self, position: i64) -> Option<&(Value, String)> {
        let offset = match self.min {
            Some(min) if min != 0 => position - min,
            _ => position,
        };
        usize::try_from(offset).ok().and_then(|idx| self.values.get(idx))
    }

    /// Value persisted for a selector position.
    pub fn stored(&self, position: i64) -> Value {
        self.row(position)
            .map(|(stored, _)| stored.clone())
            .unwrap_or_else(|| Value::from(position))
    }

    /// Human readable label for a selector position.
    pub fn label(&self, position: i64) -> String {
        self.row(position)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| position.to_string())
    }

    /// Selector position clamped to `[min, max]`.
    pub fn clamp(&self, position: i64) -> i64 {
        let position = self.min.map_or(position, |min| position.max(min));
        self.max.map_or(position, |max| position.min(max))
    }
}

fn table_row(row: Value) -> Option<(Value, String)> {
    let mut items = match row {
        Value::Array(items) if !items.is_empty() => items.into_iter(),
        _ => return None,
    };
    let stored = items.next()?;
    let label = match items.next() {
        Some(Value::String(label)) => label,
        Some(other) => other.to_string(),
        None => match &stored {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };
    Some((stored, label))
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorKind {
    Text,
    Currency(CurrencyFormat),
    Date,
    Range(RangeSpec),
    /// `<img>`/`<video>` whose `src` is edited.
    Media(AssetKind),
}

impl EditorKind {
    /// Variant selected by the element's `edit-*` class.
    pub fn detect(element: &ElementContext) -> Self {
        if element.has_class("edit-currency") {
            EditorKind::Currency(CurrencyFormat::from_element(element))
        } else if element.has_class("edit-date") {
            EditorKind::Date
        } else if element.has_class("edit-range") {
            EditorKind::Range(RangeSpec::from_element(element))
        } else if element.has_class("edit-media") {
            let kind = match element.tag() {
                "video" => AssetKind::Video,
                "img" => AssetKind::Image,
                _ => AssetKind::Unknown,
            };
            EditorKind::Media(kind)
        } else {
            EditorKind::Text
        }
    }

    /// Whether values are captured in an overlay input rather than by
    /// editing the element's content directly.
    pub fn uses_overlay(&self) -> bool {
        matches!(self, EditorKind::Date | EditorKind::Range(_))
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_cents_round_trip() {
        let format = CurrencyFormat::default();
        assert_eq!(format.parse_cents("$12.34"), Some(1234));
        assert_eq!(format.parse_cents(" 1,200.5 USD"), Some(120050));
        assert_eq!(format.parse_cents("free"), None);
        assert_eq!(format.format_cents(1234), "$12.34");
    }

    #[test]
    fn currency_unit_after() {
        let element = ElementContext::new("span")
            .with_attr("class", "edit-currency")
            .with_data("currency-unit", "€")
            .with_data("currency-position", "after");
        match EditorKind::detect(&element) {
            EditorKind::Currency(format) => assert_eq!(format.format_cents(500), "5.00€"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn range_table_lookup() {
        let element = ElementContext::new("span")
            .with_attr("class", "edit-range")
            .with_data("range-min", "1")
            .with_data("range-max", "3")
            .with_data(
                "range-values",
                json!([["low", "Low"], ["mid", "Medium"], ["high", "High"]]).to_string(),
            );
        let EditorKind::Range(spec) = EditorKind::detect(&element) else {
            panic!("expected a range editor");
        };
        assert_eq!(spec.stored(2), json!("mid"));
        assert_eq!(spec.label(3), "High");
        assert_eq!(spec.label(7), "7");
        assert_eq!(spec.stored(7), json!(7));
        assert_eq!(spec.clamp(9), 3);
    }

    #[test]
    fn detects_variants_from_classes() {
        let media = ElementContext::new("video").with_attr("class", "edit-media");
        assert_eq!(EditorKind::detect(&media), EditorKind::Media(AssetKind::Video));
        let date = ElementContext::new("span").with_attr("class", "editable edit-date");
        assert!(EditorKind::detect(&date).uses_overlay());
        assert_eq!(EditorKind::detect(&ElementContext::new("p")), EditorKind::Text);
    }

    #[test]
    fn dates_parse_iso() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("29/02/2024"), None);
    }
}
