//! Per-page annotation records
//!
//! Records arrive as JSON in the shape
//!
//! ```json
//! { "page": 1,
//!   "data": { "lines": [...], "texts": [...], "stickyNotes": [...] } }
//! ```
//!
//! Coordinates are percentages of the page box. Parsing is lenient at the
//! record level: one malformed record is reported and skipped, the rest are
//! kept.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BurnError, Result};
use crate::geometry::{PageSize, Point};

fn default_page() -> i64 {
    1
}

fn default_stroke() -> String {
    "#ff0000".to_string()
}

fn default_tool() -> String {
    "pencil".to_string()
}

/// One page worth of annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// 1-indexed page number; validated against the document, not here
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default)]
    pub data: PageAnnotations,
}

impl AnnotationRecord {
    pub fn new(page: i64, data: PageAnnotations) -> Self {
        Self { page, data }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageAnnotations {
    pub lines: Vec<LineItem>,
    pub texts: Vec<TextItem>,
    pub sticky_notes: Vec<StickyItem>,
}

impl PageAnnotations {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.texts.is_empty() && self.sticky_notes.is_empty()
    }
}

/// A freehand stroke, ink or eraser depending on `tool`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Flat `[x1, y1, x2, y2, ...]` in percent
    #[serde(default)]
    pub points: Vec<f64>,
    #[serde(default = "default_stroke", alias = "color")]
    pub stroke: String,
    #[serde(default, alias = "width", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default = "default_tool")]
    pub tool: String,
}

impl LineItem {
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    /// Points mapped into page space; an odd trailing coordinate is ignored
    pub fn page_points(&self, page: PageSize) -> Vec<Point> {
        self.points
            .chunks_exact(2)
            .map(|xy| page.to_page(Point::new(xy[0], xy[1])))
            .collect()
    }

    /// The stroke width, or the default when missing, non-finite or not
    /// positive
    pub fn width_or_default(&self) -> f64 {
        self.stroke_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(Self::DEFAULT_STROKE_WIDTH)
    }
}

/// A typed text box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyItem {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// A record that could not be used, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the input list
    pub index: usize,
    pub page: Option<i64>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<AnnotationRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Parses a JSON array of records (a single record object is also accepted).
///
/// Fails only when the input is not JSON or has the wrong top-level shape.
pub fn parse_records(json: &str) -> Result<ParsedRecords> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    records_from_value(value)
}

pub fn records_from_value(value: serde_json::Value) -> Result<ParsedRecords> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        other => {
            return Err(BurnError::InvalidRecord(format!(
                "expected an array of records, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut parsed = ParsedRecords::default();
    for (index, item) in items.into_iter().enumerate() {
        let page = item.get("page").and_then(|p| p.as_i64());
        match serde_json::from_value::<AnnotationRecord>(item) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!("Skipping malformed annotation record {}: {}", index, e);
                parsed.skipped.push(SkippedRecord {
                    index,
                    page,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(parsed)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r##"[{
            "page": 2,
            "data": {
                "lines": [{"points": [10, 10, 90, 10], "stroke": "#00ff00", "strokeWidth": 3, "tool": "pen"}],
                "texts": [{"x": 5, "y": 6, "text": "Good", "fontSize": 12, "fill": "blue"}],
                "stickyNotes": [{"x": 50, "y": 50, "text": "See me"}]
            }
        }]"##;
        let parsed = parse_records(json).unwrap();
        assert!(parsed.skipped.is_empty());
        let record = &parsed.records[0];
        assert_eq!(record.page, 2);
        assert_eq!(record.data.lines[0].stroke, "#00ff00");
        assert_eq!(record.data.lines[0].stroke_width, Some(3.0));
        assert_eq!(record.data.texts[0].font_size, Some(12.0));
        assert_eq!(record.data.texts[0].fill.as_deref(), Some("blue"));
        assert_eq!(record.data.sticky_notes[0].text, "See me");
    }

    #[test]
    fn test_defaults_and_aliases() {
        let json = r#"{"data": {"lines": [{"points": [1, 2], "color": "red", "width": 7}, {"points": [3, 4]}]}}"#;
        let parsed = parse_records(json).unwrap();
        let record = &parsed.records[0];
        assert_eq!(record.page, 1);

        let aliased = &record.data.lines[0];
        assert_eq!(aliased.stroke, "red");
        assert_eq!(aliased.stroke_width, Some(7.0));
        assert_eq!(aliased.tool, "pencil");

        let bare = &record.data.lines[1];
        assert_eq!(bare.stroke, "#ff0000");
        assert_eq!(bare.stroke_width, None);
        assert_eq!(bare.width_or_default(), 2.0);
        assert!(record.data.texts.is_empty());
    }

    #[test]
    fn test_unusable_widths_fall_back_to_default() {
        let line = |width: f64| LineItem {
            points: vec![0.0, 0.0, 1.0, 1.0],
            stroke: default_stroke(),
            stroke_width: Some(width),
            tool: default_tool(),
        };
        assert_eq!(line(-3.0).width_or_default(), LineItem::DEFAULT_STROKE_WIDTH);
        assert_eq!(line(0.0).width_or_default(), LineItem::DEFAULT_STROKE_WIDTH);
        assert_eq!(line(f64::INFINITY).width_or_default(), LineItem::DEFAULT_STROKE_WIDTH);
        assert_eq!(line(0.5).width_or_default(), 0.5);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let json = r#"[
            {"page": 1, "data": {"lines": [{"points": ["a", "b"]}]}},
            {"page": 3, "data": {}}
        ]"#;
        let parsed = parse_records(json).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].page, 3);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].index, 0);
        assert_eq!(parsed.skipped[0].page, Some(1));
    }

    #[test]
    fn test_wrong_top_level_shape() {
        assert!(matches!(
            parse_records("42"),
            Err(BurnError::InvalidRecord(_))
        ));
        assert!(matches!(parse_records("{"), Err(BurnError::Json(_))));
    }

    #[test]
    fn test_page_points_ignores_trailing_coordinate() {
        let line = LineItem {
            points: vec![10.0, 50.0, 20.0],
            stroke: default_stroke(),
            stroke_width: None,
            tool: default_tool(),
        };
        let points = line.page_points(PageSize::new(200.0, 100.0));
        assert_eq!(points, vec![Point::new(20.0, 50.0)]);
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let record = AnnotationRecord::new(
            1,
            PageAnnotations {
                sticky_notes: vec![StickyItem {
                    x: 1.0,
                    y: 2.0,
                    text: "n".to_string(),
                }],
                ..Default::default()
            },
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"stickyNotes\""));
        assert!(!record.data.is_empty());
    }
}
