//! Burning annotation records into a document
//!
//! [`plan_page`] is the pure part: it turns one page's record into surviving
//! strokes and positioned marks. [`AnnotationBurner`] walks the records of a
//! document, renders each plan and writes it into the page.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::erase::{EraserPolicy, IndexOptions, PageStroke, SplitOptions, StrokeTimeline, SurvivingStroke, Tool};
use crate::error::{BurnError, Result};
use crate::geometry::{PageSize, Point};
use crate::graphics::Color;
use crate::pdf::PdfSurface;
use crate::record::{AnnotationRecord, PageAnnotations, SkippedRecord};
use crate::render::{PageFrame, PageRenderer, RenderOptions, StickyMark, TextMark};

/// Everything tunable about a burn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnOptions {
    pub eraser: EraserPolicy,
    pub split: SplitOptions,
    pub index: IndexOptions,
    pub render: RenderOptions,
    /// Flate-compress burned content streams (needs the `compression` feature)
    pub compress: bool,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            eraser: EraserPolicy::default(),
            split: SplitOptions::default(),
            index: IndexOptions::default(),
            render: RenderOptions::default(),
            compress: true,
        }
    }
}

impl BurnOptions {
    pub fn with_eraser_policy(mut self, eraser: EraserPolicy) -> Self {
        self.eraser = eraser;
        self
    }

    pub fn with_split_options(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }

    pub fn with_index_options(mut self, index: IndexOptions) -> Self {
        self.index = index;
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.eraser.validate()?;
        self.render.validate()?;
        if self.split.max_bisection_iterations == 0 {
            return Err(BurnError::InvalidConfig(
                "max_bisection_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads options from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }
}

/// One page's record, resolved into page space and run through the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub strokes: Vec<SurvivingStroke>,
    pub texts: Vec<TextMark>,
    pub stickies: Vec<StickyMark>,
    pub eraser_radius: f64,
    pub eraser_count: usize,
    pub ink_count: usize,
}

/// Resolves `annotations` against a page of `page` size.
pub fn plan_page(annotations: &PageAnnotations, page: PageSize, options: &BurnOptions) -> PagePlan {
    let mut strokes = Vec::with_capacity(annotations.lines.len());
    let mut eraser_widths = Vec::new();

    for (i, line) in annotations.lines.iter().enumerate() {
        let points = line.page_points(page);
        if points.is_empty() {
            debug!("Skipping line {} without points", i);
            continue;
        }
        match Tool::from_tag(&line.tool) {
            Tool::Eraser => {
                eraser_widths.push(line.stroke_width);
                strokes.push(PageStroke::eraser(points));
            }
            Tool::Ink => strokes.push(PageStroke::ink(
                points,
                Color::parse(&line.stroke),
                line.width_or_default(),
            )),
        }
    }

    let eraser_count = eraser_widths.len();
    let ink_count = strokes.len() - eraser_count;
    let percent = options.eraser.resolve_radius_percent(eraser_widths);
    let eraser_radius = options.eraser.radius_for_page(percent, page.width);
    if eraser_count > 0 {
        debug!(
            "{} eraser stroke(s), radius {:.2}% of width = {:.2} pt",
            eraser_count, percent, eraser_radius
        );
    }

    let surviving = StrokeTimeline::new(page, eraser_radius)
        .with_split_options(options.split.clone())
        .with_index_options(options.index.clone())
        .run(&strokes);

    let default_color = Color::parse(&options.render.text_color);
    let texts = annotations
        .texts
        .iter()
        .map(|item| TextMark {
            position: page.to_page(Point::new(item.x, item.y)),
            text: item.text.clone(),
            font_size: item
                .font_size
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(options.render.default_font_size),
            color: item.fill.as_deref().map(Color::parse).unwrap_or(default_color),
        })
        .collect();

    let stickies = annotations
        .sticky_notes
        .iter()
        .map(|item| StickyMark {
            position: page.to_page(Point::new(item.x, item.y)),
            text: item.text.clone(),
        })
        .collect();

    PagePlan {
        strokes: surviving,
        texts,
        stickies,
        eraser_radius,
        eraser_count,
        ink_count,
    }
}

/// What happened on one burned page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReport {
    pub page: u32,
    pub ink_strokes: usize,
    pub erasers: usize,
    pub eraser_radius: f64,
    pub surviving_strokes: usize,
    pub surviving_segments: usize,
    pub texts: usize,
    pub truncated_texts: usize,
    pub notes: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BurnReport {
    pub pages: Vec<PageReport>,
    pub skipped: Vec<SkippedRecord>,
}

impl BurnReport {
    pub fn pages_burned(&self) -> usize {
        self.pages.len()
    }

    pub fn surviving_segments(&self) -> usize {
        self.pages.iter().map(|p| p.surviving_segments).sum()
    }

    pub fn notes_added(&self) -> usize {
        self.pages.iter().map(|p| p.notes).sum()
    }
}

/// Burns annotation records into documents
#[derive(Debug, Clone, Default)]
pub struct AnnotationBurner {
    options: BurnOptions,
}

impl AnnotationBurner {
    pub fn new(options: BurnOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BurnOptions {
        &self.options
    }

    /// Loads `input`, burns `records` and saves the result to `output`
    pub fn burn_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        records: &[AnnotationRecord],
        output: Q,
    ) -> Result<BurnReport> {
        let mut surface = PdfSurface::load(input.as_ref())?;
        if !self.options.compress {
            surface = surface.without_compression();
        }
        let report = self.burn_document(&mut surface, records)?;
        surface.save(output.as_ref())?;
        info!(
            "Saved {} ({} page(s) burned, {} record(s) skipped)",
            output.as_ref().display(),
            report.pages_burned(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Burns `records` into an already loaded document.
    ///
    /// Records for pages outside the document, and pages that fail to burn,
    /// end up in [`BurnReport::skipped`] without affecting the others.
    pub fn burn_document(
        &self,
        surface: &mut PdfSurface,
        records: &[AnnotationRecord],
    ) -> Result<BurnReport> {
        self.options.validate()?;

        let total_pages = surface.page_count();
        let mut report = BurnReport::default();

        for (index, record) in records.iter().enumerate() {
            let page_id = u32::try_from(record.page)
                .ok()
                .filter(|n| (1..=total_pages).contains(n))
                .and_then(|n| surface.page_id(n).map(|id| (n, id)));

            let Some((page_number, page_id)) = page_id else {
                warn!(
                    "Skipping record {}: page {} is outside 1..={}",
                    index, record.page, total_pages
                );
                report.skipped.push(SkippedRecord {
                    index,
                    page: Some(record.page),
                    reason: format!("page {} out of range (1..={})", record.page, total_pages),
                });
                continue;
            };

            match self.burn_page(surface, page_id, page_number, &record.data) {
                Ok(page_report) => report.pages.push(page_report),
                Err(e) => {
                    warn!("Failed to burn page {}: {}", page_number, e);
                    report.skipped.push(SkippedRecord {
                        index,
                        page: Some(record.page),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn burn_page(
        &self,
        surface: &mut PdfSurface,
        page_id: lopdf::ObjectId,
        page_number: u32,
        annotations: &PageAnnotations,
    ) -> Result<PageReport> {
        let frame = PageFrame::new(surface.page_box(page_id, page_number)?)
            .with_rotation(surface.page_rotation(page_id, page_number));
        let size = PageSize::new(frame.width(), frame.height());
        debug!(
            "Page {}: {:.1} x {:.1} pt, rotated {}",
            page_number,
            size.width,
            size.height,
            frame.rotation.to_degrees()
        );

        let plan = plan_page(annotations, size, &self.options);
        let rendered = PageRenderer::new(frame, &self.options.render).render(
            &plan.strokes,
            &plan.texts,
            &plan.stickies,
        );

        if rendered.uses_font {
            surface.ensure_font_resource(page_id)?;
        }
        if !rendered.content.is_empty() {
            surface.append_content(page_id, rendered.content)?;
        }
        let notes = rendered.notes.len();
        for note in &rendered.notes {
            surface.add_annotation(page_id, note.to_dictionary(page_id))?;
        }

        Ok(PageReport {
            page: page_number,
            ink_strokes: plan.ink_count,
            erasers: plan.eraser_count,
            eraser_radius: plan.eraser_radius,
            surviving_strokes: plan.strokes.len(),
            surviving_segments: plan.strokes.iter().map(|s| s.segment_count()).sum(),
            texts: plan.texts.len(),
            truncated_texts: rendered.truncated_texts,
            notes,
        })
    }
}

/// Burns `records` into `input` with default options and writes `output`
pub fn burn_annotations_to_pdf<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    records: &[AnnotationRecord],
    output: Q,
) -> Result<BurnReport> {
    AnnotationBurner::default().burn_file(input, records, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::blank_document;
    use crate::record::{LineItem, StickyItem, TextItem};

    fn line(points: &[f64], tool: &str, width: Option<f64>) -> LineItem {
        LineItem {
            points: points.to_vec(),
            stroke: "#0000ff".to_string(),
            stroke_width: width,
            tool: tool.to_string(),
        }
    }

    fn letter() -> PageSize {
        PageSize::new(612.0, 792.0)
    }

    #[test]
    fn test_plan_without_erasers_keeps_ink() {
        let annotations = PageAnnotations {
            lines: vec![line(&[10.0, 10.0, 90.0, 10.0], "pencil", Some(2.0))],
            ..Default::default()
        };
        let plan = plan_page(&annotations, letter(), &BurnOptions::default());

        assert_eq!(plan.ink_count, 1);
        assert_eq!(plan.eraser_count, 0);
        assert_eq!(plan.strokes.len(), 1);
        let stroke = &plan.strokes[0];
        assert_eq!(stroke.color, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(stroke.width, 2.0);
        let polyline = &stroke.polylines[0];
        assert_eq!(stroke.polylines.len(), 1);
        assert!(polyline[0].approx_eq(Point::new(61.2, 79.2), 1e-9));
        assert!(polyline[1].approx_eq(Point::new(550.8, 79.2), 1e-9));
    }

    #[test]
    fn test_plan_negative_ink_width_uses_default() {
        let annotations = PageAnnotations {
            lines: vec![line(&[10.0, 10.0, 90.0, 10.0], "pencil", Some(-4.0))],
            ..Default::default()
        };
        let plan = plan_page(&annotations, letter(), &BurnOptions::default());
        assert_eq!(plan.strokes[0].width, LineItem::DEFAULT_STROKE_WIDTH);
    }

    #[test]
    fn test_plan_default_radius_without_erasers() {
        let plan = plan_page(&PageAnnotations::default(), letter(), &BurnOptions::default());
        // 1.5% of 612 is the eraser's width, the radius is half of that
        assert!((plan.eraser_radius - 4.59).abs() < 1e-9);
    }

    #[test]
    fn test_plan_erases_earlier_ink_only() {
        let annotations = PageAnnotations {
            lines: vec![
                line(&[10.0, 10.0, 90.0, 10.0], "pencil", None),
                line(&[50.0, 5.0, 50.0, 15.0], "eraser", Some(30.0)),
                line(&[10.0, 20.0, 90.0, 20.0], "pencil", None),
            ],
            ..Default::default()
        };
        let plan = plan_page(&annotations, letter(), &BurnOptions::default());

        assert_eq!(plan.eraser_count, 1);
        assert_eq!(plan.ink_count, 2);
        assert_eq!(plan.strokes[0].polylines.len(), 2);
        assert_eq!(plan.strokes[1].polylines.len(), 1);
        assert_eq!(plan.strokes[1].segment_count(), 1);
    }

    #[test]
    fn test_plan_skips_empty_lines() {
        let annotations = PageAnnotations {
            lines: vec![line(&[], "pencil", None), line(&[5.0], "eraser", None)],
            ..Default::default()
        };
        let plan = plan_page(&annotations, letter(), &BurnOptions::default());
        assert_eq!(plan.ink_count, 0);
        assert_eq!(plan.eraser_count, 0);
        assert!(plan.strokes.is_empty());
    }

    #[test]
    fn test_plan_text_defaults() {
        let annotations = PageAnnotations {
            texts: vec![
                TextItem {
                    x: 50.0,
                    y: 50.0,
                    text: "A".to_string(),
                    font_size: None,
                    fill: None,
                },
                TextItem {
                    x: 0.0,
                    y: 0.0,
                    text: "B".to_string(),
                    font_size: Some(10.0),
                    fill: Some("#00ff00".to_string()),
                },
            ],
            sticky_notes: vec![StickyItem {
                x: 25.0,
                y: 75.0,
                text: "note".to_string(),
            }],
            ..Default::default()
        };
        let plan = plan_page(&annotations, letter(), &BurnOptions::default());

        assert_eq!(plan.texts[0].position, Point::new(306.0, 396.0));
        assert_eq!(plan.texts[0].font_size, 16.0);
        assert_eq!(plan.texts[0].color, Color::red());
        assert_eq!(plan.texts[1].font_size, 10.0);
        assert_eq!(plan.texts[1].color, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(plan.stickies[0].position, Point::new(153.0, 594.0));
    }

    #[test]
    fn test_burn_document_skips_out_of_range_pages() {
        let mut surface = PdfSurface::from_document(blank_document(2, 612, 792)).unwrap();
        let records = vec![
            AnnotationRecord::new(0, PageAnnotations::default()),
            AnnotationRecord::new(3, PageAnnotations::default()),
            AnnotationRecord::new(
                2,
                PageAnnotations {
                    sticky_notes: vec![StickyItem {
                        x: 10.0,
                        y: 10.0,
                        text: "ok".to_string(),
                    }],
                    ..Default::default()
                },
            ),
        ];

        let report = AnnotationBurner::default()
            .burn_document(&mut surface, &records)
            .unwrap();

        assert_eq!(report.pages_burned(), 1);
        assert_eq!(report.pages[0].page, 2);
        assert_eq!(report.notes_added(), 1);
        let skipped: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![0, 1]);
    }

    #[test]
    fn test_empty_record_leaves_page_untouched() {
        let mut surface = PdfSurface::from_document(blank_document(1, 612, 792)).unwrap();
        let page = surface.page_id(1).unwrap();
        let before = surface.document().get_dictionary(page).unwrap().clone();

        let records = vec![AnnotationRecord::new(1, PageAnnotations::default())];
        let report = AnnotationBurner::default()
            .burn_document(&mut surface, &records)
            .unwrap();

        assert_eq!(report.pages_burned(), 1);
        let after = surface.document().get_dictionary(page).unwrap();
        assert_eq!(
            after.get(b"Contents").unwrap().as_reference().unwrap(),
            before.get(b"Contents").unwrap().as_reference().unwrap()
        );
        assert!(!after.has(b"Annots"));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = BurnOptions::default()
            .with_eraser_policy(EraserPolicy::default().with_bounds(5.0, 1.0));
        let mut surface = PdfSurface::from_document(blank_document(1, 612, 792)).unwrap();
        let result = AnnotationBurner::new(options).burn_document(&mut surface, &[]);
        assert!(matches!(result, Err(BurnError::InvalidConfig(_))));
    }

    #[test]
    fn test_options_from_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"eraser": {"max_percent": 10.0}, "index": {"kind": "linear"}}"#)
            .unwrap();

        let options = BurnOptions::from_json_file(&path).unwrap();
        assert_eq!(options.eraser.max_percent, 10.0);
        assert_eq!(options.eraser.min_percent, 0.8);
        assert_eq!(options.index.kind, crate::erase::IndexKind::Linear);
        assert!(options.compress);
    }
}
