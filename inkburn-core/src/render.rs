//! Page rendering
//!
//! Turns surviving strokes, text marks and sticky marks into a content stream
//! fragment plus a list of note annotations. Inputs are in page space (origin
//! top-left, y down); output is PDF user space.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::annotations::{Icon, StickyNote};
use crate::erase::SurvivingStroke;
use crate::error::{BurnError, Result};
use crate::geometry::{Point, Rectangle};
use crate::graphics::{Color, GraphicsContext, LineCap, LineJoin};
use crate::text::TextBox;

/// Resource name under which the burned Helvetica font is registered
pub const FONT_RESOURCE_NAME: &str = "InkburnHelv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Joint circle radius as a fraction of the stroke width
    pub joint_radius_factor: f64,
    /// Radius of an isolated dot as a fraction of the stroke width
    pub dot_radius_factor: f64,
    pub text_box_width: f64,
    pub text_box_height: f64,
    pub default_font_size: f64,
    pub line_height: f64,
    /// Used for text marks without their own fill
    pub text_color: String,
    pub sticky_title: String,
    pub sticky_icon: String,
    pub sticky_size: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            joint_radius_factor: 0.25,
            dot_radius_factor: 0.5,
            text_box_width: 200.0,
            text_box_height: 50.0,
            default_font_size: 16.0,
            line_height: 1.2,
            text_color: "red".to_string(),
            sticky_title: "Sticky Note".to_string(),
            sticky_icon: "Note".to_string(),
            sticky_size: StickyNote::ICON_SIZE,
        }
    }
}

impl RenderOptions {
    pub fn with_text_box(mut self, width: f64, height: f64) -> Self {
        self.text_box_width = width;
        self.text_box_height = height;
        self
    }

    pub fn with_default_font_size(mut self, size: f64) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_font_size.is_finite() && self.default_font_size > 0.0) {
            return Err(BurnError::InvalidConfig(format!(
                "default_font_size must be positive, got {}",
                self.default_font_size
            )));
        }
        if !(self.text_box_width > 0.0 && self.text_box_height > 0.0) {
            return Err(BurnError::InvalidConfig(
                "text box dimensions must be positive".to_string(),
            ));
        }
        if Icon::from_name(&self.sticky_icon).is_none() {
            return Err(BurnError::InvalidConfig(format!(
                "unknown sticky icon '{}'",
                self.sticky_icon
            )));
        }
        Ok(())
    }
}

/// Clockwise rotation of a page when displayed (`/Rotate`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRotation {
    #[default]
    None,
    Clockwise90,
    Rotate180,
    Clockwise270,
}

impl PageRotation {
    /// Any multiple of 90, negative values included
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(PageRotation::None),
            90 => Some(PageRotation::Clockwise90),
            180 => Some(PageRotation::Rotate180),
            270 => Some(PageRotation::Clockwise270),
            _ => None,
        }
    }

    pub fn to_degrees(self) -> i64 {
        match self {
            PageRotation::None => 0,
            PageRotation::Clockwise90 => 90,
            PageRotation::Rotate180 => 180,
            PageRotation::Clockwise270 => 270,
        }
    }

    fn is_quarter_turn(self) -> bool {
        matches!(self, PageRotation::Clockwise90 | PageRotation::Clockwise270)
    }
}

/// Maps page space onto a page box in PDF user space.
///
/// Page space is the page as displayed: for a rotated page its width and
/// height are those of the rotated box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub page_box: Rectangle,
    pub rotation: PageRotation,
}

impl PageFrame {
    pub fn new(page_box: Rectangle) -> Self {
        Self {
            page_box,
            rotation: PageRotation::None,
        }
    }

    pub fn with_rotation(mut self, rotation: PageRotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn width(&self) -> f64 {
        if self.rotation.is_quarter_turn() {
            self.page_box.height()
        } else {
            self.page_box.width()
        }
    }

    pub fn height(&self) -> f64 {
        if self.rotation.is_quarter_turn() {
            self.page_box.width()
        } else {
            self.page_box.height()
        }
    }

    /// Matrix taking the displayed page (origin bottom-left, y up) onto the
    /// page box in user space
    pub fn matrix(&self) -> [f64; 6] {
        let Rectangle {
            lower_left: ll,
            upper_right: ur,
        } = self.page_box;
        match self.rotation {
            PageRotation::None => [1.0, 0.0, 0.0, 1.0, ll.x, ll.y],
            PageRotation::Clockwise90 => [0.0, 1.0, -1.0, 0.0, ur.x, ll.y],
            PageRotation::Rotate180 => [-1.0, 0.0, 0.0, -1.0, ur.x, ur.y],
            PageRotation::Clockwise270 => [0.0, -1.0, 1.0, 0.0, ll.x, ur.y],
        }
    }

    /// Page space to the displayed page, y flipped
    fn to_display(&self, p: Point) -> Point {
        Point::new(p.x, self.height() - p.y)
    }

    pub fn to_pdf(&self, p: Point) -> Point {
        match self.rotation {
            PageRotation::None => Point::new(
                self.page_box.lower_left.x + p.x,
                self.page_box.upper_right.y - p.y,
            ),
            _ => {
                let [a, b, c, d, e, f] = self.matrix();
                let q = self.to_display(p);
                Point::new(a * q.x + c * q.y + e, b * q.x + d * q.y + f)
            }
        }
    }

    /// Coordinates written into the burned content stream. A rotated page
    /// draws in displayed space under [`PageFrame::matrix`].
    pub fn to_content(&self, p: Point) -> Point {
        match self.rotation {
            PageRotation::None => self.to_pdf(p),
            _ => self.to_display(p),
        }
    }

    /// User-space rectangle for a square of `size` hanging below and right
    /// of `top_left`
    pub fn square_to_pdf(&self, top_left: Point, size: f64) -> Rectangle {
        Rectangle::from_corners(
            self.to_pdf(top_left),
            self.to_pdf(Point::new(top_left.x + size, top_left.y + size)),
        )
    }
}

/// A text box to burn, positioned by its top-left corner in page space
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    pub position: Point,
    pub text: String,
    pub font_size: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StickyMark {
    pub position: Point,
    pub text: String,
}

/// Output of rendering one page
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// Content stream fragment, empty when nothing is burned
    pub content: Vec<u8>,
    /// Whether the content references [`FONT_RESOURCE_NAME`]
    pub uses_font: bool,
    pub notes: Vec<StickyNote>,
    pub polylines_drawn: usize,
    pub dots_drawn: usize,
    pub truncated_texts: usize,
}

#[derive(Debug, Clone)]
pub struct PageRenderer<'a> {
    frame: PageFrame,
    options: &'a RenderOptions,
}

impl<'a> PageRenderer<'a> {
    pub fn new(frame: PageFrame, options: &'a RenderOptions) -> Self {
        Self { frame, options }
    }

    pub fn render(
        &self,
        strokes: &[SurvivingStroke],
        texts: &[TextMark],
        stickies: &[StickyMark],
    ) -> RenderedPage {
        let mut page = RenderedPage::default();
        let mut ctx = GraphicsContext::new();

        for stroke in strokes {
            self.draw_stroke(&mut ctx, stroke, &mut page);
        }
        for mark in texts {
            self.draw_text(&mut ctx, mark, &mut page);
        }

        if !ctx.is_empty() {
            let mut wrapper = GraphicsContext::new();
            wrapper.save_state();
            if self.frame.rotation != PageRotation::None {
                let [a, b, c, d, e, f] = self.frame.matrix();
                wrapper.transform(a, b, c, d, e, f);
            }
            let mut content = wrapper.into_bytes();
            content.extend(ctx.into_bytes());
            content.extend_from_slice(b"Q\n");
            page.content = content;
        }

        let icon = Icon::from_name(&self.options.sticky_icon).unwrap_or_default();
        page.notes = stickies
            .iter()
            .map(|mark| {
                StickyNote::with_rect(
                    self.frame.square_to_pdf(mark.position, self.options.sticky_size),
                    mark.text.clone(),
                )
                .with_title(self.options.sticky_title.clone())
                .with_icon(icon)
            })
            .collect();

        page
    }

    fn draw_stroke(&self, ctx: &mut GraphicsContext, stroke: &SurvivingStroke, page: &mut RenderedPage) {
        let joint_radius = stroke.width * self.options.joint_radius_factor;
        let dot_radius = stroke.width * self.options.dot_radius_factor;

        for polyline in &stroke.polylines {
            let points: Vec<Point> = polyline.iter().map(|p| self.frame.to_content(*p)).collect();
            match points.as_slice() {
                [] => {}
                [dot] => {
                    if dot_radius > 0.0 {
                        ctx.set_fill_color(stroke.color)
                            .circle(dot.x, dot.y, dot_radius)
                            .fill();
                    }
                    page.dots_drawn += 1;
                }
                [first, rest @ ..] => {
                    ctx.set_line_width(stroke.width)
                        .set_line_cap(LineCap::Round)
                        .set_line_join(LineJoin::Round)
                        .set_stroke_color(stroke.color)
                        .move_to(first.x, first.y);
                    for p in rest {
                        ctx.line_to(p.x, p.y);
                    }
                    ctx.stroke();

                    if joint_radius > 0.0 {
                        for p in &points {
                            ctx.circle(p.x, p.y, joint_radius);
                        }
                        ctx.set_fill_color(stroke.color).fill();
                    }
                    page.polylines_drawn += 1;
                }
            }
        }
    }

    fn draw_text(&self, ctx: &mut GraphicsContext, mark: &TextMark, page: &mut RenderedPage) {
        let text_box = TextBox::new(
            self.options.text_box_width,
            self.options.text_box_height,
            mark.font_size,
        )
        .with_line_height(self.options.line_height);
        let layout = text_box.layout(&mark.text);

        if layout.is_truncated() {
            warn!(
                "Text box at ({:.1}, {:.1}) overflows, dropping {} line(s)",
                mark.position.x, mark.position.y, layout.dropped_lines
            );
            page.truncated_texts += 1;
        }

        let top_left = self.frame.to_content(mark.position);
        let step = text_box.line_step();
        for (i, line) in layout.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = top_left.y - mark.font_size - i as f64 * step;
            ctx.begin_text()
                .set_font(FONT_RESOURCE_NAME, mark.font_size)
                .set_text_color(mark.color)
                .set_text_position(top_left.x, baseline)
                .show_text(line)
                .end_text();
            page.uses_font = true;
        }
    }
}
