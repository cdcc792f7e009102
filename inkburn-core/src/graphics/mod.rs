mod color;

pub use color::Color;

use crate::text::encoding::encode_string_literal;

/// Bezier control distance for a quarter circle of radius 1
const KAPPA: f64 = 0.552284749831;

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum LineCap {
    Butt = 0,
    Round = 1,
    Square = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum LineJoin {
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// Builds a PDF content stream fragment.
///
/// Coordinates are PDF user space. Colors are emitted lazily when a path is
/// painted, so setting a color costs nothing until it is used.
#[derive(Debug, Clone)]
pub struct GraphicsContext {
    operations: String,
    fill_color: Color,
    stroke_color: Color,
    line_width: f64,
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self {
            operations: String::new(),
            fill_color: Color::black(),
            stroke_color: Color::black(),
            line_width: 1.0,
        }
    }

    fn op(&mut self, line: String) -> &mut Self {
        self.operations.push_str(&line);
        self.operations.push('\n');
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{x:.2} {y:.2} m"))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{x:.2} {y:.2} l"))
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.op(format!(
            "{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x3:.2} {y3:.2} c"
        ))
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(format!("{x:.2} {y:.2} {width:.2} {height:.2} re"))
    }

    /// Appends a closed circle approximated by four cubic curves
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        let k = KAPPA * radius;
        let r = radius;

        self.move_to(cx + r, cy);
        self.curve_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        self.curve_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        self.curve_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        self.curve_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        self.close_path()
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.operations.push_str("h\n");
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.apply_stroke_color();
        self.operations.push_str("S\n");
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.apply_fill_color();
        self.operations.push_str("f\n");
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.stroke_color = color;
        self
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        self.fill_color = color;
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.line_width = width;
        self.op(format!("{width:.2} w"))
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.op(format!("{} J", cap as u8))
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.op(format!("{} j", join as u8))
    }

    /// Concatenates `[a b c d e f]` onto the current transformation matrix
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.op(format!("{a:.2} {b:.2} {c:.2} {d:.2} {e:.2} {f:.2} cm"))
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.operations.push_str("q\n");
        self
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.operations.push_str("Q\n");
        self
    }

    pub fn begin_text(&mut self) -> &mut Self {
        self.operations.push_str("BT\n");
        self
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.operations.push_str("ET\n");
        self
    }

    /// Selects a font by its resource name (without the leading slash)
    pub fn set_font(&mut self, resource: &str, size: f64) -> &mut Self {
        self.op(format!("/{resource} {size:.2} Tf"))
    }

    /// Sets the text fill color for the following text objects
    pub fn set_text_color(&mut self, color: Color) -> &mut Self {
        self.fill_color = color;
        self.apply_fill_color();
        self
    }

    pub fn set_text_position(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{x:.2} {y:.2} Td"))
    }

    /// Shows `text` encoded as WinAnsi
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        let literal = encode_string_literal(text);
        self.op(format!("{literal} Tj"))
    }

    fn apply_stroke_color(&mut self) {
        let line = match self.stroke_color {
            Color::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} RG"),
            Color::Gray(g) => format!("{g:.3} G"),
        };
        self.op(line);
    }

    fn apply_fill_color(&mut self) {
        let line = match self.fill_color {
            Color::Rgb(r, g, b) => format!("{r:.3} {g:.3} {b:.3} rg"),
            Color::Gray(g) => format!("{g:.3} g"),
        };
        self.op(line);
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke_color
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.operations.into_bytes()
    }
}
