//! Eraser radius resolution
//!
//! The drawing surface reports eraser widths in display pixels, which have no
//! fixed relation to PDF points. The policy maps the average eraser width on a
//! page to a percentage of the page width and clamps it into a sane range.

use serde::{Deserialize, Serialize};

use crate::error::{BurnError, Result};

/// Tunable constants for turning eraser widths into a page-space radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserPolicy {
    /// Lower clamp, percent of page width
    pub min_percent: f64,
    /// Upper clamp, percent of page width
    pub max_percent: f64,
    /// Used when the page has no eraser strokes
    pub default_percent: f64,
    pub scale: f64,
    /// Assumed width of the drawing surface in pixels
    pub reference_width_px: f64,
    /// Width assumed for eraser strokes that do not carry one
    pub fallback_stroke_width: f64,
}

impl Default for EraserPolicy {
    fn default() -> Self {
        Self {
            min_percent: 0.8,
            max_percent: 4.0,
            default_percent: 1.5,
            scale: 0.7,
            reference_width_px: 600.0,
            fallback_stroke_width: 10.0,
        }
    }
}

impl EraserPolicy {
    pub fn with_bounds(mut self, min_percent: f64, max_percent: f64) -> Self {
        self.min_percent = min_percent;
        self.max_percent = max_percent;
        self
    }

    pub fn with_default_percent(mut self, percent: f64) -> Self {
        self.default_percent = percent;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_reference_width(mut self, width_px: f64) -> Self {
        self.reference_width_px = width_px;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.min_percent,
            self.max_percent,
            self.default_percent,
            self.scale,
            self.reference_width_px,
            self.fallback_stroke_width,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BurnError::InvalidConfig(
                "eraser policy values must be finite".to_string(),
            ));
        }
        if self.min_percent > self.max_percent {
            return Err(BurnError::InvalidConfig(format!(
                "eraser min_percent {} exceeds max_percent {}",
                self.min_percent, self.max_percent
            )));
        }
        if self.reference_width_px <= 0.0 {
            return Err(BurnError::InvalidConfig(
                "eraser reference_width_px must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Radius as a percentage of the page width for a page whose eraser
    /// strokes carry `widths` (`None` for strokes without a width).
    pub fn resolve_radius_percent<I>(&self, widths: I) -> f64
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let (sum, count) = widths
            .into_iter()
            .map(|w| match w {
                Some(w) if w.is_finite() => w,
                _ => self.fallback_stroke_width,
            })
            .fold((0.0, 0usize), |(sum, count), w| (sum + w, count + 1));

        if count == 0 {
            return self.default_percent;
        }

        let average = sum / count as f64;
        let percent = average / self.reference_width_px * 100.0 * self.scale;
        percent.max(self.min_percent).min(self.max_percent)
    }

    /// Page-space radius for a resolved percentage.
    ///
    /// The percentage describes the eraser's full width, so the radius is half
    /// of it.
    pub fn radius_for_page(&self, percent: f64, page_width: f64) -> f64 {
        percent / 100.0 * page_width * 0.5
    }
}
