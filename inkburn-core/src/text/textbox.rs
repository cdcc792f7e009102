//! Greedy word wrapping into a fixed-size box

use super::metrics::{measure_text, split_into_words};

/// Slack for floating-point comparisons against the box edges
const FIT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    /// Baseline-to-baseline distance as a multiple of the font size
    pub line_height: f64,
}

/// Lines that fit in the box plus what was cut off
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub dropped_lines: usize,
}

impl TextLayout {
    pub fn is_truncated(&self) -> bool {
        self.dropped_lines > 0
    }
}

impl TextBox {
    pub fn new(width: f64, height: f64, font_size: f64) -> Self {
        Self {
            width,
            height,
            font_size,
            line_height: 1.2,
        }
    }

    pub fn with_line_height(mut self, multiplier: f64) -> Self {
        self.line_height = multiplier;
        self
    }

    /// Distance between consecutive baselines
    pub fn line_step(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Number of lines whose glyphs fit vertically. The first baseline sits
    /// one font size below the top edge.
    pub fn max_lines(&self) -> usize {
        if self.font_size <= 0.0 || self.height < self.font_size - FIT_EPSILON {
            return 0;
        }
        let step = self.line_step();
        if step <= 0.0 {
            return 1;
        }
        ((self.height - self.font_size + FIT_EPSILON) / step).floor() as usize + 1
    }

    /// Wraps every line of `text` to the box width.
    pub fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            self.wrap_paragraph(paragraph, &mut lines);
        }
        lines
    }

    fn wrap_paragraph(&self, paragraph: &str, lines: &mut Vec<String>) {
        let max_width = self.width + FIT_EPSILON;
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in split_into_words(paragraph) {
            let word_width = measure_text(word, self.font_size);

            if word.chars().all(char::is_whitespace) {
                if !current.is_empty() {
                    current.push_str(word);
                    current_width += word_width;
                }
                continue;
            }

            if !current.is_empty() && current_width + word_width > max_width {
                lines.push(current.trim_end().to_string());
                current.clear();
                current_width = 0.0;
            }

            if current.is_empty() && word_width > max_width {
                // Too long for any line: break between characters
                for ch in word.chars() {
                    let ch_width = measure_text(ch.encode_utf8(&mut [0; 4]), self.font_size);
                    if !current.is_empty() && current_width + ch_width > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
                continue;
            }

            current.push_str(word);
            current_width += word_width;
        }

        lines.push(current.trim_end().to_string());
    }

    /// Wraps `text` and keeps only the lines that fit in the box
    pub fn layout(&self, text: &str) -> TextLayout {
        let mut lines = self.wrap(text);
        let max = self.max_lines();
        let dropped_lines = lines.len().saturating_sub(max);
        lines.truncate(max);
        TextLayout {
            lines,
            dropped_lines,
        }
    }
}
