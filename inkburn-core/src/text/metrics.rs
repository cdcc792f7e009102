use std::collections::HashMap;

/// Width of characters missing from the table, in 1/1000 em
const DEFAULT_WIDTH: u16 = 556;

lazy_static::lazy_static! {
    /// Helvetica advance widths in 1/1000 of the font size
    static ref HELVETICA_WIDTHS: HashMap<char, u16> = [
        (' ', 278), ('!', 278), ('"', 355), ('#', 556), ('$', 556), ('%', 889),
        ('&', 667), ('\'', 191), ('(', 333), (')', 333), ('*', 389), ('+', 584),
        (',', 278), ('-', 333), ('.', 278), ('/', 278), ('0', 556), ('1', 556),
        ('2', 556), ('3', 556), ('4', 556), ('5', 556), ('6', 556), ('7', 556),
        ('8', 556), ('9', 556), (':', 278), (';', 278), ('<', 584), ('=', 584),
        ('>', 584), ('?', 556), ('@', 1015), ('A', 667), ('B', 667), ('C', 722),
        ('D', 722), ('E', 667), ('F', 611), ('G', 778), ('H', 722), ('I', 278),
        ('J', 500), ('K', 667), ('L', 556), ('M', 833), ('N', 722), ('O', 778),
        ('P', 667), ('Q', 778), ('R', 722), ('S', 667), ('T', 611), ('U', 722),
        ('V', 667), ('W', 944), ('X', 667), ('Y', 667), ('Z', 611), ('[', 278),
        ('\\', 278), (']', 278), ('^', 469), ('_', 556), ('`', 333), ('a', 556),
        ('b', 556), ('c', 500), ('d', 556), ('e', 556), ('f', 278), ('g', 556),
        ('h', 556), ('i', 222), ('j', 222), ('k', 500), ('l', 222), ('m', 833),
        ('n', 556), ('o', 556), ('p', 556), ('q', 556), ('r', 333), ('s', 500),
        ('t', 278), ('u', 556), ('v', 500), ('w', 722), ('x', 500), ('y', 500),
        ('z', 500), ('{', 334), ('|', 260), ('}', 334), ('~', 584),
    ]
    .into_iter()
    .collect();
}

pub fn char_width_units(ch: char) -> u16 {
    HELVETICA_WIDTHS.get(&ch).copied().unwrap_or(DEFAULT_WIDTH)
}

/// Measure the width of a text string in Helvetica at `font_size`
pub fn measure_text(text: &str, font_size: f64) -> f64 {
    let width_units: u32 = text.chars().map(|ch| char_width_units(ch) as u32).sum();
    (width_units as f64 / 1000.0) * font_size
}

/// Split text into words, preserving runs of whitespace as their own items
pub fn split_into_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = false;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if !in_space {
                if i > start {
                    words.push(&text[start..i]);
                }
                start = i;
                in_space = true;
            }
        } else if in_space {
            if i > start {
                words.push(&text[start..i]);
            }
            start = i;
            in_space = false;
        }
    }

    if start < text.len() {
        words.push(&text[start..]);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_text_helvetica() {
        // H=722 e=556 l=222 l=222 o=556 -> 2278
        let width = measure_text("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-9);
    }

    #[test]
    fn test_measure_text_empty_string() {
        assert_eq!(measure_text("", 12.0), 0.0);
    }

    #[test]
    fn test_font_size_scaling() {
        let small = measure_text("Test", 10.0);
        let large = measure_text("Test", 20.0);
        assert!((large - small * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_characters_use_default_width() {
        assert_eq!(char_width_units('中'), DEFAULT_WIDTH);
        assert_eq!(char_width_units('i'), 222);
    }

    #[test]
    fn test_split_into_words_simple() {
        assert_eq!(split_into_words("Hello World"), vec!["Hello", " ", "World"]);
    }

    #[test]
    fn test_split_into_words_multiple_spaces() {
        assert_eq!(split_into_words("a   b"), vec!["a", "   ", "b"]);
    }

    #[test]
    fn test_split_into_words_leading_trailing_spaces() {
        assert_eq!(split_into_words("  x  "), vec!["  ", "x", "  "]);
    }

    #[test]
    fn test_split_into_words_empty() {
        assert!(split_into_words("").is_empty());
    }

    #[test]
    fn test_split_into_words_tabs_newlines() {
        assert_eq!(split_into_words("a\tb\nc"), vec!["a", "\t", "b", "\n", "c"]);
    }
}
