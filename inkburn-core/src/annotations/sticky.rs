//! Sticky note (`/Text` annotation)

use lopdf::{Dictionary, Object, ObjectId, StringFormat};

use crate::geometry::Rectangle;
use crate::graphics::Color;

/// Icon types for text annotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Icon {
    Comment,
    Key,
    /// Note icon (default)
    #[default]
    Note,
    Help,
    NewParagraph,
    Paragraph,
    Insert,
}

impl Icon {
    /// Get PDF icon name
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Icon::Comment => "Comment",
            Icon::Key => "Key",
            Icon::Note => "Note",
            Icon::Help => "Help",
            Icon::NewParagraph => "NewParagraph",
            Icon::Paragraph => "Paragraph",
            Icon::Insert => "Insert",
        }
    }

    /// Parses an icon name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Icon::Comment,
            Icon::Key,
            Icon::Note,
            Icon::Help,
            Icon::NewParagraph,
            Icon::Paragraph,
            Icon::Insert,
        ]
        .into_iter()
        .find(|icon| icon.pdf_name().eq_ignore_ascii_case(name))
    }
}

/// Annotation flag bit for "print"
const FLAG_PRINT: i64 = 4;

/// A page-level note (PDF user space)
#[derive(Debug, Clone, PartialEq)]
pub struct StickyNote {
    pub rect: Rectangle,
    pub contents: String,
    pub title: String,
    pub icon: Icon,
    pub open: bool,
    pub color: Color,
}

impl StickyNote {
    /// Default icon edge length in points
    pub const ICON_SIZE: f64 = 20.0;

    /// A note whose icon occupies `rect`
    pub fn with_rect(rect: Rectangle, contents: impl Into<String>) -> Self {
        Self {
            rect,
            contents: contents.into(),
            title: "Sticky Note".to_string(),
            icon: Icon::default(),
            open: true,
            color: Color::yellow(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }

    /// Builds the annotation dictionary, with `/P` pointing at `page_id`
    pub fn to_dictionary(&self, page_id: ObjectId) -> Dictionary {
        let (r, g, b) = self.color.to_rgb();
        let mut annot = Dictionary::new();
        annot.set("Type", Object::Name(b"Annot".to_vec()));
        annot.set("Subtype", Object::Name(b"Text".to_vec()));
        annot.set(
            "Rect",
            Object::Array(vec![
                Object::Real(self.rect.lower_left.x as f32),
                Object::Real(self.rect.lower_left.y as f32),
                Object::Real(self.rect.upper_right.x as f32),
                Object::Real(self.rect.upper_right.y as f32),
            ]),
        );
        annot.set("Contents", text_string(&self.contents));
        annot.set("T", text_string(&self.title));
        annot.set("Name", Object::Name(self.icon.pdf_name().as_bytes().to_vec()));
        annot.set("Open", Object::Boolean(self.open));
        annot.set(
            "C",
            Object::Array(vec![
                Object::Real(r as f32),
                Object::Real(g as f32),
                Object::Real(b as f32),
            ]),
        );
        annot.set("F", Object::Integer(FLAG_PRINT));
        annot.set("P", Object::Reference(page_id));
        annot
    }
}

/// Encodes a PDF text string: plain ASCII as a literal, anything else as
/// UTF-16BE with a byte order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_icon_names() {
        assert_eq!(Icon::Comment.pdf_name(), "Comment");
        assert_eq!(Icon::Note.pdf_name(), "Note");
        assert_eq!(Icon::from_name("help"), Some(Icon::Help));
        assert_eq!(Icon::from_name("bogus"), None);
    }

    fn icon_rect(x: f64, y: f64) -> Rectangle {
        Rectangle::new(Point::new(x, y - 20.0), Point::new(x + 20.0, y))
    }

    #[test]
    fn test_note_defaults() {
        let note = StickyNote::with_rect(icon_rect(200.0, 500.0), "hi");
        assert_eq!(note.rect.lower_left, Point::new(200.0, 480.0));
        assert!(note.open);
        assert_eq!(note.title, "Sticky Note");
        assert_eq!(note.color, Color::yellow());
    }

    #[test]
    fn test_to_dictionary() {
        let note = StickyNote::with_rect(icon_rect(10.0, 30.0), "Check step 3").with_icon(Icon::Comment);
        let dict = note.to_dictionary((5, 0));

        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Text");
        assert_eq!(dict.get(b"Name").unwrap().as_name().unwrap(), b"Comment");
        assert!(dict.get(b"Open").unwrap().as_bool().unwrap());
        assert_eq!(dict.get(b"P").unwrap().as_reference().unwrap(), (5, 0));
        assert_eq!(dict.get(b"Contents").unwrap().as_str().unwrap(), b"Check step 3");
        assert_eq!(dict.get(b"T").unwrap().as_str().unwrap(), b"Sticky Note");
        let rect = dict.get(b"Rect").unwrap().as_array().unwrap();
        assert_eq!(rect.len(), 4);
        assert_eq!(rect[1].as_float().unwrap(), 10.0);
    }

    #[test]
    fn test_non_ascii_contents_use_utf16() {
        match text_string("né") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, b'n', 0x00, 0xE9]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

}
