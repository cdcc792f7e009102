//! Page-level annotation objects
//!
//! Sticky notes are not burned into the content stream. They are attached to
//! the page's `/Annots` array so viewers show them as notes.

mod sticky;

pub use sticky::{text_string, Icon, StickyNote};
