//! Text support for burned text boxes: WinAnsi encoding, Helvetica metrics
//! and box layout.

pub mod encoding;
pub mod metrics;
pub mod textbox;

pub use encoding::{encode_string_literal, encode_win_ansi};
pub use metrics::{measure_text, split_into_words};
pub use textbox::{TextBox, TextLayout};
