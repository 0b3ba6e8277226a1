pub mod art;
pub mod command;
pub mod glyphs;

pub use art::{render_codes, render_command};
pub use command::{cmd_len, decode, format_raw, parse_literal, truncate};
pub use glyphs::{COLON_BIT, UNDERLINE_BIT, glyph, is_printable};
