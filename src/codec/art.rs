//! Text-art rendering of segment codes, six lines per row of tubes.

use crate::codec::command::decode;
use crate::codec::glyphs::{COLON_BIT, UNDERLINE_BIT};
use crate::foundation::error::DecodeError;

pub const ART_LINES: usize = 6;
const CELL_WIDTH: usize = 5;

/// (bit, column, glyph) for every segment drawn on lines 1 and 3.
const UPPER: [(u16, usize, char); 5] = [
    (0x0020, 0, '|'),
    (0x0040, 1, '\\'),
    (0x0080, 2, '|'),
    (0x0100, 3, '/'),
    (0x0002, 4, '|'),
];
const LOWER: [(u16, usize, char); 5] = [
    (0x0010, 0, '|'),
    (0x1000, 1, '/'),
    (0x0800, 2, '|'),
    (0x0400, 3, '\\'),
    (0x0004, 4, '|'),
];
const COLON_COLUMN: [&str; ART_LINES] = ["   ", " • ", "   ", " • ", "   ", "   "];
const GAP: &str = "   ";

fn row(segments: &[(u16, usize, char)], code: u16) -> String {
    let mut cells = [' '; CELL_WIDTH];
    for &(bit, col, ch) in segments {
        if code & bit != 0 {
            cells[col] = ch;
        }
    }
    cells.iter().collect()
}

/// The six lines of a single tube. The colon column is included only when the colon bit is set.
pub fn code_lines(code: u16) -> [String; ART_LINES] {
    let lit = |bit: u16, on: &str| {
        if code & bit != 0 {
            on.to_owned()
        } else {
            " ".repeat(CELL_WIDTH)
        }
    };

    let mut middle = [' '; CELL_WIDTH];
    if code & 0x2000 != 0 {
        middle[0] = '-';
        middle[1] = '-';
    }
    if code & 0x0200 != 0 {
        middle[3] = '-';
        middle[4] = '-';
    }

    let mut lines = [
        lit(0x0001, " ___ "),
        row(&UPPER, code),
        middle.iter().collect(),
        row(&LOWER, code),
        lit(0x0008, " \u{203e}\u{203e}\u{203e} "),
        lit(UNDERLINE_BIT, "_____"),
    ];
    if code & COLON_BIT != 0 {
        for (line, dots) in lines.iter_mut().zip(COLON_COLUMN) {
            line.push_str(dots);
        }
    }
    lines
}

/// Render codes side by side. Tubes without a colon get a blank column of the same width.
pub fn render_codes(codes: &[u16]) -> String {
    let mut out: [String; ART_LINES] = Default::default();
    for &code in codes {
        let has_colon = code & COLON_BIT != 0;
        for (acc, line) in out.iter_mut().zip(code_lines(code)) {
            acc.push_str(&line);
            if !has_colon {
                acc.push_str(GAP);
            }
        }
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

pub fn render_command(cmd: &str) -> Result<String, DecodeError> {
    Ok(render_codes(&decode(cmd)?))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/art.rs"]
mod tests;
