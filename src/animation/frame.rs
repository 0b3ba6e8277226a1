use crate::codec::command::format_raw;
use crate::codec::glyphs::{self, COLON_BIT, UNDERLINE_BIT};
use crate::foundation::error::{SegError, SegResult};

/// State of one tube at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    /// A printable character with optional modifiers.
    Char {
        ch: char,
        colon: bool,
        underline: bool,
    },
    /// An explicit segment mask.
    Raw(u16),
}

impl Default for Frame {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Frame {
    pub const BLANK: Frame = Frame::Char {
        ch: ' ',
        colon: false,
        underline: false,
    };

    /// Character frame for `ch`. Fails when the display has no glyph for it.
    pub fn text(ch: char) -> SegResult<Self> {
        if !glyphs::is_printable(ch) {
            return Err(SegError::animation(format!("no glyph for character {ch:?}")));
        }
        Ok(Self::Char {
            ch,
            colon: false,
            underline: false,
        })
    }

    pub fn raw(code: u16) -> Self {
        Self::Raw(code)
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }

    pub fn with_colon(self) -> Self {
        match self {
            Self::Char { ch, underline, .. } => Self::Char {
                ch,
                colon: true,
                underline,
            },
            Self::Raw(code) => Self::Raw(code | COLON_BIT),
        }
    }

    pub fn with_underline(self) -> Self {
        match self {
            Self::Char { ch, colon, .. } => Self::Char {
                ch,
                colon,
                underline: true,
            },
            Self::Raw(code) => Self::Raw(code | UNDERLINE_BIT),
        }
    }

    /// Append this frame's command text to `out`.
    pub fn write_code(&self, out: &mut String) {
        match *self {
            // A bare '!' after another code would read as the underline modifier.
            Self::Char {
                ch: '!',
                colon,
                underline,
            } => {
                let mut code = glyphs::glyph('!').unwrap_or_default();
                if colon {
                    code |= COLON_BIT;
                }
                if underline {
                    code |= UNDERLINE_BIT;
                }
                out.push_str(&format_raw(code));
            }
            Self::Char {
                ch,
                colon,
                underline,
            } => {
                out.push(ch);
                if colon {
                    out.push(':');
                }
                if underline {
                    out.push('!');
                }
            }
            Self::Raw(code) => out.push_str(&format_raw(code)),
        }
    }

    pub fn code(&self) -> String {
        let mut out = String::new();
        self.write_code(&mut out);
        out
    }

    /// Merge two frames. A blank side yields the other frame; two raw frames are OR-ed.
    pub fn overlay(&self, other: &Frame) -> SegResult<Frame> {
        if self.is_blank() {
            return Ok(*other);
        }
        if other.is_blank() {
            return Ok(*self);
        }
        match (self, other) {
            (Self::Raw(a), Self::Raw(b)) => Ok(Self::Raw(a | b)),
            _ => Err(SegError::animation(format!(
                "cannot overlay '{}' with '{}': only raw frames can be merged",
                self.code(),
                other.code()
            ))),
        }
    }
}

/// One frame per tube.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FullFrame(Vec<Frame>);

impl FullFrame {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self(frames)
    }

    pub fn blank(tubes: usize) -> Self {
        Self(vec![Frame::BLANK; tubes])
    }

    pub fn from_text(text: &str) -> SegResult<Self> {
        text_to_frames(text).map(Self)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pad with blanks or cut to exactly `tubes` frames.
    pub fn fit(mut self, tubes: usize) -> Self {
        self.0.resize(tubes, Frame::BLANK);
        self
    }

    /// Overlay position-wise; the longer frame provides the base.
    pub fn overlay(&self, other: &FullFrame) -> SegResult<FullFrame> {
        let (base, top) = if self.len() > other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut merged = base.0.clone();
        for (slot, frame) in merged.iter_mut().zip(&top.0) {
            *slot = slot.overlay(frame)?;
        }
        Ok(Self(merged))
    }

    pub fn code(&self) -> String {
        let mut out = String::new();
        for f in &self.0 {
            f.write_code(&mut out);
        }
        out
    }
}

impl From<Vec<Frame>> for FullFrame {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames)
    }
}

/// Character frames for `text`; `:` and `!` modify the preceding frame.
pub fn text_to_frames(text: &str) -> SegResult<Vec<Frame>> {
    let mut frames: Vec<Frame> = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ':' | '!' => {
                let Some(last) = frames.last_mut() else {
                    return Err(SegError::animation(format!(
                        "text cannot start with the modifier '{c}'"
                    )));
                };
                *last = if c == ':' {
                    last.with_colon()
                } else {
                    last.with_underline()
                };
            }
            _ => frames.push(Frame::text(c)?),
        }
    }
    Ok(frames)
}

const ESCAPES: [(&str, &str); 8] = [
    ("°", "*"),
    ("(", "<"),
    (")", ">"),
    ("?", " !"),
    ("\u{201c}", "\""),
    ("\u{201d}", "\""),
    ("\u{2019}", "'"),
    ("\u{2018}", "'"),
];

/// Upper-case `text` and replace characters the display cannot show with close substitutes.
///
/// `overrides` replace or extend the built-in substitutions.
pub fn escape_text(text: &str, overrides: &[(&str, &str)]) -> String {
    let mut table: Vec<(&str, &str)> = ESCAPES.to_vec();
    for &(from, to) in overrides {
        match table.iter_mut().find(|(f, _)| *f == from) {
            Some(entry) => entry.1 = to,
            None => table.push((from, to)),
        }
    }
    table
        .iter()
        .fold(text.to_uppercase(), |acc, (from, to)| acc.replace(from, to))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/frame.rs"]
mod tests;
