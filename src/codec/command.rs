//! Command strings: printable characters plus `{…}` tokens and the `:`/`!` modifiers.
//!
//! - a printable character is one code;
//! - `{0x…}` / `{0b…}` is a literal 16-bit code;
//! - `{!…}` underlines every character up to the closing brace;
//! - `:` and `!` after a code add the colon and underline bits to it.
//!
//! A `!` as the very first character is the glyph `!`, not a modifier.

use crate::codec::glyphs::{self, COLON_BIT, UNDERLINE_BIT};
use crate::foundation::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PieceKind<'a> {
    Glyph(char),
    Literal(&'a str),
    Colon,
    Underline,
}

/// One lexical unit of a command with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Piece<'a> {
    pub kind: PieceKind<'a>,
    pub start: usize,
    pub end: usize,
    /// Inside a `{!…}` run.
    pub in_run: bool,
}

impl Piece<'_> {
    fn is_code(&self) -> bool {
        matches!(self.kind, PieceKind::Glyph(_) | PieceKind::Literal(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Idle,
    TokenStart,
    Token,
    Underline,
}

/// Split `cmd` into pieces. Returns the pieces seen so far and, if the command ended inside a
/// token or underline run, the error for it.
pub(crate) fn scan(cmd: &str) -> (Vec<Piece<'_>>, Option<DecodeError>) {
    let mut pieces = Vec::with_capacity(cmd.len());
    let mut state = State::Start;
    let mut open = 0usize;
    let mut token_start = 0usize;

    let mut push = |kind, start: usize, end: usize, in_run| {
        pieces.push(Piece {
            kind,
            start,
            end,
            in_run,
        })
    };

    for (i, c) in cmd.char_indices() {
        let end = i + c.len_utf8();
        state = match state {
            State::Start | State::Idle if c == '{' => {
                open = i;
                State::TokenStart
            }
            State::Start => {
                push(PieceKind::Glyph(c), i, end, false);
                State::Idle
            }
            State::Idle => {
                let kind = match c {
                    ':' => PieceKind::Colon,
                    '!' => PieceKind::Underline,
                    _ => PieceKind::Glyph(c),
                };
                push(kind, i, end, false);
                State::Idle
            }
            State::TokenStart => match c {
                '!' => State::Underline,
                '}' => {
                    push(PieceKind::Literal(""), open, end, false);
                    State::Idle
                }
                _ => {
                    token_start = i;
                    State::Token
                }
            },
            State::Token => {
                if c == '}' {
                    push(PieceKind::Literal(&cmd[token_start..i]), open, end, false);
                    State::Idle
                } else {
                    State::Token
                }
            }
            State::Underline => match c {
                '}' => State::Idle,
                ':' => {
                    push(PieceKind::Colon, i, end, true);
                    State::Underline
                }
                _ => {
                    push(PieceKind::Glyph(c), i, end, true);
                    State::Underline
                }
            },
        };
    }

    let err = match state {
        State::TokenStart | State::Token | State::Underline => Some(DecodeError::new(
            open,
            &cmd[open..],
            "unterminated token",
        )),
        State::Start | State::Idle => None,
    };
    (pieces, err)
}

/// Parse the body of a `{…}` literal: `0x`/`0b` prefixed, at most 16 bits.
pub fn parse_literal(token: &str) -> Result<u16, &'static str> {
    let (digits, radix) = if let Some(d) = strip_prefix_ci(token, "0x") {
        (d, 16)
    } else if let Some(d) = strip_prefix_ci(token, "0b") {
        (d, 2)
    } else {
        return Err("invalid token");
    };
    if digits.is_empty() || digits.starts_with('+') {
        return Err("invalid literal");
    }
    u32::from_str_radix(digits, radix)
        .map_err(|_| "invalid literal")
        .and_then(|v| u16::try_from(v).map_err(|_| "literal does not fit in 16 bits"))
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Decode a command into one 16-bit code per displayed position.
pub fn decode(cmd: &str) -> Result<Vec<u16>, DecodeError> {
    let (pieces, unterminated) = scan(cmd);
    let mut codes: Vec<u16> = Vec::with_capacity(pieces.len());

    for p in &pieces {
        let token = &cmd[p.start..p.end];
        match p.kind {
            PieceKind::Glyph(c) => {
                let code = glyphs::glyph(c)
                    .ok_or_else(|| DecodeError::new(p.start, token, "unknown glyph"))?;
                codes.push(if p.in_run { code | UNDERLINE_BIT } else { code });
            }
            PieceKind::Literal(body) => {
                let code = parse_literal(body).map_err(|m| DecodeError::new(p.start, token, m))?;
                codes.push(code);
            }
            PieceKind::Colon | PieceKind::Underline => {
                let bit = if p.kind == PieceKind::Colon {
                    COLON_BIT
                } else {
                    UNDERLINE_BIT
                };
                let last = codes.last_mut().ok_or_else(|| {
                    DecodeError::new(p.start, token, "modifier has no preceding code")
                })?;
                *last |= bit;
            }
        }
    }

    match unterminated {
        Some(err) => Err(err),
        None => Ok(codes),
    }
}

/// Number of displayed positions in `cmd`, without validating glyphs or literals.
pub fn cmd_len(cmd: &str) -> usize {
    scan(cmd).0.iter().filter(|p| p.is_code()).count()
}

/// Keep the first `n` positions of `cmd` together with their modifiers. An underline run cut
/// in the middle is closed again.
pub fn truncate(cmd: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let (pieces, _) = scan(cmd);
    let Some(cut) = pieces
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_code())
        .nth(n)
        .map(|(i, _)| i)
    else {
        return cmd.to_owned();
    };

    let last = &pieces[cut - 1];
    let mut out = cmd[..last.end].to_owned();
    if last.in_run {
        out.push('}');
    }
    out
}

/// Command for a single raw code, e.g. `{0x113f}`.
pub fn format_raw(code: u16) -> String {
    format!("{{{code:#x}}}")
}

#[cfg(test)]
#[path = "../../tests/unit/codec/command.rs"]
mod tests;
