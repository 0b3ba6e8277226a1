use crate::codec::command::parse_literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// `{name}`: a sprite or a previously defined segment.
    Macro(&'a str),
    /// `{N}`: repeat the previous frame until it appears N times.
    Multiplier(u32),
    /// `{0x..}` / `{0b..}`: an explicit segment mask.
    Raw(u16),
    /// Plain text, one frame per character.
    Literal(&'a str),
}

pub(crate) fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn marked(line: &str, at: usize) -> String {
    format!("'{}<<HERE>>{}'", &line[..at], &line[at..])
}

/// Split a `frame`/`segment` line into tokens.
pub(crate) fn lex_line(line: &str) -> Result<Vec<Token<'_>>, String> {
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < line.len() {
        let rest = &line[i..];
        let start = i;

        if rest.starts_with('}') {
            return Err(format!("found unmatched '}}': {}", marked(line, i)));
        }

        if rest.starts_with('{') {
            let Some(close) = rest.find('}') else {
                return Err(format!("found unmatched '{{': {}", marked(line, i)));
            };
            let body = &rest[1..close];
            if body.contains('{') {
                return Err(format!("found unmatched '{{': {}", marked(line, i)));
            }

            let kind = if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
                let n = body
                    .parse()
                    .map_err(|_| format!("multiplier '{body}' is too large"))?;
                TokenKind::Multiplier(n)
            } else if is_name(body) {
                TokenKind::Macro(body)
            } else {
                let code = parse_literal(body).map_err(|m| {
                    format!("{m} '{{{body}}}': {}", marked(line, i))
                })?;
                TokenKind::Raw(code)
            };
            i += close + 1;
            out.push(Token {
                kind,
                span: Span { start, end: i },
            });
            continue;
        }

        let len = rest.find(['{', '}']).unwrap_or(rest.len());
        i += len;
        out.push(Token {
            kind: TokenKind::Literal(&rest[..len]),
            span: Span { start, end: i },
        });
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/dsl/lexer.rs"]
mod tests;
