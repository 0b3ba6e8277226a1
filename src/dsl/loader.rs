use std::collections::HashMap;
use std::io::BufRead;

use tracing::debug;

use crate::animation::{Frame, FullFrame, FullFrameAnimation, TimedSlice};
use crate::codec::command::parse_literal;
use crate::dsl::lexer::{TokenKind, is_name, lex_line};
use crate::foundation::core::secs;
use crate::foundation::error::{DslErrors, LineError, SegResult};

type Timeline = Vec<TimedSlice<FullFrame>>;

/// Largest `{N}` multiplier accepted on a frame line.
pub(crate) const MAX_MULTIPLIER: u32 = 1024;

/// What the loader does after a line.
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Builds a [`FullFrameAnimation`] from animation-file directives, one line at a time.
pub(crate) struct Loader {
    tubes: usize,
    scale: f64,
    sprites: HashMap<String, Frame>,
    segments: HashMap<String, Vec<Frame>>,
    sequences: HashMap<String, Timeline>,
    /// Name and start line of the sequence being recorded.
    open: Option<(String, usize)>,
    timeline: Timeline,
    errors: Vec<LineError>,
}

impl Loader {
    pub(crate) fn new(tubes: usize) -> Self {
        Self {
            tubes,
            scale: 1.0,
            sprites: HashMap::new(),
            segments: HashMap::new(),
            sequences: HashMap::new(),
            open: None,
            timeline: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn load<R: BufRead>(mut self, reader: R) -> SegResult<FullFrameAnimation> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if let Flow::Stop = self.feed(idx + 1, &line) {
                break;
            }
        }
        self.finish().map_err(Into::into)
    }

    pub(crate) fn feed(&mut self, line_no: usize, raw: &str) -> Flow {
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            return Flow::Continue;
        }

        let mut fields = content.split('|');
        let cmd = fields.next().unwrap_or_default().trim();
        let args: Vec<&str> = fields.collect();
        if cmd == "end" {
            return Flow::Stop;
        }

        if let Err(message) = self.dispatch(line_no, cmd, &args) {
            debug!(line = line_no, %message, "animation file error");
            self.errors.push(LineError {
                line: line_no,
                message,
            });
        }
        Flow::Continue
    }

    pub(crate) fn finish(mut self) -> Result<FullFrameAnimation, DslErrors> {
        if let Some((name, line)) = self.open.take() {
            self.errors.push(LineError {
                line,
                message: format!("sequence '{name}' is never ended"),
            });
        }
        if !self.errors.is_empty() {
            self.errors.sort_by_key(|e| e.line);
            return Err(DslErrors {
                path: None,
                errors: self.errors,
            });
        }
        Ok(FullFrameAnimation::new(self.timeline))
    }

    fn dispatch(&mut self, line_no: usize, cmd: &str, args: &[&str]) -> Result<(), String> {
        let (required, optional) = match cmd {
            "sprite" | "segment" | "frame" => (2, 0),
            "scale" => (1, 0),
            "sequence" => (1, 1),
            _ => return Err(format!("no such command '{cmd}'")),
        };
        if args.len() < required || args.len() > required + optional {
            return Err(format!(
                "command '{cmd}' takes {required} required arguments and {optional} optional ones"
            ));
        }

        match cmd {
            "sprite" => self.sprite(args[0].trim(), args[1].trim()),
            "segment" => self.segment(args[0].trim(), args[1]),
            "frame" => self.frame(args[0].trim(), args[1]),
            "scale" => self.set_scale(args[0].trim()),
            _ => self.sequence(line_no, args[0].trim(), args.get(1).map(|s| s.trim())),
        }
    }

    fn sprite(&mut self, name: &str, code: &str) -> Result<(), String> {
        if !is_name(name) {
            return Err(format!("invalid sprite name '{name}'"));
        }
        let value = parse_code(code)
            .map_err(|e| format!("failed to convert sprite code '{code}': {e}"))?;

        debug!(sprite = name, code = value, "found sprite");
        self.sprites.insert(name.to_owned(), Frame::raw(value));
        Ok(())
    }

    fn segment(&mut self, name: &str, line: &str) -> Result<(), String> {
        if self.segments.contains_key(name) {
            return Err(format!("segment '{name}' already exists"));
        }
        if !is_name(name) {
            return Err(format!("invalid segment name '{name}'"));
        }
        let frames = self.parse_frames(line)?;
        debug!(segment = name, frames = frames.len(), "found segment");
        self.segments.insert(name.to_owned(), frames);
        Ok(())
    }

    fn frame(&mut self, duration: &str, line: &str) -> Result<(), String> {
        let value: f64 = duration
            .parse()
            .map_err(|_| format!("argument 'duration' must be a number, not '{duration}'"))?;
        let scaled = value * self.scale;
        let frames = FullFrame::new(self.parse_frames(line)?).fit(self.tubes);

        if scaled == 0.0 {
            let Some(last) = self.active().last_mut() else {
                return Err("no previous frame to overlay".to_owned());
            };
            last.1 = last.1.overlay(&frames).map_err(|e| e.to_string())?;
            return Ok(());
        }

        let duration = secs(scaled)
            .map_err(|_| format!("frame duration must be a positive number, not '{duration}'"))?;
        self.active().push((duration, frames));
        Ok(())
    }

    fn set_scale(&mut self, factor: &str) -> Result<(), String> {
        let scale: f64 = factor
            .parse()
            .map_err(|_| format!("failed to convert scale '{factor}' to a number"))?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(format!("scale must be a positive number, not '{factor}'"));
        }
        debug!(scale, "setting scale");
        self.scale = scale;
        Ok(())
    }

    fn sequence(&mut self, line_no: usize, sub: &str, name: Option<&str>) -> Result<(), String> {
        match (sub, name) {
            ("start", None) | ("insert", None) => {
                Err(format!("'sequence|{sub}' needs a sequence name"))
            }
            ("start", Some(name)) => {
                if let Some((current, _)) = &self.open {
                    return Err(format!(
                        "cannot start new sequence '{name}' before ending '{current}'"
                    ));
                }
                if self.sequences.contains_key(name) {
                    return Err(format!("sequence already exists with name '{name}'"));
                }
                debug!(sequence = name, "starting sequence");
                self.sequences.insert(name.to_owned(), Vec::new());
                self.open = Some((name.to_owned(), line_no));
                Ok(())
            }
            ("end", _) => match self.open.take() {
                Some((name, _)) => {
                    debug!(sequence = %name, "completed sequence");
                    Ok(())
                }
                None => Err("there is no sequence to end".to_owned()),
            },
            ("insert", Some(name)) => {
                let Some(slices) = self.sequences.get(name).cloned() else {
                    return Err(format!("sequence '{name}' doesn't exist"));
                };
                debug!(sequence = name, "inserted sequence");
                self.active().extend(slices);
                Ok(())
            }
            _ => Err(format!("unknown sequence command '{sub}'")),
        }
    }

    /// The timeline new frames go to: the open sequence, or the main timeline.
    fn active(&mut self) -> &mut Timeline {
        if let Some((name, _)) = &self.open
            && let Some(seq) = self.sequences.get_mut(name)
        {
            return seq;
        }
        &mut self.timeline
    }

    fn parse_frames(&self, line: &str) -> Result<Vec<Frame>, String> {
        let mut frames: Vec<Frame> = Vec::new();
        for token in lex_line(line)? {
            match token.kind {
                TokenKind::Literal(text) => {
                    for c in text.chars() {
                        match c {
                            ':' | '!' => {
                                let Some(last) = frames.last_mut() else {
                                    return Err(format!("modifier '{c}' has no preceding frame"));
                                };
                                *last = if c == ':' {
                                    last.with_colon()
                                } else {
                                    last.with_underline()
                                };
                            }
                            _ => frames.push(
                                Frame::text(c)
                                    .map_err(|_| format!("character {c:?} cannot be displayed"))?,
                            ),
                        }
                    }
                }
                TokenKind::Macro(name) => {
                    if let Some(sprite) = self.sprites.get(name) {
                        frames.push(*sprite);
                    } else if let Some(segment) = self.segments.get(name) {
                        frames.extend_from_slice(segment);
                    } else {
                        return Err(format!("symbol '{name}' not defined"));
                    }
                }
                TokenKind::Multiplier(0) => {
                    return Err("multiplier must be a positive integer".to_owned());
                }
                TokenKind::Multiplier(n) if n > MAX_MULTIPLIER => {
                    return Err(format!("multiplier {n} exceeds {MAX_MULTIPLIER}"));
                }
                TokenKind::Multiplier(n) => {
                    let Some(&last) = frames.last() else {
                        return Err("no previous frame to multiply".to_owned());
                    };
                    frames.extend(std::iter::repeat_n(last, n as usize - 1));
                }
                TokenKind::Raw(code) => frames.push(Frame::raw(code)),
            }
        }
        Ok(frames)
    }
}

/// Sprite codes: `0x`/`0b` literals or plain decimal.
fn parse_code(code: &str) -> Result<u16, String> {
    let prefixed = code
        .get(..2)
        .is_some_and(|p| matches!(p, "0x" | "0X" | "0b" | "0B"));
    if prefixed {
        parse_literal(code).map_err(str::to_owned)
    } else {
        code.parse::<u16>().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dsl/loader.rs"]
mod tests;
