use std::fmt;
use std::path::PathBuf;

pub type SegResult<T> = Result<T, SegError>;

#[derive(thiserror::Error, Debug)]
pub enum SegError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("dsl error: {0}")]
    Dsl(#[from] DslErrors),

    #[error("schedule error: {0}")]
    Schedule(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SegError {
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

/// A malformed command string.
///
/// `position` is the byte offset of the offending token inside the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub position: usize,
    pub token: String,
    pub message: String,
}

impl DecodeError {
    pub(crate) fn new(position: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            position,
            token: token.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {} (token '{}')",
            self.message, self.position, self.token
        )
    }
}

impl std::error::Error for DecodeError {}

/// One failed line of an animation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    pub line: usize,
    pub message: String,
}

/// Every error found while loading an animation file, in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslErrors {
    pub path: Option<PathBuf>,
    pub errors: Vec<LineError>,
}

impl DslErrors {
    /// Line numbers that failed, in the order they were reported.
    pub fn lines(&self) -> Vec<usize> {
        self.errors.iter().map(|e| e.line).collect()
    }
}

impl fmt::Display for DslErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "failed to load animation file '{}': ", path.display())?;
        }
        write!(f, "found {} errors:", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\nline {}: {}", e.line, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for DslErrors {}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
