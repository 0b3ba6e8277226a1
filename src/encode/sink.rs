use std::sync::{Arc, Mutex};

use crate::foundation::error::SegResult;
use crate::foundation::worker::lock;

/// Destination for command strings.
///
/// Ordering contract: `send` is called with commands in display order, one per visible change.
pub trait CommandSink: Send {
    fn send(&mut self, cmd: &str) -> SegResult<()>;
}

/// In-memory sink for tests and debugging.
///
/// Clones share one log, so a test can keep a handle while another clone is owned by the
/// assembler.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.log).clone()
    }

    pub fn last(&self) -> Option<String> {
        lock(&self.log).last().cloned()
    }

    pub fn clear(&self) {
        lock(&self.log).clear();
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, cmd: &str) -> SegResult<()> {
        lock(&self.log).push(cmd.to_owned());
        Ok(())
    }
}
