pub mod packed;
pub mod serial;
pub mod sink;
pub mod terminal;

pub use packed::{PackedSink, pack};
pub use serial::{SerialSink, open_port};
pub use sink::{CommandSink, RecordingSink};
pub use terminal::TerminalSink;

#[cfg(test)]
#[path = "../../tests/unit/encode/sinks.rs"]
mod tests;
