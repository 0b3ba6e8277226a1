//! segtube drives a bank of segmented character tubes.
//!
//! - [`codec`] turns command strings into per-tube segment masks and back
//! - [`animation`] models time-indexed animations sampled with an explicit `now`
//! - [`dsl`] loads animation files
//! - [`render::Assembler`] samples the installed animation and forwards changes to a
//!   [`CommandSink`]
//! - [`schedule::Scheduler`] decides which [`Program`] owns the display
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod codec;
pub mod config;
pub mod dsl;
pub mod encode;
pub mod render;
pub mod schedule;

pub use crate::foundation::core::{DEFAULT_TUBES, secs};
pub use crate::foundation::error::{DecodeError, DslErrors, LineError, SegError, SegResult};
pub use crate::foundation::worker::Waker;

pub use crate::animation::{Animation, Frame, FullFrame, FullFrameAnimation};
pub use crate::config::RunConfig;
pub use crate::encode::{CommandSink, PackedSink, RecordingSink, SerialSink, TerminalSink};
pub use crate::render::Assembler;
pub use crate::schedule::{CronExpr, Program, Scheduler};
