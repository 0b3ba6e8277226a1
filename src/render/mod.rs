pub mod assembler;

pub use assembler::{Assembler, DEFAULT_RENDER_PERIOD};
