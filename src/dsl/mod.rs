//! Line-oriented animation files.
//!
//! ```text
//! # comment
//! sprite|dot|0x4000
//! segment|clock|12:00
//! scale|0.5
//! frame|1|{clock}
//! frame|0|{dot}          # zero duration overlays the previous frame
//! sequence|start|blink
//! frame|1|HI
//! frame|1|{2}
//! sequence|end
//! sequence|insert|blink
//! end
//! ```

mod lexer;
mod loader;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::animation::FullFrameAnimation;
use crate::foundation::error::{SegError, SegResult};

/// Parse an animation file held in memory. Every failing line is reported in one error.
pub fn load_str(text: &str, tubes: usize) -> SegResult<FullFrameAnimation> {
    load_reader(text.as_bytes(), tubes)
}

pub fn load_reader<R: BufRead>(reader: R, tubes: usize) -> SegResult<FullFrameAnimation> {
    loader::Loader::new(tubes).load(reader)
}

/// Parse the animation file at `path`; errors name the file.
#[tracing::instrument]
pub fn load_path(path: &Path, tubes: usize) -> SegResult<FullFrameAnimation> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("open animation file '{}': {e}", path.display()),
        )
    })?;
    load_reader(BufReader::new(file), tubes).map_err(|e| match e {
        SegError::Dsl(mut errs) => {
            errs.path = Some(path.to_path_buf());
            SegError::Dsl(errs)
        }
        other => other,
    })
}
