use std::io::Write;

use crate::codec::decode;
use crate::encode::sink::CommandSink;
use crate::foundation::error::SegResult;

/// Writes each command as two big-endian bytes per tube, last tube first.
///
/// Commands narrower than the display are padded with dark tubes; wider ones are cut.
pub struct PackedSink<W> {
    out: W,
    tubes: usize,
}

impl<W: Write + Send> PackedSink<W> {
    pub fn new(out: W, tubes: usize) -> Self {
        Self { out, tubes }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Pack `codes` for a `tubes`-wide display.
pub fn pack(codes: &[u16], tubes: usize) -> Vec<u8> {
    let mut codes = codes.to_vec();
    codes.resize(tubes, 0);
    codes.iter().rev().flat_map(|c| c.to_be_bytes()).collect()
}

impl<W: Write + Send> CommandSink for PackedSink<W> {
    fn send(&mut self, cmd: &str) -> SegResult<()> {
        let codes = decode(cmd)?;
        self.out.write_all(&pack(&codes, self.tubes))?;
        self.out.flush()?;
        Ok(())
    }
}
