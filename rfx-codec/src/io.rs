//! Bounds-checked byte streams for RemoteFX payloads.
//!
//! All multi-byte fields on the RemoteFX wire are little-endian. The input
//! side is a cursor over a borrowed slice: payloads arrive complete inside
//! a surface command, so there is no incremental I/O here. The output side
//! accumulates into a `BytesMut`.
//!
//! `set_position` is the load-bearing operation: the block parser trusts
//! peer-declared block lengths to resync after every block, so an
//! out-of-range target must come back as a recoverable error.

use crate::error::{Result, RfxError};
use bytes::{BufMut, BytesMut};

/// Cursor over a complete in-memory RemoteFX payload.
#[derive(Debug)]
pub struct RfxInStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RfxInStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn check(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(RfxError::UnexpectedEof {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let v = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let v = u32::from_le_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(v)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.check(count)?;
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.check(count)?;
        self.pos += count;
        Ok(())
    }

    /// Reposition the cursor to an absolute offset.
    ///
    /// The end of the buffer is a valid target (nothing left to read).
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(RfxError::SeekOutOfRange {
                target: pos,
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }
}

/// Growable little-endian output stream.
///
/// Length-prefixed blocks are built by encoding the body into a scratch
/// `RfxOutStream` first, then appending it after a header carrying
/// `body.len() + header size`. Nothing ever seeks backwards.
#[derive(Debug, Default)]
pub struct RfxOutStream {
    buf: BytesMut,
}

impl RfxOutStream {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }
}
