use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::system::ResourceDataReader;

/// Pack reader shared between a pack and the streams it handed out.
pub type SharedReader = Arc<Mutex<Box<dyn ResourceDataReader>>>;

/// Reads a byte range of a shared reader, seeking under the lock on every call.
pub struct RangeReader {
    reader: SharedReader,
    pos: u64,
    end: u64,
}

impl RangeReader {
    pub fn new(reader: SharedReader, offset: u64, len: u64) -> Self {
        Self {
            reader,
            pos: offset,
            end: offset.saturating_add(len),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.pos)
    }
}

impl Read for RangeReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let to_read = remaining.min(buf.len() as u64) as usize;

        let mut reader = self.reader.lock();
        reader.seek(SeekFrom::Start(self.pos))?;
        let n = reader.read(&mut buf[..to_read])?;
        drop(reader);

        self.pos += n as u64;
        Ok(n)
    }
}
