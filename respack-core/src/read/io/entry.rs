use std::io::{BufReader, Read};

use crate::error::Result;
use crate::filename::ChecksumHasher;
use crate::pack::{PackCipher, PackEntry, entry_iv};
use crate::read::PackReaderError;

use super::compressed::CompressedReader;
use super::encrypted::EncryptedReader;
use super::range::{RangeReader, SharedReader};

/// Streams the decoded payload of a pack entry.
///
/// The decoded length and checksum are checked against the index; a mismatch
/// is reported as `InvalidData` once the payload is exhausted.
pub struct PackEntryReader {
    reader: CompressedReader<EncryptedReader<BufReader<RangeReader>>>,
    size: u64,
    checksum: u32,
    read: u64,
    hasher: ChecksumHasher,
    verified: bool,
}

impl PackEntryReader {
    pub fn new(shared: SharedReader, entry: &PackEntry, cipher: Option<PackCipher>, pack_iv: &[u8; 16]) -> Result<Self> {
        let r = RangeReader::new(shared, entry.offset(), entry.stored_size());
        let r = EncryptedReader::new(BufReader::new(r), cipher, entry_iv(pack_iv, entry.hash(), entry.asset_type()));
        let r = CompressedReader::new(r, entry.compression())?;
        Ok(Self {
            reader: r,
            size: entry.size(),
            checksum: entry.checksum(),
            read: 0,
            hasher: ChecksumHasher::new(),
            verified: false,
        })
    }

    fn verify(&mut self) -> std::io::Result<()> {
        if self.read != self.size {
            return Err(PackReaderError::SizeMismatch {
                expected: self.size,
                found: self.read,
            }
            .into_io_error());
        }
        let found = self.hasher.finish();
        if found != self.checksum {
            return Err(PackReaderError::ChecksumMismatch {
                expected: self.checksum,
                found,
            }
            .into_io_error());
        }
        self.verified = true;
        Ok(())
    }
}

impl Read for PackEntryReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.verified || buf.is_empty() {
            return Ok(0);
        }
        let n = self.reader.read(buf)?;
        if n == 0 {
            self.verify()?;
            return Ok(0);
        }
        self.read += n as u64;
        if self.read > self.size {
            return Err(PackReaderError::SizeMismatch {
                expected: self.size,
                found: self.read,
            }
            .into_io_error());
        }
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
