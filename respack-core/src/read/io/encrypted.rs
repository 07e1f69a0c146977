use std::io::{BufRead, Read};

use crate::pack::PackCipher;
use crate::read::PackReaderError;

/// Decrypts an entry blob. CBC with padding needs the whole blob, so the
/// first read pulls and decrypts everything, like a single-chunk stream.
pub struct EncryptedReader<R> {
    reader: R,
    cipher: Option<(PackCipher, [u8; 16])>,
    buffer: Vec<u8>,
    pos: usize,
    has_decrypted: bool,
}

impl<R> EncryptedReader<R>
where
    R: Read,
{
    pub fn new(reader: R, cipher: Option<PackCipher>, iv: [u8; 16]) -> Self {
        Self {
            reader,
            cipher: cipher.map(|c| (c, iv)),
            buffer: Vec::new(),
            pos: 0,
            has_decrypted: false,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    fn decrypt_fill_buf(&mut self) -> std::io::Result<()> {
        self.has_decrypted = true;
        let Some((cipher, iv)) = &self.cipher else {
            return Ok(());
        };
        let mut raw = Vec::new();
        self.reader
            .read_to_end(&mut raw)
            .map_err(|e| PackReaderError::RawData(e).into_io_error())?;
        self.buffer = cipher
            .decrypt(iv, &raw)
            .map_err(|_| PackReaderError::Decryption.into_io_error())?;
        self.pos = 0;
        Ok(())
    }
}

impl<R> Read for EncryptedReader<R>
where
    R: BufRead,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.is_encrypted() {
            return self.reader.read(buf);
        }
        let available = self.fill_buf()?;
        let len = available.len().min(buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.consume(len);
        Ok(len)
    }
}

impl<R> BufRead for EncryptedReader<R>
where
    R: BufRead,
{
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        if !self.is_encrypted() {
            return self.reader.fill_buf();
        }
        if !self.has_decrypted {
            self.decrypt_fill_buf()?;
        }
        Ok(&self.buffer[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        if !self.is_encrypted() {
            self.reader.consume(amt);
            return;
        }
        self.pos = (self.pos + amt).min(self.buffer.len());
    }
}
