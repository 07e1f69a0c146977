use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::pack::CompressionType;

type Result<T> = std::result::Result<T, CompressionError>;

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Decoded size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: u64, found: u64 },
}

pub fn decompress_deflate<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: Read,
{
    let mut decoder = DeflateDecoder::new(reader);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output)?;

    Ok(output)
}

pub fn decompress_zstd<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: Read,
{
    let mut output = Vec::new();
    zstd::stream::copy_decode(reader, &mut output)?;

    Ok(output)
}

pub fn compress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        CompressionType::Zstd => {
            let mut output = Vec::new();
            zstd::stream::copy_encode(data, &mut output, 3)?;
            Ok(output)
        }
    }
}

/// Decodes a stored blob and checks it against the recorded payload size.
pub fn decompress(data: Vec<u8>, compression: CompressionType, expected_size: u64) -> Result<Vec<u8>> {
    let output = match compression {
        CompressionType::None => data,
        CompressionType::Deflate => decompress_deflate(&mut &data[..])?,
        CompressionType::Zstd => decompress_zstd(&mut &data[..])?,
    };
    if output.len() as u64 != expected_size {
        return Err(CompressionError::SizeMismatch {
            expected: expected_size,
            found: output.len() as u64,
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_decompress_zstd() {
        let data = b"Hello, world!";
        let mut compressed = Vec::new();
        zstd::stream::copy_encode(&data[..], &mut compressed, 3).unwrap();
        let decompressed = decompress_zstd(&mut Cursor::new(compressed)).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_decompress_deflate() {
        let data = b"Hello, world!";
        let compressed = compress(data, CompressionType::Deflate).unwrap();
        let decompressed = decompress(compressed, CompressionType::Deflate, data.len() as u64).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_size_mismatch() {
        let data = b"Hello, world!".to_vec();
        let err = decompress(data, CompressionType::None, 4).unwrap_err();
        assert!(matches!(err, CompressionError::SizeMismatch { expected: 4, found: 13 }));
    }
}
