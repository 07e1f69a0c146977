use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::database::AssetDatabase;
use crate::error::{CorruptArchive, PackError, Result};
use crate::filename;
use crate::pack::{CompressionType, PackCipher, PackEntry, PackHeader, PackIndex};
use crate::spec;

pub mod io;

#[derive(Debug, thiserror::Error)]
pub enum PackReaderError {
    #[error("Failed to read raw data: {0}")]
    RawData(std::io::Error),
    #[error("Failed to decompress from {compression:?}: {source}")]
    Decompression {
        compression: CompressionType,
        source: std::io::Error,
    },
    #[error("Failed to decrypt entry data")]
    Decryption,
    #[error("Decoded size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch { expected: u64, found: u64 },
    #[error("Checksum mismatch: expected {expected:08x}, found {found:08x}")]
    ChecksumMismatch { expected: u32, found: u32 },
}

impl PackReaderError {
    pub fn into_io_error(self) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidData, self.to_string())
    }
}

/// Reads the header and the (possibly encrypted) index of a pack.
pub(crate) fn read_index<R>(reader: &mut R, cipher: Option<&PackCipher>) -> Result<PackIndex>
where
    R: Read + Seek,
{
    // read header
    reader.seek(SeekFrom::Start(0))?;
    let spec_header = spec::Header::from_reader(reader)?;
    let header = PackHeader::try_from(spec_header)?;

    // the index must lie inside the file before anything is sized from it
    let file_size = reader.seek(SeekFrom::End(0))?;
    if header.index_offset().saturating_add(header.index_size() as u64) > file_size {
        return Err(CorruptArchive::Truncated.into());
    }

    // read index
    reader.seek(SeekFrom::Start(header.index_offset()))?;
    let mut index_bytes = vec![0; header.index_size() as usize];
    reader.read_exact(&mut index_bytes).map_err(PackError::from_structure_io)?;
    // decrypt
    if header.is_encrypted() {
        let cipher = cipher.ok_or(CorruptArchive::MissingKey)?;
        index_bytes = cipher.decrypt(header.iv(), &index_bytes)?;
    }
    let found = filename::checksum(&index_bytes);
    if found != header.index_checksum() {
        return Err(CorruptArchive::IndexChecksum {
            expected: header.index_checksum(),
            found,
        }
        .into());
    }
    // parse entries
    let entries = read_entries(&mut Cursor::new(&index_bytes), &header)?;
    let database = AssetDatabase::from_entries(entries).map_err(|e| match e {
        PackError::DuplicateAsset { name, asset_type } => {
            PackError::from(CorruptArchive::InvalidIndex(format!("duplicate asset {asset_type}:{name}")))
        }
        e => e,
    })?;

    Ok(PackIndex::new(header, database))
}

fn read_entries(reader: &mut Cursor<&Vec<u8>>, header: &PackHeader) -> Result<Vec<PackEntry>> {
    let max_entries = reader.get_ref().len() / spec::EntryRecord::SIZE;
    let mut entries = Vec::with_capacity((header.total_entries() as usize).min(max_entries));
    for _ in 0..header.total_entries() {
        let entry = PackEntry::read_from(reader)?;
        check_entry_sizes(&entry, header)?;
        let end = entry.offset().saturating_add(entry.stored_size());
        if entry.offset() < spec::Header::SIZE as u64 || end > header.index_offset() {
            return Err(CorruptArchive::InvalidEntryRange {
                offset: entry.offset(),
                size: entry.stored_size(),
                file_size: header.index_offset(),
            }
            .into());
        }
        entries.push(entry);
    }
    if reader.position() != reader.get_ref().len() as u64 {
        return Err(CorruptArchive::InvalidIndex("trailing bytes after last entry".to_string()).into());
    }

    Ok(entries)
}

fn check_entry_sizes(entry: &PackEntry, header: &PackHeader) -> Result<()> {
    if entry.size() > isize::MAX as u64 {
        return Err(CorruptArchive::InvalidIndex(format!("`{}` claims {} bytes", entry.name(), entry.size())).into());
    }
    // uncompressed blobs determine the payload size exactly
    if entry.compression() == CompressionType::None {
        let expected = if header.is_encrypted() {
            (entry.size() / 16 + 1) * 16
        } else {
            entry.size()
        };
        if entry.stored_size() != expected {
            return Err(CorruptArchive::InvalidIndex(format!(
                "`{}` stores {} bytes for a {} byte payload",
                entry.name(),
                entry.stored_size(),
                entry.size()
            ))
            .into());
        }
    }
    Ok(())
}

/// Reads the stored (still compressed, possibly encrypted) blob of an entry.
pub(crate) fn read_stored_blob<R>(reader: &mut R, entry: &PackEntry) -> Result<Vec<u8>>
where
    R: Read + Seek,
{
    reader.seek(SeekFrom::Start(entry.offset()))?;
    let mut data = vec![0; entry.stored_size() as usize];
    reader.read_exact(&mut data).map_err(PackError::from_structure_io)?;
    Ok(data)
}
