use std::io::{Read, Write};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::asset_type::AssetType;
use crate::error::{CorruptArchive, PackError, Result};
use crate::filename::{self, FileName};
use crate::metadata::Metadata;
use crate::spec;

use super::flag::CompressionType;

/// One asset in the pack index.
#[derive(Clone, PartialEq, Serialize)]
pub struct PackEntry {
    pub(crate) name: String,
    pub(crate) asset_type: AssetType,
    #[serde(serialize_with = "crate::serde_util::serialize_u64_hex")]
    pub(crate) hash: u64,
    pub(crate) offset: u64,
    pub(crate) stored_size: u64,
    pub(crate) size: u64,
    pub(crate) compression: CompressionType,
    #[serde(serialize_with = "crate::serde_util::serialize_u32_hex")]
    pub(crate) checksum: u32,
    pub(crate) meta: Metadata,
}

impl PackEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Absolute offset of the stored blob in the pack.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Size of the blob as stored (compressed and encrypted).
    pub fn stored_size(&self) -> u64 {
        self.stored_size
    }

    /// Size of the payload once decoded.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub(crate) fn read_from<R>(reader: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let record = spec::EntryRecord::from_reader(reader)?;

        let mut name = vec![0; record.name_len as usize];
        reader.read_exact(&mut name).map_err(PackError::from_structure_io)?;
        let name = String::from_utf8(name)
            .map_err(|_| CorruptArchive::InvalidIndex("entry name is not valid UTF-8".to_string()))?;
        if !filename::is_valid_name(&name) {
            return Err(CorruptArchive::InvalidIndex(format!("unsafe entry name `{name}`")).into());
        }

        let hash = FileName::mix_hash(record.hash_name_lower, record.hash_name_upper);
        if FileName::new(&name).hash_mixed() != hash {
            return Err(CorruptArchive::InvalidIndex(format!("name hash mismatch for `{name}`")).into());
        }

        let asset_type = AssetType::try_from(record.asset_type)
            .map_err(|_| CorruptArchive::InvalidIndex(format!("unknown asset type {}", record.asset_type)))?;
        let compression = CompressionType::from_attributes(record.attributes)
            .ok_or_else(|| CorruptArchive::InvalidIndex(format!("invalid attributes 0x{:X}", record.attributes)))?;

        let mut meta = Metadata::new();
        for _ in 0..record.meta_count {
            let key = read_string(reader)?;
            let value = read_string(reader)?;
            meta.set(key, value);
        }

        Ok(Self {
            name,
            asset_type,
            hash,
            offset: record.offset,
            stored_size: record.stored_size,
            size: record.size,
            compression,
            checksum: record.checksum,
            meta,
        })
    }

    pub(crate) fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: Write,
    {
        let record = spec::EntryRecord {
            hash_name_lower: self.hash as u32,
            hash_name_upper: (self.hash >> 32) as u32,
            offset: self.offset,
            stored_size: self.stored_size,
            size: self.size,
            asset_type: self.asset_type.to_u32(),
            attributes: self.compression.into_attributes(),
            checksum: self.checksum,
            name_len: string_len(&self.name)?,
            meta_count: u16::try_from(self.meta.len())
                .map_err(|_| CorruptArchive::InvalidIndex(format!("too much metadata on `{}`", self.name)))?,
        };
        writer.write_all(&record.into_bytes())?;
        writer.write_all(self.name.as_bytes())?;
        for (key, value) in self.meta.iter() {
            write_string(writer, key)?;
            write_string(writer, value)?;
        }

        Ok(())
    }
}

fn string_len(s: &str) -> Result<u16> {
    u16::try_from(s.len()).map_err(|_| CorruptArchive::InvalidIndex(format!("string too long: {} bytes", s.len())).into())
}

fn read_string<R>(reader: &mut R) -> Result<String>
where
    R: Read,
{
    let len = reader.read_u16::<LE>().map_err(PackError::from_structure_io)?;
    let mut buf = vec![0; len as usize];
    reader.read_exact(&mut buf).map_err(PackError::from_structure_io)?;
    String::from_utf8(buf).map_err(|_| CorruptArchive::InvalidIndex("metadata is not valid UTF-8".to_string()).into())
}

fn write_string<W>(writer: &mut W, s: &str) -> Result<()>
where
    W: Write,
{
    writer.write_u16::<LE>(string_len(s)?)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

impl std::fmt::Debug for PackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackEntry")
            .field("name", &self.name)
            .field("asset_type", &self.asset_type)
            .field("hash", &format!("{:016x}", self.hash))
            .field("offset", &self.offset)
            .field("stored_size", &self.stored_size)
            .field("size", &self.size)
            .field("compression", &self.compression)
            .field("checksum", &format!("{:08x}", self.checksum))
            .finish()
    }
}
