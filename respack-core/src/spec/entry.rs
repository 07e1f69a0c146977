use std::io::Read;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{PackError, Result};

/// Fixed part of an index record. The UTF-8 name and the metadata pairs follow it.
#[derive(Debug, Clone, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct EntryRecord {
    pub hash_name_lower: u32,
    pub hash_name_upper: u32,
    pub offset: u64,
    pub stored_size: u64,
    pub size: u64,
    pub asset_type: u32,
    pub attributes: u32,
    pub checksum: u32,
    pub name_len: u16,
    pub meta_count: u16,
}

static_assertions::assert_eq_size!(EntryRecord, [u8; 48]);

impl EntryRecord {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn from_reader<R>(reader: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf).map_err(PackError::from_structure_io)?;
        Ok(Self::read_from_bytes(&buf).unwrap())
    }

    pub fn into_bytes(self) -> [u8; Self::SIZE] {
        self.as_bytes().try_into().unwrap()
    }
}
