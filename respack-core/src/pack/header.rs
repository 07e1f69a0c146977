use crate::error::CorruptArchive;
use crate::spec;

use super::flag::FeatureFlags;

pub const PACK_MAGIC: [u8; 4] = *b"RPAK";
pub const PACK_MAJOR_VERSION: u8 = 1;
pub const PACK_MINOR_VERSION: u8 = 0;

#[derive(Clone, Default)]
pub struct PackHeader {
    magic: [u8; 4],
    major_version: u8,
    minor_version: u8,
    feature: FeatureFlags,
    total_entries: u32,
    index_size: u32,
    index_checksum: u32,
    index_offset: u64,
    iv: [u8; 16],
}

impl PackHeader {
    pub(crate) fn new(
        feature: FeatureFlags,
        total_entries: u32,
        index_size: u32,
        index_checksum: u32,
        index_offset: u64,
        iv: [u8; 16],
    ) -> Self {
        Self {
            magic: PACK_MAGIC,
            major_version: PACK_MAJOR_VERSION,
            minor_version: PACK_MINOR_VERSION,
            feature,
            total_entries,
            index_size,
            index_checksum,
            index_offset,
            iv,
        }
    }

    #[inline]
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    #[inline]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    #[inline]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    #[inline]
    pub fn feature(&self) -> FeatureFlags {
        self.feature
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.feature.is_encrypted()
    }

    #[inline]
    pub fn total_entries(&self) -> u32 {
        self.total_entries
    }

    #[inline]
    pub fn index_size(&self) -> u32 {
        self.index_size
    }

    #[inline]
    pub fn index_checksum(&self) -> u32 {
        self.index_checksum
    }

    #[inline]
    pub fn index_offset(&self) -> u64 {
        self.index_offset
    }

    #[inline]
    pub fn iv(&self) -> &[u8; 16] {
        &self.iv
    }
}

impl TryFrom<spec::Header> for PackHeader {
    type Error = CorruptArchive;

    fn try_from(this: spec::Header) -> Result<Self, Self::Error> {
        if this.magic != PACK_MAGIC {
            return Err(CorruptArchive::InvalidMagic {
                expected: PACK_MAGIC,
                found: this.magic,
            });
        }
        if this.major_version != PACK_MAJOR_VERSION || this.minor_version > PACK_MINOR_VERSION {
            return Err(CorruptArchive::UnsupportedVersion {
                major: this.major_version,
                minor: this.minor_version,
            });
        }
        let feature = FeatureFlags::from_bits_retain(this.feature);
        if !feature.check_supported() {
            return Err(CorruptArchive::UnsupportedFeature(feature));
        }

        Ok(PackHeader {
            magic: this.magic,
            major_version: this.major_version,
            minor_version: this.minor_version,
            feature,
            total_entries: this.total_entries,
            index_size: this.index_size,
            index_checksum: this.index_checksum,
            index_offset: this.index_offset,
            iv: this.iv,
        })
    }
}

impl From<&PackHeader> for spec::Header {
    fn from(value: &PackHeader) -> Self {
        Self {
            magic: value.magic,
            major_version: value.major_version,
            minor_version: value.minor_version,
            feature: value.feature.bits(),
            total_entries: value.total_entries,
            index_size: value.index_size,
            index_checksum: value.index_checksum,
            reserved: 0,
            index_offset: value.index_offset,
            iv: value.iv,
        }
    }
}

impl std::fmt::Debug for PackHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackHeader")
            .field("magic", &format!("{:02x?}", self.magic))
            .field("major_version", &self.major_version)
            .field("minor_version", &self.minor_version)
            .field("feature", &self.feature)
            .field("total_entries", &self.total_entries)
            .field("index_size", &self.index_size)
            .field("index_checksum", &format!("{:08x}", self.index_checksum))
            .field("index_offset", &self.index_offset)
            .finish()
    }
}
